pub mod account;
pub mod config;
pub mod error;
pub mod instance;
pub mod launch;
pub mod manifest;
pub mod news;
pub mod panel;
pub mod settings;
pub mod store;

pub use error::{ConfigError, ConfigErrorKind, Error, Result};
