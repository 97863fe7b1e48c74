use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Structured failure surfaced by the remote config fetch. Unlike the
/// instance-list and news paths, config failures are the caller's problem:
/// the maintenance check treats them as fatal, the news lookup treats them
/// as "no config".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Transport failure or non-2xx status: the server could not be reached.
    Unreachable,
    /// The server answered, but not with JSON (typically an HTML error page).
    InvalidResponse,
    /// The body claimed to be JSON but did not parse.
    ParseError,
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConfigErrorKind::Unreachable => "UNREACHABLE",
            ConfigErrorKind::InvalidResponse => "INVALID_RESPONSE",
            ConfigErrorKind::ParseError => "PARSE_ERROR",
        };
        f.write_str(name)
    }
}
