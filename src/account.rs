use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Offline,
    Microsoft,
}

/// A stored player account. Only the fields the launch options consume;
/// token refresh flows live outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_type: AccountType,
    pub name: String,
    pub uuid: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new_offline(name: impl Into<String>) -> Self {
        let name = name.into();
        let uuid = generate_offline_uuid(&name);

        Self {
            id: Uuid::new_v4(),
            account_type: AccountType::Offline,
            name,
            uuid,
            access_token: "0".to_string(),
            created_at: Utc::now(),
            last_used: None,
        }
    }
}

/// Deterministic offline UUID in the `OfflinePlayer:<name>` convention.
fn generate_offline_uuid(name: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    format!("OfflinePlayer:{}", name).hash(&mut hasher);
    let hash = hasher.finish();

    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        (hash >> 32) as u32,
        ((hash >> 16) & 0xFFFF) as u16,
        (hash & 0xFFFF) as u16,
        ((hash >> 48) & 0xFFFF) as u16,
        hash & 0xFFFFFFFFFFFF
    )
}
