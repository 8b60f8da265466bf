use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An account as the ledger sees it.
///
/// Rows are created by the user-management service; the ledger only resolves
/// them. The `credential` field belongs to the authentication layer and is
/// carried opaquely, never interpreted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub credential: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            credential: credential.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_creation() {
        let account = Account::new("Test Account", "hashed-secret");

        assert_eq!(account.name, "Test Account");
        assert_eq!(account.credential, "hashed-secret");
    }

    #[test]
    fn test_credential_not_serialized() {
        let account = Account::new("Test Account", "hashed-secret");

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("hashed-secret"));
        assert!(json.contains("Test Account"));
    }
}
