use crate::error::{AppError, Result};
use crate::models::{Account, StatementEntry, TransferLegs};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountRepository, StatementRepository};

/// In-memory account directory, used by the test suites and local tooling.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account. Provisioning is the user-management service's job,
    /// so this lives on the adapter, not on the directory contract.
    pub async fn insert(&self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.write().await.insert(id, account);
        id
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.accounts.read().await.contains_key(&id))
    }
}

/// In-memory statement store mirroring the Postgres adapter's contract.
///
/// The write lock is held across the funds check and the append, which
/// serializes every debit against every balance derivation. Coarser than
/// per-account, but the guarantee is the same.
#[derive(Default)]
pub struct InMemoryStatementRepository {
    entries: RwLock<Vec<StatementEntry>>,
}

impl InMemoryStatementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sum_of(entries: &[StatementEntry], account_id: Uuid) -> Decimal {
        entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .fold(Decimal::ZERO, |acc, e| acc + e.amount)
    }
}

#[async_trait]
impl StatementRepository for InMemoryStatementRepository {
    async fn append(&self, entry: &StatementEntry) -> Result<StatementEntry> {
        self.entries.write().await.push(entry.clone());
        Ok(entry.clone())
    }

    async fn append_debit(&self, entry: &StatementEntry) -> Result<StatementEntry> {
        let mut entries = self.entries.write().await;

        let available = Self::sum_of(&entries, entry.account_id);
        let requested = entry.magnitude();
        if available < requested {
            return Err(AppError::InsufficientFunds {
                requested,
                available,
            });
        }

        entries.push(entry.clone());
        Ok(entry.clone())
    }

    async fn append_transfer(&self, legs: &TransferLegs) -> Result<TransferLegs> {
        let mut entries = self.entries.write().await;

        let available = Self::sum_of(&entries, legs.sender.account_id);
        let requested = legs.magnitude();
        if available < requested {
            return Err(AppError::InsufficientFunds {
                requested,
                available,
            });
        }

        entries.push(legs.receiver.clone());
        entries.push(legs.sender.clone());
        Ok(legs.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StatementEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<StatementEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn sum_by_account(&self, account_id: Uuid) -> Result<Decimal> {
        Ok(Self::sum_of(&self.entries.read().await, account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_sum_is_zero_for_unknown_account() {
        let repo = InMemoryStatementRepository::new();
        let sum = repo.sum_by_account(Uuid::new_v4()).await.unwrap();
        assert_eq!(sum, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_append_never_dedupes() {
        let repo = InMemoryStatementRepository::new();
        let account_id = Uuid::new_v4();

        repo.append(&StatementEntry::deposit(account_id, dec!(10), "a"))
            .await
            .unwrap();
        repo.append(&StatementEntry::deposit(account_id, dec!(10), "a"))
            .await
            .unwrap();

        let entries = repo.find_by_account(account_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(repo.sum_by_account(account_id).await.unwrap(), dec!(20));
    }

    #[tokio::test]
    async fn test_append_debit_refuses_overdraw() {
        let repo = InMemoryStatementRepository::new();
        let account_id = Uuid::new_v4();

        repo.append(&StatementEntry::deposit(account_id, dec!(50), "seed"))
            .await
            .unwrap();

        let err = repo
            .append_debit(&StatementEntry::withdraw(account_id, dec!(80), "too much"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));

        // Nothing was written.
        assert_eq!(repo.find_by_account(account_id).await.unwrap().len(), 1);
        assert_eq!(repo.sum_by_account(account_id).await.unwrap(), dec!(50));
    }

    #[tokio::test]
    async fn test_append_transfer_writes_both_legs() {
        let repo = InMemoryStatementRepository::new();
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();

        repo.append(&StatementEntry::deposit(sender, dec!(100), "seed"))
            .await
            .unwrap();

        repo.append_transfer(&TransferLegs::new(sender, receiver, dec!(40), "rent"))
            .await
            .unwrap();

        assert_eq!(repo.sum_by_account(sender).await.unwrap(), dec!(60));
        assert_eq!(repo.sum_by_account(receiver).await.unwrap(), dec!(40));
    }

    #[tokio::test]
    async fn test_append_transfer_insufficient_writes_nothing() {
        let repo = InMemoryStatementRepository::new();
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();

        let err = repo
            .append_transfer(&TransferLegs::new(sender, receiver, dec!(40), "rent"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds { .. }));

        assert!(repo.find_by_account(sender).await.unwrap().is_empty());
        assert!(repo.find_by_account(receiver).await.unwrap().is_empty());
    }
}
