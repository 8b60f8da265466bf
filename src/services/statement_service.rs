use crate::error::{AppError, Result};
use crate::models::{StatementEntry, TransferLegs};
use crate::observability::{get_metrics, mask_uuid};
use crate::repositories::{AccountRepository, StatementRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The operation use cases: deposit, withdraw, transfer, and entry lookup.
///
/// Every operation validates its preconditions before anything is written.
/// The funds checks performed here give callers a clean rejection ahead of
/// time; the store re-checks under its own transaction, so a stale answer
/// here can delay a debit but never overdraw an account.
pub struct StatementService {
    account_repo: Arc<dyn AccountRepository>,
    statement_repo: Arc<dyn StatementRepository>,
}

impl StatementService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        statement_repo: Arc<dyn StatementRepository>,
    ) -> Self {
        Self {
            account_repo,
            statement_repo,
        }
    }

    /// Records a deposit of `amount` into `account_id` and returns the
    /// created entry. Deposits always succeed once the account is valid.
    pub async fn deposit(
        &self,
        account_id: Uuid,
        amount: Decimal,
        description: impl Into<String> + Send,
    ) -> Result<StatementEntry> {
        self.ensure_positive(amount, "deposit")?;
        self.ensure_account(account_id, "deposit").await?;

        let entry = self
            .statement_repo
            .append(&StatementEntry::deposit(account_id, amount, description))
            .await?;

        get_metrics().record_entry_written("deposit");
        info!(entry_id = %entry.id, account = %mask_uuid(&account_id), "deposit recorded");
        Ok(entry)
    }

    /// Records a withdrawal of `amount` from `account_id`. Fails with
    /// `InsufficientFunds` when the current balance does not cover it, in
    /// which case nothing is written.
    pub async fn withdraw(
        &self,
        account_id: Uuid,
        amount: Decimal,
        description: impl Into<String> + Send,
    ) -> Result<StatementEntry> {
        self.ensure_positive(amount, "withdraw")?;
        self.ensure_account(account_id, "withdraw").await?;
        self.ensure_funds(account_id, amount, "withdraw").await?;

        let entry = self
            .statement_repo
            .append_debit(&StatementEntry::withdraw(account_id, amount, description))
            .await?;

        get_metrics().record_entry_written("withdraw");
        info!(entry_id = %entry.id, account = %mask_uuid(&account_id), "withdrawal recorded");
        Ok(entry)
    }

    /// Moves `amount` from `sender_id` to `receiver_id` as two linked
    /// entries written atomically. Returns the receiver's leg, the resource
    /// the initiating caller created.
    ///
    /// Both ends are resolved against the directory; the sender arrives
    /// authenticated, but auth identity and ledger-account identity are
    /// separate concerns.
    pub async fn transfer(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        amount: Decimal,
        description: impl Into<String> + Send,
    ) -> Result<StatementEntry> {
        self.ensure_positive(amount, "transfer")?;
        self.ensure_account(receiver_id, "transfer").await?;
        self.ensure_account(sender_id, "transfer").await?;
        self.ensure_funds(sender_id, amount, "transfer").await?;

        let legs = self
            .statement_repo
            .append_transfer(&TransferLegs::new(
                sender_id,
                receiver_id,
                amount,
                description,
            ))
            .await?;

        get_metrics().record_entry_written("transfer");
        info!(
            receiver_entry = %legs.receiver.id,
            sender_entry = %legs.sender.id,
            "transfer recorded"
        );
        Ok(legs.receiver)
    }

    /// Looks up a single entry owned by `account_id`. An entry that exists
    /// but belongs to another account is reported as not found, so callers
    /// cannot probe for other accounts' entries.
    pub async fn get_entry(&self, account_id: Uuid, entry_id: Uuid) -> Result<StatementEntry> {
        self.ensure_account(account_id, "get_entry").await?;

        self.statement_repo
            .find_by_id(entry_id)
            .await?
            .filter(|entry| entry.account_id == account_id)
            .ok_or(AppError::StatementEntryNotFound(entry_id))
    }

    fn ensure_positive(&self, amount: Decimal, operation: &str) -> Result<()> {
        if amount <= Decimal::ZERO {
            get_metrics().record_operation_rejected(operation, "invalid_amount");
            return Err(AppError::InvalidAmount(amount));
        }
        Ok(())
    }

    async fn ensure_account(&self, account_id: Uuid, operation: &str) -> Result<()> {
        if self.account_repo.find_by_id(account_id).await?.is_none() {
            get_metrics().record_operation_rejected(operation, "account_not_found");
            warn!(account = %mask_uuid(&account_id), operation, "unknown account");
            return Err(AppError::AccountNotFound(account_id));
        }
        Ok(())
    }

    async fn ensure_funds(&self, account_id: Uuid, amount: Decimal, operation: &str) -> Result<()> {
        let available = self.statement_repo.sum_by_account(account_id).await?;
        if available < amount {
            get_metrics().record_operation_rejected(operation, "insufficient_funds");
            return Err(AppError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        Ok(())
    }
}
