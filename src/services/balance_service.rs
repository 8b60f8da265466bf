use crate::error::{AppError, Result};
use crate::models::StatementEntry;
use crate::observability::{get_metrics, LatencyTimer};
use crate::repositories::{AccountRepository, StatementRepository};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// The derived balance of an account. Not a stored value: always the sum of
/// the signed amounts the account owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Decimal,
}

/// Full statement view: the account's entries in creation order plus the
/// balance they fold to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    pub statement: Vec<StatementEntry>,
    pub balance: Decimal,
}

/// The balance engine: a pure query over the statement store. No cache sits
/// in front of it, so a query reflects every write committed before it.
pub struct BalanceService {
    account_repo: Arc<dyn AccountRepository>,
    statement_repo: Arc<dyn StatementRepository>,
}

impl BalanceService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        statement_repo: Arc<dyn StatementRepository>,
    ) -> Self {
        Self {
            account_repo,
            statement_repo,
        }
    }

    /// Current balance of `account_id`; zero for an account with no entries.
    pub async fn get_balance(&self, account_id: Uuid) -> Result<AccountBalance> {
        self.ensure_account(account_id).await?;

        let timer = LatencyTimer::new();
        let balance = self.statement_repo.sum_by_account(account_id).await?;
        get_metrics().record_balance_query_latency(timer.elapsed_ms());

        Ok(AccountBalance { balance })
    }

    /// The account's entries plus their folded balance, derived from the
    /// same snapshot of the log so the two always agree.
    pub async fn get_statement(&self, account_id: Uuid) -> Result<AccountStatement> {
        self.ensure_account(account_id).await?;

        let statement = self.statement_repo.find_by_account(account_id).await?;
        let balance = statement
            .iter()
            .fold(Decimal::ZERO, |acc, entry| acc + entry.amount);

        Ok(AccountStatement { statement, balance })
    }

    async fn ensure_account(&self, account_id: Uuid) -> Result<()> {
        if !self.account_repo.exists(account_id).await? {
            return Err(AppError::AccountNotFound(account_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use crate::repositories::{InMemoryAccountRepository, InMemoryStatementRepository};
    use crate::services::StatementService;
    use rust_decimal_macros::dec;

    async fn setup() -> (StatementService, BalanceService, Uuid) {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let statements = Arc::new(InMemoryStatementRepository::new());
        let account_id = accounts.insert(Account::new("Test User", "hash")).await;

        let statement_service = StatementService::new(accounts.clone(), statements.clone());
        let balance_service = BalanceService::new(accounts, statements);
        (statement_service, balance_service, account_id)
    }

    #[tokio::test]
    async fn test_fresh_account_has_zero_balance() {
        let (_, balances, account_id) = setup().await;

        let result = balances.get_balance(account_id).await.unwrap();
        assert_eq!(result.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_balance_is_sum_of_signed_amounts() {
        let (statements, balances, account_id) = setup().await;

        statements
            .deposit(account_id, dec!(123), "initial deposit")
            .await
            .unwrap();
        statements
            .withdraw(account_id, dec!(23), "groceries")
            .await
            .unwrap();

        let result = balances.get_balance(account_id).await.unwrap();
        assert_eq!(result.balance, dec!(100));
    }

    #[tokio::test]
    async fn test_balance_unknown_account() {
        let (_, balances, _) = setup().await;

        let ghost = Uuid::new_v4();
        let err = balances.get_balance(ghost).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn test_statement_view_lists_entries_with_balance() {
        let (statements, balances, account_id) = setup().await;

        statements
            .deposit(account_id, dec!(100), "first")
            .await
            .unwrap();
        statements
            .withdraw(account_id, dec!(40), "second")
            .await
            .unwrap();

        let view = balances.get_statement(account_id).await.unwrap();
        assert_eq!(view.statement.len(), 2);
        assert_eq!(view.statement[0].description, "first");
        assert_eq!(view.statement[1].description, "second");
        assert_eq!(view.balance, dec!(60));
    }
}
