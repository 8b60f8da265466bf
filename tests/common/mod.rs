use statement_ledger::models::Account;
use statement_ledger::repositories::{InMemoryAccountRepository, InMemoryStatementRepository};
use statement_ledger::services::{BalanceService, StatementService};
use std::sync::Arc;
use uuid::Uuid;

/// A ledger wired against the in-memory adapters, the same contract the
/// Postgres adapters implement.
pub struct TestLedger {
    pub accounts: Arc<InMemoryAccountRepository>,
    pub store: Arc<InMemoryStatementRepository>,
    pub statements: Arc<StatementService>,
    pub balances: Arc<BalanceService>,
}

pub fn setup_ledger() -> TestLedger {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let store = Arc::new(InMemoryStatementRepository::new());

    TestLedger {
        statements: Arc::new(StatementService::new(accounts.clone(), store.clone())),
        balances: Arc::new(BalanceService::new(accounts.clone(), store.clone())),
        accounts,
        store,
    }
}

pub async fn seed_account(ledger: &TestLedger, name: &str) -> Uuid {
    ledger
        .accounts
        .insert(Account::new(name, "argon2-hash"))
        .await
}
