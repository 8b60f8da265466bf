pub mod balance_service;
pub mod statement_service;

pub use balance_service::{AccountBalance, AccountStatement, BalanceService};
pub use statement_service::StatementService;
