pub mod account_repository;
pub mod memory;
pub mod statement_repository;

pub use account_repository::{AccountRepository, PostgresAccountRepository};
pub use memory::{InMemoryAccountRepository, InMemoryStatementRepository};
pub use statement_repository::{PostgresStatementRepository, StatementRepository};

use sqlx::PgPool;

/// Database connection pool type alias.
pub type DbPool = PgPool;
