use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Error kinds surfaced by the ledger core.
///
/// Validation kinds are raised before any write; `Database` is the transient
/// storage kind callers may retry, which the ledger never retries itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("account '{0}' not found")]
    AccountNotFound(Uuid),

    #[error("statement entry '{0}' not found")]
    StatementEntryNotFound(Uuid),

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// True when the failure is a storage fault rather than a validation
    /// rejection. A transient failure means "write attempted but
    /// undetermined"; everything else means nothing was written.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Database(_))
    }

    /// Stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::AccountNotFound(_) => "account_not_found",
            AppError::StatementEntryNotFound(_) => "statement_entry_not_found",
            AppError::InsufficientFunds { .. } => "insufficient_funds",
            AppError::InvalidAmount(_) => "invalid_amount",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let err = AppError::InsufficientFunds {
            requested: Decimal::from(10),
            available: Decimal::from(5),
        };
        assert!(!err.is_transient());

        let err = AppError::Database(sqlx::Error::PoolClosed);
        assert!(err.is_transient());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            AppError::AccountNotFound(Uuid::nil()).kind(),
            "account_not_found"
        );
        assert_eq!(
            AppError::InvalidAmount(Decimal::ZERO).kind(),
            "invalid_amount"
        );
    }
}
