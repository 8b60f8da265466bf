use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operation kinds a caller may create directly. Transfers go through the
/// dedicated transfer endpoint so both legs are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Deposit,
    Withdraw,
}

/// Request to record a deposit or withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStatementRequest {
    pub kind: StatementKind,
    pub amount: Decimal,
    pub description: String,
}

impl CreateStatementRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.amount <= Decimal::ZERO {
            errors.push(ValidationError {
                field: "amount".to_string(),
                message: "amount must be positive".to_string(),
            });
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError {
                field: "description".to_string(),
                message: "description cannot be empty".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request to transfer funds between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    pub amount: Decimal,
    pub description: String,
}

impl CreateTransferRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.amount <= Decimal::ZERO {
            errors.push(ValidationError {
                field: "amount".to_string(),
                message: "amount must be positive".to_string(),
            });
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError {
                field: "description".to_string(),
                message: "description cannot be empty".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_statement_request_validation() {
        let request = CreateStatementRequest {
            kind: StatementKind::Deposit,
            amount: dec!(0),
            description: " ".to_string(),
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_statement_kind_deserializes_lowercase() {
        let kind: StatementKind = serde_json::from_str("\"withdraw\"").unwrap();
        assert_eq!(kind, StatementKind::Withdraw);

        // "transfer" is not a valid statement kind on this endpoint.
        assert!(serde_json::from_str::<StatementKind>("\"transfer\"").is_err());
    }
}
