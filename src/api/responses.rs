use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{OperationKind, StatementEntry};
use crate::services::{AccountBalance, AccountStatement};

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: ErrorResponse) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Validation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
}

/// Service health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub database: bool,
}

/// Statement entry DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementEntryResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: OperationKind,
    pub amount: Decimal,
    pub description: String,
    pub counterparty_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<StatementEntry> for StatementEntryResponse {
    fn from(entry: StatementEntry) -> Self {
        Self {
            id: entry.id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount,
            description: entry.description,
            counterparty_id: entry.counterparty_id,
            created_at: entry.created_at,
        }
    }
}

/// Balance DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

impl From<AccountBalance> for BalanceResponse {
    fn from(balance: AccountBalance) -> Self {
        Self {
            balance: balance.balance,
        }
    }
}

/// Statement view DTO: entries plus the balance they fold to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementViewResponse {
    pub statement: Vec<StatementEntryResponse>,
    pub balance: Decimal,
}

impl From<AccountStatement> for StatementViewResponse {
    fn from(view: AccountStatement) -> Self {
        Self {
            statement: view
                .statement
                .into_iter()
                .map(StatementEntryResponse::from)
                .collect(),
            balance: view.balance,
        }
    }
}
