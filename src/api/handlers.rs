use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::requests::{CreateStatementRequest, CreateTransferRequest, StatementKind};
use crate::api::responses::{
    ApiResponse, BalanceResponse, ErrorResponse, HealthResponse, ServiceHealth,
    StatementEntryResponse, StatementViewResponse, ValidationErrorDetail,
};
use crate::error::AppError;

use super::routes::AppState;

type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Maps a core error kind to its transport representation. Not-found kinds
/// stay indistinguishable from each other on purpose; storage faults are
/// logged but never detailed to the caller.
fn reject(err: AppError) -> ApiError {
    let (status, code) = match &err {
        AppError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        AppError::StatementEntryNotFound(_) => (StatusCode::NOT_FOUND, "STATEMENT_NOT_FOUND"),
        AppError::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS"),
        AppError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
        AppError::Database(_) | AppError::Config(_) => {
            tracing::error!("request failed: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(ErrorResponse::new(
                    "INTERNAL_ERROR",
                    "An internal error occurred",
                ))),
            );
        }
    };

    (
        status,
        Json(ApiResponse::<()>::error(ErrorResponse::new(
            code,
            err.to_string(),
        ))),
    )
}

fn reject_invalid(errors: Vec<crate::api::requests::ValidationError>) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .iter()
        .map(|e| ValidationErrorDetail {
            field: e.field.clone(),
            message: e.message.clone(),
        })
        .collect();

    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                .with_details(details),
        )),
    )
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    let response = HealthResponse {
        status: if db_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        services: ServiceHealth {
            database: db_healthy,
        },
    };

    Json(ApiResponse::success(response))
}

/// Readiness check endpoint.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness check endpoint.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    match &state.metrics_handle {
        Some(handle) => Ok(handle.render()),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the derived balance of an account.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BalanceResponse>>, ApiError> {
    match state.balances.get_balance(id).await {
        Ok(balance) => Ok(Json(ApiResponse::success(BalanceResponse::from(balance)))),
        Err(err) => Err(reject(err)),
    }
}

/// Get the full statement view of an account.
pub async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StatementViewResponse>>, ApiError> {
    match state.balances.get_statement(id).await {
        Ok(view) => Ok(Json(ApiResponse::success(StatementViewResponse::from(
            view,
        )))),
        Err(err) => Err(reject(err)),
    }
}

/// Record a deposit or withdrawal against an account.
pub async fn create_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateStatementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StatementEntryResponse>>), ApiError> {
    if let Err(errors) = request.validate() {
        return Err(reject_invalid(errors));
    }

    let result = match request.kind {
        StatementKind::Deposit => {
            state
                .statements
                .deposit(id, request.amount, request.description)
                .await
        }
        StatementKind::Withdraw => {
            state
                .statements
                .withdraw(id, request.amount, request.description)
                .await
        }
    };

    match result {
        Ok(entry) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(StatementEntryResponse::from(entry))),
        )),
        Err(err) => Err(reject(err)),
    }
}

/// Get a single statement entry owned by an account.
pub async fn get_statement_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<StatementEntryResponse>>, ApiError> {
    match state.statements.get_entry(id, entry_id).await {
        Ok(entry) => Ok(Json(ApiResponse::success(StatementEntryResponse::from(
            entry,
        )))),
        Err(err) => Err(reject(err)),
    }
}

/// Transfer funds from the sender to the receiver.
pub async fn create_transfer(
    State(state): State<AppState>,
    Path((sender_id, receiver_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StatementEntryResponse>>), ApiError> {
    if let Err(errors) = request.validate() {
        return Err(reject_invalid(errors));
    }

    match state
        .statements
        .transfer(sender_id, receiver_id, request.amount, request.description)
        .await
    {
        Ok(entry) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(StatementEntryResponse::from(entry))),
        )),
        Err(err) => Err(reject(err)),
    }
}
