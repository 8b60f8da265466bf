use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::repositories::{PostgresAccountRepository, PostgresStatementRepository};
use crate::services::{BalanceService, StatementService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub statements: Arc<StatementService>,
    pub balances: Arc<BalanceService>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let account_repo = Arc::new(PostgresAccountRepository::new(pool.clone()));
        let statement_repo = Arc::new(PostgresStatementRepository::new(pool.clone()));

        Self {
            statements: Arc::new(StatementService::new(
                account_repo.clone(),
                statement_repo.clone(),
            )),
            balances: Arc::new(BalanceService::new(account_repo, statement_repo)),
            metrics_handle: None,
            pool,
        }
    }

    /// Adds metrics handle to the state.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

/// Creates the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        // Metrics endpoint
        .route("/metrics", get(handlers::metrics_endpoint))
        // Ledger endpoints
        .route("/accounts/:id/balance", get(handlers::get_balance))
        .route(
            "/accounts/:id/statements",
            get(handlers::get_statement).post(handlers::create_statement),
        )
        .route(
            "/accounts/:id/statements/:entry_id",
            get(handlers::get_statement_entry),
        )
        .route(
            "/accounts/:sender_id/transfers/:receiver_id",
            post(handlers::create_transfer),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
