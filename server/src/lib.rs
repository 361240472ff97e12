//! HTTP API for the keyledger license registry.
//!
//! Routes:
//! - `POST /check_license`   validate a key
//! - `POST /add_license`     register a key
//! - `GET  /active_licenses` list active keys, newest first
//! - `GET  /health`          liveness

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use keyledger_license::{
    ActiveLicensesResponse, CheckRequest, CheckResponse, ErrorKind, LicenseError,
    LicenseResult, LicenseService, RegisterRequest, RegisterResponse,
};
use serde::{Deserialize, Serialize};

pub use config::{Config, ConfigError, DatabaseTarget, load_env_file};

/// Shared state threaded through the handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<LicenseService>,
    storage_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(service: LicenseService, storage_timeout: Duration) -> Self {
        Self {
            service: Arc::new(service),
            storage_timeout,
        }
    }
}

/// Body of every failure response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub error: String,
    pub details: String,
    /// True when the same request may succeed if sent again later.
    pub retryable: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

/// [`LicenseError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(LicenseError);

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LicenseError::InvalidInput(format!(
            "payload must be JSON: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::DuplicateKey => StatusCode::CONFLICT,
            ErrorKind::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            kind: self.0.kind(),
            error: self.0.summary().to_string(),
            details: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };
        if body.retryable {
            tracing::warn!("{}; request may be retried", body.details);
        }
        (status, Json(body)).into_response()
    }
}

/// Runs a service call on the blocking pool, bounded by the storage timeout.
async fn run_blocking<T, F>(state: &AppState, op: F) -> LicenseResult<T>
where
    T: Send + 'static,
    F: FnOnce(&LicenseService) -> LicenseResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    let task = tokio::task::spawn_blocking(move || op(&service));
    match tokio::time::timeout(state.storage_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(LicenseError::StorageUnavailable(format!(
            "storage task failed: {join_err}"
        ))),
        Err(_) => {
            let msg = format!(
                "storage round-trip exceeded {}ms",
                state.storage_timeout.as_millis()
            );
            tracing::error!("{}", msg);
            Err(LicenseError::StorageUnavailable(msg))
        }
    }
}

async fn check_license_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Json(request) = payload?;
    let response = run_blocking(&state, move |svc| svc.check(request)).await?;
    Ok(Json(response))
}

async fn add_license_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    let response = run_blocking(&state, move |svc| svc.register(request)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn active_licenses_handler(
    State(state): State<AppState>,
) -> Result<Json<ActiveLicensesResponse>, ApiError> {
    let response = run_blocking(&state, |svc| svc.list_active()).await?;
    Ok(Json(response))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/check_license", post(check_license_handler))
        .route("/add_license", post(add_license_handler))
        .route("/active_licenses", get(active_licenses_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
