//! Request handlers for franchise operations.
//!
//! # Responsibility
//! - Translate HTTP extractors into franchise service calls.
//! - Map service errors onto status codes and `{"error": ...}` bodies.
//!
//! # Invariants
//! - Each request runs one whole service call under the connection lock on a
//!   blocking worker thread.
//! - Not-found maps to 404, conflict and validation to 400, everything else
//!   to 500.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use franchise_core::{
    core_version, ErrorKind, FranchiseService, FranchiseServiceError, ServiceResult,
    SqliteFranchiseRepository,
};
use log::{debug, error};
use serde_json::json;
use std::sync::Arc;

use crate::types::{
    BranchResponse, CreateProductRequest, FranchiseResponse, HealthResponse, MaxStockResponse,
    NameRequest, ProductResponse, UpdateStockRequest,
};
use crate::AppState;

/// API errors for franchise operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Domain-level franchise error.
    #[error(transparent)]
    Service(#[from] FranchiseServiceError),
    /// Blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Service(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Conflict | ErrorKind::InvalidInput => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                ErrorKind::Internal => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("internal error: {err}"),
                ),
            },
            ApiError::Worker(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("internal error: {err}"),
            ),
        };

        if status.is_server_error() {
            error!("event=http_request module=api status=error code={status} error={message}");
        } else {
            debug!("event=http_request module=api status=rejected code={status} error={message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Runs `f` against a service bound to the shared connection.
async fn with_service<T, F>(state: Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FranchiseService<SqliteFranchiseRepository<'_>>) -> ServiceResult<T>
        + Send
        + 'static,
{
    let result = tokio::task::spawn_blocking(move || -> ServiceResult<T> {
        let conn = state.conn.lock();
        let service = FranchiseService::new(SqliteFranchiseRepository::try_new(&conn)?);
        f(&service)
    })
    .await?;
    Ok(result?)
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: core_version().to_string(),
    })
}

/// GET /franchises
pub async fn list_franchises(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FranchiseResponse>>, ApiError> {
    let franchises = with_service(state, |service| service.list_franchises()).await?;
    Ok(Json(franchises.into_iter().map(Into::into).collect()))
}

/// POST /franchises
pub async fn create_franchise(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<FranchiseResponse>), ApiError> {
    let franchise =
        with_service(state, move |service| service.create_franchise(&req.name)).await?;
    Ok((StatusCode::CREATED, Json(franchise.into())))
}

/// GET /franchises/{franchise_id}
pub async fn get_franchise(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
) -> Result<Json<FranchiseResponse>, ApiError> {
    let franchise =
        with_service(state, move |service| service.get_franchise(&franchise_id)).await?;
    Ok(Json(franchise.into()))
}

/// PATCH /franchises/{franchise_id}
pub async fn rename_franchise(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<Json<FranchiseResponse>, ApiError> {
    let franchise = with_service(state, move |service| {
        service.update_franchise_name(&franchise_id, &req.name)
    })
    .await?;
    Ok(Json(franchise.into()))
}

/// GET /franchises/{franchise_id}/max-stock
pub async fn max_stock(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
) -> Result<Json<Vec<MaxStockResponse>>, ApiError> {
    let report =
        with_service(state, move |service| service.find_max_stock(&franchise_id)).await?;
    Ok(Json(report.into_iter().map(Into::into).collect()))
}

/// POST /franchises/{franchise_id}/branches
pub async fn add_branch(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
    Json(req): Json<NameRequest>,
) -> Result<(StatusCode, Json<BranchResponse>), ApiError> {
    let branch =
        with_service(state, move |service| service.add_branch(&franchise_id, &req.name)).await?;
    Ok((StatusCode::CREATED, Json(branch.into())))
}

/// PATCH /franchises/{franchise_id}/branches/{branch_id}
pub async fn rename_branch(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, branch_id)): Path<(String, String)>,
    Json(req): Json<NameRequest>,
) -> Result<Json<BranchResponse>, ApiError> {
    let branch = with_service(state, move |service| {
        service.update_branch_name(&franchise_id, &branch_id, &req.name)
    })
    .await?;
    Ok(Json(branch.into()))
}

/// POST /franchises/{franchise_id}/branches/{branch_id}/products
pub async fn add_product(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, branch_id)): Path<(String, String)>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = with_service(state, move |service| {
        service.add_product(&franchise_id, &branch_id, &req.name, req.stock)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// DELETE /franchises/{franchise_id}/branches/{branch_id}/products/{product_id}
///
/// Responds with the branch as it is after the removal.
pub async fn remove_product(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, branch_id, product_id)): Path<(String, String, String)>,
) -> Result<Json<BranchResponse>, ApiError> {
    let branch = with_service(state, move |service| {
        service.remove_product(&franchise_id, &branch_id, &product_id)
    })
    .await?;
    Ok(Json(branch.into()))
}

/// PATCH /franchises/{franchise_id}/branches/{branch_id}/products/{product_id}
pub async fn rename_product(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, branch_id, product_id)): Path<(String, String, String)>,
    Json(req): Json<NameRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = with_service(state, move |service| {
        service.update_product_name(&franchise_id, &branch_id, &product_id, &req.name)
    })
    .await?;
    Ok(Json(product.into()))
}

/// PATCH /franchises/{franchise_id}/branches/{branch_id}/products/{product_id}/stock
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, branch_id, product_id)): Path<(String, String, String)>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = with_service(state, move |service| {
        service.update_stock(&franchise_id, &branch_id, &product_id, req.stock)
    })
    .await?;
    Ok(Json(product.into()))
}
