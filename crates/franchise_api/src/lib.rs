//! HTTP surface for the franchise inventory service.
//!
//! # Responsibility
//! - Expose franchise use cases as JSON endpoints.
//! - Own the shared SQLite connection used by every request.
//!
//! # Invariants
//! - Only one request touches the connection at a time.
//! - Handlers never run SQLite work on async worker threads.

pub mod handlers;
pub mod routes;
pub mod types;

use axum::Router;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

pub use handlers::ApiError;
pub use routes::routes;
pub use types::{
    BranchResponse, CreateProductRequest, FranchiseResponse, HealthResponse, MaxStockResponse,
    NameRequest, ProductResponse, UpdateStockRequest,
};

/// Shared state handed to every handler.
pub struct AppState {
    conn: Mutex<Connection>,
}

impl AppState {
    /// Wraps a connection that already went through `open_db`/`open_target`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

/// Builds the full router over one migrated connection.
pub fn router(conn: Connection) -> Router {
    routes().with_state(Arc::new(AppState::new(conn)))
}
