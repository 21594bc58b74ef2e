//! Core domain logic for the franchise inventory service.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::franchise::{
    Branch, BranchId, Franchise, FranchiseId, Product, ProductId, ProductWithBranch,
};
pub use model::validation::{Stock, ValidationError};
pub use repo::franchise_repo::{
    FranchiseRepository, RepoError, RepoResult, SqliteFranchiseRepository,
};
pub use service::franchise_service::{
    ErrorKind, FranchiseService, FranchiseServiceError, ServiceResult,
};

/// Returns the core crate version, reported by the health endpoint.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
