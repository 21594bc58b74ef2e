//! Route table for the franchise HTTP surface.

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    add_branch, add_product, create_franchise, get_franchise, health_check, list_franchises,
    max_stock, remove_product, rename_branch, rename_franchise, rename_product, update_stock,
};
use crate::AppState;

/// Franchise, branch and product endpoints plus `/health`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/franchises", get(list_franchises).post(create_franchise))
        .route(
            "/franchises/{franchise_id}",
            get(get_franchise).patch(rename_franchise),
        )
        .route("/franchises/{franchise_id}/max-stock", get(max_stock))
        .route("/franchises/{franchise_id}/branches", post(add_branch))
        .route(
            "/franchises/{franchise_id}/branches/{branch_id}",
            patch(rename_branch),
        )
        .route(
            "/franchises/{franchise_id}/branches/{branch_id}/products",
            post(add_product),
        )
        .route(
            "/franchises/{franchise_id}/branches/{branch_id}/products/{product_id}",
            patch(rename_product).delete(remove_product),
        )
        .route(
            "/franchises/{franchise_id}/branches/{branch_id}/products/{product_id}/stock",
            patch(update_stock),
        )
}
