//! Request/response DTOs for the franchise HTTP surface.
//!
//! Field names are camelCase on the wire.

use franchise_core::{Branch, Franchise, Product, ProductWithBranch, Stock};
use serde::{Deserialize, Serialize};

/// Body for every create/rename call that only carries a name.
#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Body for `POST .../products`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    /// Signed so negative input reaches validation instead of the extractor.
    pub stock: i64,
}

/// Body for `PATCH .../stock`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStockRequest {
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub stock: Stock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponse {
    pub id: String,
    pub name: String,
    pub products: Vec<ProductResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FranchiseResponse {
    pub id: String,
    pub name: String,
    pub branches: Vec<BranchResponse>,
}

/// One entry of the max-stock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxStockResponse {
    pub branch_name: String,
    /// Serialized as `null` for branches without products.
    pub product: Option<ProductResponse>,
}

/// Health check response payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            stock: value.stock,
        }
    }
}

impl From<Branch> for BranchResponse {
    fn from(value: Branch) -> Self {
        Self {
            id: value.id,
            name: value.name,
            products: value.products.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Franchise> for FranchiseResponse {
    fn from(value: Franchise) -> Self {
        Self {
            id: value.id,
            name: value.name,
            branches: value.branches.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ProductWithBranch> for MaxStockResponse {
    fn from(value: ProductWithBranch) -> Self {
        Self {
            branch_name: value.branch_name,
            product: value.product.map(Into::into),
        }
    }
}
