//! Franchise aggregate records and nested-collection helpers.
//!
//! # Responsibility
//! - Define the serializable document shape persisted per franchise.
//! - Keep lookup/append/remove logic for branches and products in one place.
//!
//! # Invariants
//! - Ids are assigned once by constructors and never rewritten.
//! - Branch and product lists preserve insertion order.
//! - `version` is storage metadata and is not part of the document.

use crate::model::validation::{names_match, Stock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Franchise identifier. Kept as string to match the document store shape.
pub type FranchiseId = String;
/// Branch identifier, unique within its franchise.
pub type BranchId = String;
/// Product identifier, unique within its branch.
pub type ProductId = String;

/// Generates a fresh entity identifier.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sellable item tracked by one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub stock: Stock,
}

impl Product {
    /// Creates a product with a generated id.
    pub fn new(name: impl Into<String>, stock: Stock) -> Self {
        Self::with_id(new_entity_id(), name, stock)
    }

    /// Creates a product with a caller-provided id.
    pub fn with_id(id: impl Into<ProductId>, name: impl Into<String>, stock: Stock) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock,
        }
    }
}

/// Physical location of a franchise holding an ordered product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Branch {
    /// Creates an empty branch with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(new_entity_id(), name, Vec::new())
    }

    /// Creates a branch with a caller-provided id and products.
    pub fn with_id(id: impl Into<BranchId>, name: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            products,
        }
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    pub fn product_mut(&mut self, product_id: &str) -> Option<&mut Product> {
        self.products
            .iter_mut()
            .find(|product| product.id == product_id)
    }

    /// Returns whether a product other than `except_id` already uses `name`.
    pub fn has_product_named(&self, name: &str, except_id: Option<&str>) -> bool {
        self.products.iter().any(|product| {
            except_id != Some(product.id.as_str()) && names_match(&product.name, name)
        })
    }

    /// Appends a product at the end of the list.
    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Removes one product by id, returning it when present.
    pub fn remove_product(&mut self, product_id: &str) -> Option<Product> {
        let index = self
            .products
            .iter()
            .position(|product| product.id == product_id)?;
        Some(self.products.remove(index))
    }

    /// Returns the product with the highest stock.
    ///
    /// Ties resolve to the earliest product in list order.
    pub fn max_stock_product(&self) -> Option<&Product> {
        self.products.iter().fold(None, |best, product| match best {
            Some(current) if current.stock >= product.stock => Some(current),
            _ => Some(product),
        })
    }
}

/// Aggregate root persisted as one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: FranchiseId,
    pub name: String,
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Storage version used for optimistic write checks. `0` means never saved.
    #[serde(skip)]
    pub version: u64,
}

impl Franchise {
    /// Creates an unsaved franchise with a generated id and no branches.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(new_entity_id(), name, Vec::new())
    }

    /// Creates an unsaved franchise with a caller-provided id.
    ///
    /// Used by imports and tests where identity already exists.
    pub fn with_id(
        id: impl Into<FranchiseId>,
        name: impl Into<String>,
        branches: Vec<Branch>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            branches,
            version: 0,
        }
    }

    pub fn branch(&self, branch_id: &str) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.id == branch_id)
    }

    pub fn branch_mut(&mut self, branch_id: &str) -> Option<&mut Branch> {
        self.branches
            .iter_mut()
            .find(|branch| branch.id == branch_id)
    }

    /// Returns whether a branch other than `except_id` already uses `name`.
    pub fn has_branch_named(&self, name: &str, except_id: Option<&str>) -> bool {
        self.branches.iter().any(|branch| {
            except_id != Some(branch.id.as_str()) && names_match(&branch.name, name)
        })
    }

    /// Appends a branch at the end of the list.
    pub fn add_branch(&mut self, branch: Branch) {
        self.branches.push(branch);
    }

    /// Builds the max-stock projection, one entry per branch in branch order.
    pub fn max_stock_by_branch(&self) -> Vec<ProductWithBranch> {
        self.branches
            .iter()
            .map(|branch| ProductWithBranch {
                branch_name: branch.name.clone(),
                product: branch.max_stock_product().cloned(),
            })
            .collect()
    }
}

/// Reporting projection: a branch paired with its highest-stock product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductWithBranch {
    pub branch_name: String,
    /// `None` when the branch has no products.
    pub product: Option<Product>,
}
