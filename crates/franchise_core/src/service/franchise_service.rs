//! Franchise use-case service.
//!
//! # Responsibility
//! - Enforce existence and case-insensitive name uniqueness rules.
//! - Mutate the loaded aggregate in memory, then persist it whole.
//!
//! # Invariants
//! - Every mutation loads the aggregate first and fails before `save` when
//!   any rule is violated.
//! - Returned entities are the ones written by the successful `save`.
//! - Not-found and conflict conditions always use their specific variants.

use crate::model::franchise::{
    Branch, BranchId, Franchise, FranchiseId, Product, ProductId, ProductWithBranch,
};
use crate::model::validation::{names_match, normalize_name, parse_stock, ValidationError};
use crate::repo::franchise_repo::{FranchiseRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, FranchiseServiceError>;

/// Coarse classification used by outer layers (HTTP status mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Internal,
}

/// Errors from franchise service operations.
#[derive(Debug)]
pub enum FranchiseServiceError {
    /// Caller input failed name/stock validation.
    InvalidInput(ValidationError),
    FranchiseNotFound(FranchiseId),
    BranchNotFound(BranchId),
    ProductNotFound(ProductId),
    /// Another franchise already uses this name.
    DuplicateFranchiseName(String),
    /// A sibling branch already uses this name.
    DuplicateBranchName(String),
    /// A sibling product already uses this name.
    DuplicateProductName(String),
    /// Aggregate changed in storage between load and save.
    ConcurrentModification(FranchiseId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl FranchiseServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::FranchiseNotFound(_) | Self::BranchNotFound(_) | Self::ProductNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateFranchiseName(_)
            | Self::DuplicateBranchName(_)
            | Self::DuplicateProductName(_)
            | Self::ConcurrentModification(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for FranchiseServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::FranchiseNotFound(id) => write!(f, "franchise not found: {id}"),
            Self::BranchNotFound(id) => write!(f, "branch not found: {id}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::DuplicateFranchiseName(name) => {
                write!(f, "a franchise named `{name}` already exists")
            }
            Self::DuplicateBranchName(name) => {
                write!(f, "a branch named `{name}` already exists in this franchise")
            }
            Self::DuplicateProductName(name) => {
                write!(f, "a product named `{name}` already exists in this branch")
            }
            Self::ConcurrentModification(id) => {
                write!(f, "franchise {id} was modified concurrently; retry the request")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FranchiseServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for FranchiseServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::VersionConflict { id, .. } => Self::ConcurrentModification(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for FranchiseServiceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Franchise service facade over an aggregate store.
pub struct FranchiseService<R: FranchiseRepository> {
    repo: R,
}

impl<R: FranchiseRepository> FranchiseService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a franchise with a unique name and no branches.
    pub fn create_franchise(&self, name: &str) -> ServiceResult<Franchise> {
        let name = normalize_name(name)?;
        if self.franchise_name_taken(&name, None)? {
            warn!("event=franchise_create module=service status=conflict name={name}");
            return Err(FranchiseServiceError::DuplicateFranchiseName(name));
        }

        let saved = self.persist(&Franchise::new(name))?;
        info!(
            "event=franchise_create module=service status=ok franchise_id={} name={}",
            saved.id, saved.name
        );
        Ok(saved)
    }

    /// Appends a new empty branch to a franchise.
    pub fn add_branch(&self, franchise_id: &str, name: &str) -> ServiceResult<Branch> {
        let name = normalize_name(name)?;
        let mut franchise = self.load(franchise_id)?;
        if franchise.has_branch_named(&name, None) {
            warn!(
                "event=branch_add module=service status=conflict franchise_id={franchise_id} name={name}"
            );
            return Err(FranchiseServiceError::DuplicateBranchName(name));
        }

        let branch = Branch::new(name);
        franchise.add_branch(branch.clone());
        self.persist(&franchise)?;
        info!(
            "event=branch_add module=service status=ok franchise_id={franchise_id} branch_id={} name={}",
            branch.id, branch.name
        );
        Ok(branch)
    }

    /// Appends a new product to one branch.
    pub fn add_product(
        &self,
        franchise_id: &str,
        branch_id: &str,
        name: &str,
        stock: i64,
    ) -> ServiceResult<Product> {
        let name = normalize_name(name)?;
        let stock = parse_stock(stock)?;
        let mut franchise = self.load(franchise_id)?;
        let branch = branch_mut(&mut franchise, branch_id)?;
        if branch.has_product_named(&name, None) {
            warn!(
                "event=product_add module=service status=conflict franchise_id={franchise_id} branch_id={branch_id} name={name}"
            );
            return Err(FranchiseServiceError::DuplicateProductName(name));
        }

        let product = Product::new(name, stock);
        branch.add_product(product.clone());
        self.persist(&franchise)?;
        info!(
            "event=product_add module=service status=ok franchise_id={franchise_id} branch_id={branch_id} product_id={} stock={}",
            product.id, product.stock
        );
        Ok(product)
    }

    /// Removes one product and returns the updated branch.
    pub fn remove_product(
        &self,
        franchise_id: &str,
        branch_id: &str,
        product_id: &str,
    ) -> ServiceResult<Branch> {
        let mut franchise = self.load(franchise_id)?;
        let branch = branch_mut(&mut franchise, branch_id)?;
        branch
            .remove_product(product_id)
            .ok_or_else(|| FranchiseServiceError::ProductNotFound(product_id.to_string()))?;
        let updated = branch.clone();

        self.persist(&franchise)?;
        info!(
            "event=product_remove module=service status=ok franchise_id={franchise_id} branch_id={branch_id} product_id={product_id}"
        );
        Ok(updated)
    }

    /// Overwrites the stock of one product.
    pub fn update_stock(
        &self,
        franchise_id: &str,
        branch_id: &str,
        product_id: &str,
        new_stock: i64,
    ) -> ServiceResult<Product> {
        let new_stock = parse_stock(new_stock)?;
        let mut franchise = self.load(franchise_id)?;
        let product = product_mut(branch_mut(&mut franchise, branch_id)?, product_id)?;
        product.stock = new_stock;
        let updated = product.clone();

        self.persist(&franchise)?;
        info!(
            "event=stock_update module=service status=ok franchise_id={franchise_id} branch_id={branch_id} product_id={product_id} stock={new_stock}"
        );
        Ok(updated)
    }

    /// Renames a franchise, keeping names unique across all franchises.
    pub fn update_franchise_name(
        &self,
        franchise_id: &str,
        new_name: &str,
    ) -> ServiceResult<Franchise> {
        let new_name = normalize_name(new_name)?;
        let mut franchise = self.load(franchise_id)?;
        if self.franchise_name_taken(&new_name, Some(franchise_id))? {
            warn!(
                "event=franchise_rename module=service status=conflict franchise_id={franchise_id} name={new_name}"
            );
            return Err(FranchiseServiceError::DuplicateFranchiseName(new_name));
        }

        franchise.name = new_name;
        let saved = self.persist(&franchise)?;
        info!(
            "event=franchise_rename module=service status=ok franchise_id={franchise_id} name={}",
            saved.name
        );
        Ok(saved)
    }

    /// Renames a branch, keeping names unique among its siblings.
    pub fn update_branch_name(
        &self,
        franchise_id: &str,
        branch_id: &str,
        new_name: &str,
    ) -> ServiceResult<Branch> {
        let new_name = normalize_name(new_name)?;
        let mut franchise = self.load(franchise_id)?;
        if franchise.branch(branch_id).is_none() {
            return Err(FranchiseServiceError::BranchNotFound(branch_id.to_string()));
        }
        if franchise.has_branch_named(&new_name, Some(branch_id)) {
            warn!(
                "event=branch_rename module=service status=conflict franchise_id={franchise_id} branch_id={branch_id} name={new_name}"
            );
            return Err(FranchiseServiceError::DuplicateBranchName(new_name));
        }

        let branch = branch_mut(&mut franchise, branch_id)?;
        branch.name = new_name;
        let updated = branch.clone();

        self.persist(&franchise)?;
        info!(
            "event=branch_rename module=service status=ok franchise_id={franchise_id} branch_id={branch_id} name={}",
            updated.name
        );
        Ok(updated)
    }

    /// Renames a product, keeping names unique among its siblings.
    pub fn update_product_name(
        &self,
        franchise_id: &str,
        branch_id: &str,
        product_id: &str,
        new_name: &str,
    ) -> ServiceResult<Product> {
        let new_name = normalize_name(new_name)?;
        let mut franchise = self.load(franchise_id)?;
        let branch = branch_mut(&mut franchise, branch_id)?;
        if branch.product(product_id).is_none() {
            return Err(FranchiseServiceError::ProductNotFound(
                product_id.to_string(),
            ));
        }
        if branch.has_product_named(&new_name, Some(product_id)) {
            warn!(
                "event=product_rename module=service status=conflict franchise_id={franchise_id} branch_id={branch_id} product_id={product_id} name={new_name}"
            );
            return Err(FranchiseServiceError::DuplicateProductName(new_name));
        }

        let product = product_mut(branch, product_id)?;
        product.name = new_name;
        let updated = product.clone();

        self.persist(&franchise)?;
        info!(
            "event=product_rename module=service status=ok franchise_id={franchise_id} branch_id={branch_id} product_id={product_id} name={}",
            updated.name
        );
        Ok(updated)
    }

    /// Pairs every branch, in order, with its highest-stock product.
    pub fn find_max_stock(&self, franchise_id: &str) -> ServiceResult<Vec<ProductWithBranch>> {
        Ok(self.load(franchise_id)?.max_stock_by_branch())
    }

    /// Loads one franchise aggregate.
    pub fn get_franchise(&self, franchise_id: &str) -> ServiceResult<Franchise> {
        self.load(franchise_id)
    }

    /// Lists all franchises in creation order.
    pub fn list_franchises(&self) -> ServiceResult<Vec<Franchise>> {
        Ok(self.repo.find_all()?)
    }

    fn load(&self, franchise_id: &str) -> ServiceResult<Franchise> {
        self.repo
            .find_by_id(franchise_id)?
            .ok_or_else(|| FranchiseServiceError::FranchiseNotFound(franchise_id.to_string()))
    }

    fn franchise_name_taken(&self, name: &str, except_id: Option<&str>) -> ServiceResult<bool> {
        Ok(self.repo.find_all()?.iter().any(|franchise| {
            except_id != Some(franchise.id.as_str()) && names_match(&franchise.name, name)
        }))
    }

    fn persist(&self, franchise: &Franchise) -> ServiceResult<Franchise> {
        self.repo.save(franchise).map_err(|err| {
            error!(
                "event=franchise_save module=service status=error franchise_id={} error={}",
                franchise.id, err
            );
            err.into()
        })
    }
}

fn branch_mut<'a>(franchise: &'a mut Franchise, branch_id: &str) -> ServiceResult<&'a mut Branch> {
    franchise
        .branch_mut(branch_id)
        .ok_or_else(|| FranchiseServiceError::BranchNotFound(branch_id.to_string()))
}

fn product_mut<'a>(branch: &'a mut Branch, product_id: &str) -> ServiceResult<&'a mut Product> {
    branch
        .product_mut(product_id)
        .ok_or_else(|| FranchiseServiceError::ProductNotFound(product_id.to_string()))
}
