//! Input validation for names and stock values.
//!
//! # Invariants
//! - Accepted names are trimmed and non-empty.
//! - Accepted stock values fit in `Stock` (non-negative).

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stock counter stored on every product.
pub type Stock = u32;

/// Upper bound for entity names, counted in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Rejection reasons for caller-provided values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank after trimming.
    BlankName,
    /// Name exceeds `MAX_NAME_CHARS`.
    NameTooLong { chars: usize },
    /// Stock is negative or does not fit in `Stock`.
    InvalidStock(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::NameTooLong { chars } => write!(
                f,
                "name must be at most {MAX_NAME_CHARS} characters, got {chars}"
            ),
            Self::InvalidStock(value) => {
                write!(f, "stock must be a non-negative integer, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a caller-provided name and checks it is usable.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong { chars });
    }
    Ok(trimmed.to_string())
}

/// Converts a signed caller value into a stock counter.
pub fn parse_stock(value: i64) -> Result<Stock, ValidationError> {
    Stock::try_from(value).map_err(|_| ValidationError::InvalidStock(value))
}

/// Case-insensitive name comparison used by every uniqueness rule.
pub fn names_match(left: &str, right: &str) -> bool {
    left == right || left.to_lowercase() == right.to_lowercase()
}
