//! Franchise aggregate model.
//!
//! # Responsibility
//! - Define the canonical `Franchise -> Branch -> Product` aggregate.
//! - Provide in-memory lookup and mutation helpers for nested collections.
//!
//! # Invariants
//! - Every entity is identified by a server-generated id that never changes.
//! - Sibling names are unique case-insensitively within their parent list.
//! - The aggregate is persisted and loaded as one unit.

pub mod franchise;
pub mod validation;
