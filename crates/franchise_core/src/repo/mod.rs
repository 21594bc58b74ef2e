//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the aggregate store contract used by the franchise service.
//! - Isolate SQLite and JSON document details from business orchestration.
//!
//! # Invariants
//! - One franchise aggregate is always written and read as one document.
//! - Writes are rejected when the stored version moved since the aggregate
//!   was loaded.

pub mod franchise_repo;
