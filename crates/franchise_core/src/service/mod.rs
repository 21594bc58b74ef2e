//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate load/validate/mutate/save sequences over the aggregate store.
//! - Keep HTTP and binary layers decoupled from storage details.

pub mod franchise_service;
