//! Persistence layer for the Client Portal backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the per-year invoice number
//!   sequence allocator

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
