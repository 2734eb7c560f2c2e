//! Shared utilities for the Client Portal backend.
//!
//! This crate provides common functionality used across the other crates:
//! - Cursor-based pagination

pub mod pagination;
