//! Domain error taxonomy.
//!
//! A `thiserror` enum with the `InvalidInput` / `InvalidTransition` /
//! `Conflict` / `NotFound` kinds used across the domain services and
//! surfaced to the API layer.

use thiserror::Error;

use crate::models::invoice::InvoiceStatus;

/// Errors produced by the domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input failed a domain-level invariant (e.g. empty invoice items,
    /// non-finite amounts).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A status transition that the state machine does not permit.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// The operation conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced entity was not found.
    #[error("not found: {0}")]
    NotFound(String),
}
