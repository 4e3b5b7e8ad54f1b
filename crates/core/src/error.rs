//! Domain error model.

use thiserror::Error;

use crate::id::ItemId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, stock checks,
/// lookups). Transport concerns belong to the client crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. zero quantity, overflow).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A commit was attempted on a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A request commit was attempted without a job order number.
    #[error("job order number is required")]
    MissingJobOrder,

    /// A request would take an item's stock below zero.
    #[error("insufficient stock for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        item_id: ItemId,
        name: String,
        available: u64,
        requested: u64,
    },

    /// An identifier was invalid (e.g. blank).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced item is not in the inventory.
    #[error("item not found: {0}")]
    NotFound(ItemId),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(id: ItemId) -> Self {
        Self::NotFound(id)
    }

    pub fn insufficient_stock(
        item_id: ItemId,
        name: impl Into<String>,
        available: u64,
        requested: u64,
    ) -> Self {
        Self::InsufficientStock {
            item_id,
            name: name.into(),
            available,
            requested,
        }
    }
}
