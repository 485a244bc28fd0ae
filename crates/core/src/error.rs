//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Which entity a failure refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Warehouse,
    Item,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Warehouse => "warehouse",
            EntityKind::Item => "item",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Every variant except `Storage` is an expected, user-facing outcome.
/// `Storage` carries backend failures so callers can keep a single error type
/// end to end; it is never produced by validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A name was empty or whitespace-only after trimming.
    #[error("{0} name is required")]
    EmptyName(EntityKind),

    /// Another warehouse already uses this (trimmed) name.
    #[error("warehouse name already exists: {0}")]
    DuplicateName(String),

    /// The addressed warehouse or item does not exist.
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// A quantity parsed successfully but was below zero.
    #[error("quantity cannot be negative: {0}")]
    NegativeQuantity(f64),

    /// The parent warehouse of an item operation does not exist.
    #[error("warehouse not found")]
    WarehouseNotFound,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn warehouse_not_found() -> Self {
        Self::NotFound(EntityKind::Warehouse)
    }

    pub fn item_not_found() -> Self {
        Self::NotFound(EntityKind::Item)
    }

    /// Rejected input (maps to a client error).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyName(_)
                | DomainError::DuplicateName(_)
                | DomainError::NegativeQuantity(_)
                | DomainError::InvalidId(_)
        )
    }

    /// A referenced entity is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_) | DomainError::WarehouseNotFound)
    }
}
