//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Entity names used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Board,
    Column,
    Task,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Board => "board",
            EntityKind::Column => "column",
            EntityKind::Task => "task",
        };
        f.write_str(name)
    }
}

/// Domain-level errors
///
/// Every variant aborts the running transaction; nothing is partially written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    /// Referenced item or parent does not exist
    #[error("Not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: i64 },
    /// Input rejected, e.g. a reorder id list that is not a permutation of the members
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Operation not allowed in this form, e.g. moving an item into its own parent
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Backing store failure, passed through uninterpreted
    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        DomainError::NotFound { kind, id }
    }
}

/// Trim a user-supplied name, rejecting blank input
pub fn validate_name(label: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} must not be empty", label)));
    }
    Ok(trimmed.to_string())
}
