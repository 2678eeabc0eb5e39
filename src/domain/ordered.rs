//! Ordered Collections
//!
//! Columns (within a board) and tasks (within a column) carry a dense,
//! zero-based `order`. `Kind` names which of the two collections an
//! operation addresses; `Ordered` ties an entity type to its kind.

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::entity::{validate_name, DomainResult, Entity, EntityKind};
use super::task::Task;

/// Which ordered collection an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Columns ordered within a board
    Column,
    /// Tasks ordered within a column
    Task,
}

impl Kind {
    pub fn entity(&self) -> EntityKind {
        match self {
            Kind::Column => EntityKind::Column,
            Kind::Task => EntityKind::Task,
        }
    }

    pub fn parent_entity(&self) -> EntityKind {
        match self {
            Kind::Column => EntityKind::Board,
            Kind::Task => EntityKind::Column,
        }
    }
}

/// Content fields of an ordered item, independent of its placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemFields {
    Column { name: String },
    Task { title: String, description: Option<String> },
}

impl ItemFields {
    pub fn kind(&self) -> Kind {
        match self {
            ItemFields::Column { .. } => Kind::Column,
            ItemFields::Task { .. } => Kind::Task,
        }
    }

    /// Trim names and titles, rejecting blank ones
    pub fn validated(self) -> DomainResult<Self> {
        match self {
            ItemFields::Column { name } => Ok(ItemFields::Column {
                name: validate_name("column name", &name)?,
            }),
            ItemFields::Task { title, description } => Ok(ItemFields::Task {
                title: validate_name("task title", &title)?,
                description: description.filter(|d| !d.trim().is_empty()),
            }),
        }
    }
}

/// A stored ordered item of either kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Column(Column),
    Task(Task),
}

impl Record {
    pub fn kind(&self) -> Kind {
        match self {
            Record::Column(_) => Kind::Column,
            Record::Task(_) => Kind::Task,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Column(c) => c.id,
            Record::Task(t) => t.id,
        }
    }

    pub fn parent_id(&self) -> i64 {
        match self {
            Record::Column(c) => c.board_id,
            Record::Task(t) => t.column_id,
        }
    }

    pub fn order(&self) -> i64 {
        match self {
            Record::Column(c) => c.order,
            Record::Task(t) => t.order,
        }
    }
}

/// An entity that lives at a position inside a parent collection
pub trait Ordered: Entity<Id = i64> + 'static {
    const KIND: Kind;

    /// Fields needed to create one
    type Fields: Into<ItemFields> + Send + 'static;

    fn parent_id(&self) -> i64;

    fn order(&self) -> i64;

    /// Narrow a stored record to this type, `None` on kind mismatch
    fn from_record(record: Record) -> Option<Self>;
}
