//! Column Entity
//!
//! Columns are ordered within their board and hold an ordered list of tasks.

use serde::{Deserialize, Serialize};
use super::entity::Entity;
use super::ordered::{ItemFields, Kind, Ordered, Record};

/// A column on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    /// Owning board
    pub board_id: i64,
    pub name: String,
    /// Zero-based position among the board's columns
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when creating a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub name: String,
}

impl NewColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<NewColumn> for ItemFields {
    fn from(fields: NewColumn) -> Self {
        ItemFields::Column { name: fields.name }
    }
}

impl Entity for Column {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Ordered for Column {
    const KIND: Kind = Kind::Column;
    type Fields = NewColumn;

    fn parent_id(&self) -> i64 {
        self.board_id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Column(column) => Some(column),
            Record::Task(_) => None,
        }
    }
}
