//! Task Entity
//!
//! Tasks are ordered within their column.

use serde::{Deserialize, Deserializer, Serialize};
use super::entity::Entity;
use super::ordered::{ItemFields, Kind, Ordered, Record};

/// A task card inside a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    /// Owning column
    pub column_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Zero-based position among the column's tasks
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<NewTask> for ItemFields {
    fn from(fields: NewTask) -> Self {
        ItemFields::Task {
            title: fields.title,
            description: fields.description,
        }
    }
}

/// Partial update for a task's content. `description: Some(None)` clears it.
///
/// In JSON an absent `description` leaves it alone and `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

/// Wrap any present value, `null` included, in `Some`
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl Task {
    /// Apply a patch, returning the resulting fields
    pub fn patched(&self, patch: TaskPatch) -> ItemFields {
        ItemFields::Task {
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
        }
    }
}

impl Entity for Task {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Ordered for Task {
    const KIND: Kind = Kind::Task;
    type Fields = NewTask;

    fn parent_id(&self) -> i64 {
        self.column_id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Task(task) => Some(task),
            Record::Column(_) => None,
        }
    }
}
