//! Domain Layer
//!
//! Contains all domain entities, the error taxonomy and the pure ordering planner.
//! This layer has NO external dependencies (except serde and thiserror).

mod entity;
mod board;
mod column;
mod task;
mod ordered;
pub mod ordering;

pub use entity::{validate_name, DomainError, DomainResult, Entity, EntityKind};
pub use board::{Board, BoardSnapshot, ColumnWithTasks};
pub use column::{Column, NewColumn};
pub use task::{NewTask, Task, TaskPatch};
pub use ordered::{ItemFields, Kind, Ordered, Record};
pub use ordering::{Assignment, Contiguity, IndexMode, IndexPolicy, Slot};
