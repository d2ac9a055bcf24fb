//! To-do domain model.
//!
//! # Responsibility
//! - Define the sample entity managed by the generic repository.
//! - Enforce task text invariants before persistence.
//!
//! # Invariants
//! - `task` is never empty and never longer than 500 characters.
//! - `id` is `None` until the store assigns one.

use crate::model::entity::{Entity, EntityId, MapError, ValidationError};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Upper bound on task text length, in characters.
pub const MAX_TASK_CHARS: usize = 500;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier; `None` for not-yet-persisted items.
    pub id: Option<EntityId>,
    /// Task description shown to the user.
    pub task: String,
    /// Whether the task has been completed.
    pub completed: bool,
}

impl Todo {
    /// Creates an unpersisted, open to-do item.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: None,
            task: task.into(),
            completed: false,
        }
    }

    /// Marks the task as completed.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Reopens a completed task.
    pub fn reopen(&mut self) {
        self.completed = false;
    }
}

/// Order-key selectors for paged to-do queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoSort {
    Id,
    Task,
    Completed,
}

/// Filter-key selectors for to-do predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoField {
    Id,
    Task,
    Completed,
}

impl Entity for Todo {
    type Sort = TodoSort;
    type Field = TodoField;

    fn table() -> &'static str {
        "todos"
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn columns() -> &'static [&'static str] {
        &["task", "completed"]
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.task.clone()),
            Value::Integer(i64::from(self.completed)),
        ]
    }

    fn sort_column(sort: TodoSort) -> &'static str {
        match sort {
            TodoSort::Id => "id",
            TodoSort::Task => "task",
            TodoSort::Completed => "completed",
        }
    }

    fn field_column(field: TodoField) -> &'static str {
        match field {
            TodoField::Id => "id",
            TodoField::Task => "task",
            TodoField::Completed => "completed",
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self, MapError> {
        let completed = match row.get::<_, i64>("completed")? {
            0 => false,
            1 => true,
            other => {
                return Err(MapError::new(format!(
                    "invalid completed value `{other}` in todos.completed"
                )));
            }
        };

        Ok(Self {
            id: Some(row.get("id")?),
            task: row.get("task")?,
            completed,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.task.trim().is_empty() {
            return Err(ValidationError {
                field: "task",
                message: "must not be empty".to_string(),
            });
        }
        if self.task.chars().count() > MAX_TASK_CHARS {
            return Err(ValidationError {
                field: "task",
                message: format!("must be at most {MAX_TASK_CHARS} characters"),
            });
        }
        Ok(())
    }
}
