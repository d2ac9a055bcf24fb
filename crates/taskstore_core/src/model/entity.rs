//! Entity capability contract for persisted record types.
//!
//! # Responsibility
//! - Define the identity + table mapping every repository-managed type needs.
//! - Keep row conversion and validation next to the type that owns the data.
//!
//! # Invariants
//! - `id()` is `None` until the store assigns an identifier.
//! - `columns()` and `values()` agree on order and length.

use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned integer identifier for persisted entities.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntityId = i64;

/// Domain-level validation failure, raised before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Error produced when a persisted row cannot be mapped back into an entity.
#[derive(Debug)]
pub struct MapError {
    pub message: String,
}

impl MapError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for MapError {}

impl From<rusqlite::Error> for MapError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Capability trait for types managed by the generic repository.
///
/// An implementor declares its table mapping once; the session and
/// repository derive all INSERT/UPDATE/DELETE/SELECT statements from it.
/// Order keys and filter fields are plain enums translated to column names,
/// so sorting and filtering always run inside the store.
pub trait Entity: Clone {
    /// Order-key selector accepted by paged queries.
    type Sort: Copy;
    /// Filter-key selector accepted by predicates.
    type Field: Copy;

    /// Backing table name.
    fn table() -> &'static str;

    /// Current identifier, `None` until assigned by the store.
    fn id(&self) -> Option<EntityId>;

    /// Records the identifier assigned by the store.
    fn set_id(&mut self, id: EntityId);

    /// Non-id column names, in the order `values()` binds them.
    fn columns() -> &'static [&'static str];

    /// Bind values matching `columns()`.
    fn values(&self) -> Vec<Value>;

    /// Column backing an order-key selector.
    fn sort_column(sort: Self::Sort) -> &'static str;

    /// Column backing a filter-key selector.
    fn field_column(field: Self::Field) -> &'static str;

    /// Maps a selected row (id plus `columns()`) back into the entity.
    fn from_row(row: &Row<'_>) -> Result<Self, MapError>;

    /// Checks domain invariants before a write is staged.
    fn validate(&self) -> Result<(), ValidationError>;
}
