//! Repository layer: generic CRUD and query façade over a Unit of Work.
//!
//! # Responsibility
//! - Provide type-parameterized data access bound to one session.
//! - Keep SQL rendering and commit discipline out of service code.
//!
//! # Invariants
//! - Every mutating operation commits before returning; batch variants stage
//!   all changes and commit exactly once.
//! - `get` reports a missing identifier as `Ok(None)`, never as an error.

use crate::model::entity::{EntityId, MapError};
use crate::session::SessionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod query;
pub mod repository;

pub use query::{Cmp, Predicate};
pub use repository::Repository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error surfaced by repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Session-level failure: disposed session, staging misuse, or a
    /// persistence error from the backing store.
    Session(SessionError),
    /// An operation that requires an existing row found none.
    NotFound(EntityId),
    /// A persisted row could not be mapped back into the entity type.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<SessionError> for RepoError {
    fn from(value: SessionError) -> Self {
        match value {
            // A staged update that matched no row is the repository's
            // not-found case.
            SessionError::StaleChange { id, .. } => Self::NotFound(id),
            other => Self::Session(other),
        }
    }
}

impl From<MapError> for RepoError {
    fn from(value: MapError) -> Self {
        Self::InvalidData(value.message)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Session(SessionError::from(value))
    }
}
