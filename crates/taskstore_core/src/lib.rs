//! Data-access core for the task store.
//!
//! Pairs a Unit of Work (one SQLite session with an explicit staged-change
//! list and atomic commit) with a generic repository parameterized over an
//! entity mapping, plus the read-through cache and service boundary that
//! consume them.

pub mod cache;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use cache::{cache_key, cache_key_list, MemoryCache, DEFAULT_TTL};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Entity, EntityId, MapError, ValidationError};
pub use model::todo::{Todo, TodoField, TodoSort, MAX_TASK_CHARS};
pub use repo::{Cmp, Predicate, RepoError, RepoResult, Repository};
pub use service::{CachedTodoService, TodoService, DEFAULT_RECENT_LIMIT};
pub use session::{CommitReceipt, SessionError, SessionResult, UnitOfWork};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
