//! Business services over the repository layer.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply the read-through cache discipline at the service boundary.
//!
//! # Invariants
//! - Services call the repository with already-validated entities and rely
//!   on its commit-per-operation contract.
//! - The repository layer stays cache-unaware; all invalidation lives here.

pub mod todo_service;

pub use todo_service::{CachedTodoService, TodoService, DEFAULT_RECENT_LIMIT};
