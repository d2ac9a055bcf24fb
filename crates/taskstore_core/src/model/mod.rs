//! Domain model and entity mapping contracts.
//!
//! # Responsibility
//! - Define record types persisted through the repository layer.
//! - Keep the entity capability trait next to its implementors.
//!
//! # Invariants
//! - Every persisted type is identified by a store-assigned `EntityId`.
//! - Validation runs in the write path before any SQL is staged.

pub mod entity;
pub mod todo;
