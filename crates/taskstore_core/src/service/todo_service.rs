//! To-do use-case service and its cached variant.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for to-do callers.
//! - Delegate persistence to the generic repository.
//! - Keep response caching and invalidation at this boundary.

use crate::cache::{cache_key, cache_key_list, MemoryCache, DEFAULT_TTL};
use crate::model::entity::EntityId;
use crate::model::todo::{Todo, TodoField, TodoSort};
use crate::repo::{Cmp, Predicate, RepoResult, Repository};
use crate::session::UnitOfWork;
use rusqlite::types::Value;
use std::time::Duration;

/// Number of items returned by recent-listing reads.
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

const RESOURCE: &str = "todo";

/// Use-case service wrapper for to-do CRUD operations.
pub struct TodoService<'uow> {
    repo: Repository<'uow, Todo>,
}

impl<'uow> TodoService<'uow> {
    /// Creates a service bound to the given session.
    pub fn new(uow: &'uow UnitOfWork) -> Self {
        Self {
            repo: Repository::new(uow),
        }
    }

    /// Gets one to-do by identifier.
    pub fn get(&self, id: EntityId) -> RepoResult<Option<Todo>> {
        self.repo.get(id)
    }

    /// Lists the most recently created to-dos, newest first.
    pub fn get_recent(&self, limit: u32) -> RepoResult<Vec<Todo>> {
        self.repo.get_paged(0, limit, TodoSort::Id, false)
    }

    /// Lists to-dos that are still open, evaluated in the store.
    pub fn get_open(&self) -> RepoResult<Vec<Todo>> {
        let open = Predicate::new().and(TodoField::Completed, Cmp::Eq, Value::Integer(0));
        self.repo.get_filtered(&open)
    }

    /// Persists a new to-do; the assigned identifier is written back.
    pub fn add(&self, todo: &mut Todo) -> RepoResult<EntityId> {
        self.repo.add(todo)
    }

    /// Persists the full state of an existing to-do.
    pub fn update(&self, todo: &Todo) -> RepoResult<()> {
        self.repo.update(todo)
    }

    /// Deletes one to-do.
    pub fn delete(&self, todo: &Todo) -> RepoResult<()> {
        self.repo.remove(todo)
    }

    /// Deletes the to-dos with the given identifiers in one commit.
    ///
    /// Fails with `NotFound` before deleting anything when any identifier
    /// is missing.
    pub fn delete_all(&self, ids: &[EntityId]) -> RepoResult<()> {
        self.repo.remove_all_by_ids(ids)
    }
}

/// `TodoService` with read-through response caching.
///
/// Reads are served from cache inside the expiry window; every write
/// invalidates the keys it affects: add drops the list entry, update drops
/// the item and list entries, a single delete drops only the item entry,
/// and a batch delete drops the list entry plus each item entry.
pub struct CachedTodoService<'uow> {
    service: TodoService<'uow>,
    by_id: MemoryCache<Option<Todo>>,
    recent: MemoryCache<Vec<Todo>>,
    ttl: Duration,
}

impl<'uow> CachedTodoService<'uow> {
    /// Creates a cached service with the default 30-second expiry.
    pub fn new(uow: &'uow UnitOfWork) -> Self {
        Self::with_ttl(uow, DEFAULT_TTL)
    }

    /// Creates a cached service with a caller-chosen expiry.
    pub fn with_ttl(uow: &'uow UnitOfWork, ttl: Duration) -> Self {
        Self {
            service: TodoService::new(uow),
            by_id: MemoryCache::new(),
            recent: MemoryCache::new(),
            ttl,
        }
    }

    /// Gets one to-do, read-through cached under `urn:todo:{id}`.
    ///
    /// Negative lookups are cached too, like any other response.
    pub fn get(&self, id: EntityId) -> RepoResult<Option<Todo>> {
        self.by_id
            .read_through(&cache_key(RESOURCE, id), self.ttl, || self.service.get(id))
    }

    /// Lists recent to-dos, read-through cached under `urn:todo:list`.
    pub fn get_recent(&self) -> RepoResult<Vec<Todo>> {
        self.recent
            .read_through(&cache_key_list(RESOURCE), self.ttl, || {
                self.service.get_recent(DEFAULT_RECENT_LIMIT)
            })
    }

    /// Adds a to-do and drops the cached listing.
    pub fn add(&self, todo: &mut Todo) -> RepoResult<EntityId> {
        let id = self.service.add(todo)?;
        self.recent.invalidate(&cache_key_list(RESOURCE));
        Ok(id)
    }

    /// Updates a to-do and drops its item entry plus the cached listing.
    pub fn update(&self, todo: &Todo) -> RepoResult<()> {
        self.service.update(todo)?;
        if let Some(id) = todo.id {
            self.by_id.invalidate(&cache_key(RESOURCE, id));
        }
        self.recent.invalidate(&cache_key_list(RESOURCE));
        Ok(())
    }

    /// Deletes a to-do and drops its item entry.
    ///
    /// The cached listing is left alone and will serve until it expires.
    pub fn delete(&self, todo: &Todo) -> RepoResult<()> {
        self.service.delete(todo)?;
        if let Some(id) = todo.id {
            self.by_id.invalidate(&cache_key(RESOURCE, id));
        }
        Ok(())
    }

    /// Deletes a batch of to-dos by identifier and drops the cached listing
    /// plus every affected item entry.
    pub fn delete_all(&self, ids: &[EntityId]) -> RepoResult<()> {
        self.service.delete_all(ids)?;
        self.recent.invalidate(&cache_key_list(RESOURCE));
        for &id in ids {
            self.by_id.invalidate(&cache_key(RESOURCE, id));
        }
        Ok(())
    }
}
