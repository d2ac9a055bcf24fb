//! Generic repository over an entity type and its Unit of Work.
//!
//! # Responsibility
//! - Translate CRUD and query calls into staged changes plus one commit.
//! - Map selected rows back into entities, rejecting invalid stored state.
//!
//! # Invariants
//! - The repository holds no entity state of its own; the session owns all
//!   tracking and pending changes.
//! - The repository borrows its Unit of Work, so it can never outlive it.

use crate::model::entity::{Entity, EntityId};
use crate::repo::query::Predicate;
use crate::repo::{RepoError, RepoResult};
use crate::session::UnitOfWork;
use rusqlite::{params, params_from_iter, Connection};
use std::marker::PhantomData;

/// Type-parameterized CRUD/query façade bound to one Unit of Work.
pub struct Repository<'uow, E: Entity> {
    uow: &'uow UnitOfWork,
    _entity: PhantomData<E>,
}

impl<'uow, E: Entity> Repository<'uow, E> {
    /// Binds a repository to the session that will own its changes.
    pub fn new(uow: &'uow UnitOfWork) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    /// The Unit of Work this repository is bound to.
    pub fn unit_of_work(&self) -> &UnitOfWork {
        self.uow
    }

    /// Persists a new entity and commits immediately.
    ///
    /// The store-assigned identifier is written back into `item` and
    /// returned; the entity is tracked by the session afterwards.
    pub fn add(&self, item: &mut E) -> RepoResult<EntityId> {
        self.uow.stage_insert(item)?;
        let receipt = self.uow.commit()?;
        let id = receipt
            .inserted_ids
            .last()
            .copied()
            .ok_or_else(|| RepoError::InvalidData("commit reported no inserted id".to_string()))?;
        item.set_id(id);
        self.uow.attach(item)?;
        Ok(id)
    }

    /// Persists every entity in order with exactly one commit.
    ///
    /// Assigned identifiers are written back in sequence order.
    pub fn add_all(&self, items: &mut [E]) -> RepoResult<Vec<EntityId>> {
        for item in items.iter() {
            self.uow.stage_insert(item)?;
        }
        let receipt = self.uow.commit()?;
        let skip = receipt
            .inserted_ids
            .len()
            .checked_sub(items.len())
            .ok_or_else(|| RepoError::InvalidData("commit reported too few inserted ids".to_string()))?;
        let assigned = receipt.inserted_ids[skip..].to_vec();
        for (item, id) in items.iter_mut().zip(&assigned) {
            item.set_id(*id);
            self.uow.attach(item)?;
        }
        Ok(assigned)
    }

    /// Attaches the entity if untracked, stages its removal and commits.
    ///
    /// Removing an identifier absent from the store is a store-level no-op.
    pub fn remove(&self, item: &E) -> RepoResult<()> {
        self.uow.attach(item)?;
        self.uow.stage_delete(item)?;
        self.uow.commit()?;
        Ok(())
    }

    /// Removes every entity with a single trailing commit.
    pub fn remove_all(&self, items: &[E]) -> RepoResult<()> {
        for item in items {
            self.uow.attach(item)?;
            self.uow.stage_delete(item)?;
        }
        self.uow.commit()?;
        Ok(())
    }

    /// Resolves each identifier and removes the matching entities with a
    /// single trailing commit.
    ///
    /// Policy for missing identifiers: the whole call fails with
    /// `RepoError::NotFound` before anything is staged, so no partial
    /// removal can occur.
    pub fn remove_all_by_ids(&self, ids: &[EntityId]) -> RepoResult<()> {
        let mut found = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.get(id)? {
                Some(entity) => found.push(entity),
                None => return Err(RepoError::NotFound(id)),
            }
        }
        self.remove_all(&found)
    }

    /// Point lookup by identifier.
    ///
    /// Returns `Ok(None)` for a missing identifier; never attaches and
    /// never commits.
    pub fn get(&self, id: EntityId) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1;", select_sql::<E>());
        self.uow.with_conn(|conn: &Connection| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![id])?;
            if let Some(row) = rows.next()? {
                return Ok(Some(E::from_row(row)?));
            }
            Ok(None)
        })
    }

    /// Attaches the entity, stages a full-state update and commits.
    ///
    /// Fails with `RepoError::NotFound` when the row no longer exists.
    pub fn update(&self, item: &E) -> RepoResult<()> {
        self.uow.attach(item)?;
        self.uow.stage_update(item)?;
        self.uow.commit()?;
        Ok(())
    }

    /// Returns one zero-indexed page, sorted by the given key in the store.
    ///
    /// Skips `page_count * page_index` rows then takes up to `page_count`.
    /// Tie ordering is only as stable as the store's sort.
    pub fn get_paged(
        &self,
        page_index: u32,
        page_count: u32,
        order: E::Sort,
        ascending: bool,
    ) -> RepoResult<Vec<E>> {
        let direction = if ascending { "ASC" } else { "DESC" };
        let sql = format!(
            "{} ORDER BY {} {direction} LIMIT ?1 OFFSET ?2;",
            select_sql::<E>(),
            E::sort_column(order)
        );
        let limit = i64::from(page_count);
        let offset = i64::from(page_count) * i64::from(page_index);
        self.uow.with_conn(|conn: &Connection| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![limit, offset])?;
            let mut entities = Vec::new();
            while let Some(row) = rows.next()? {
                entities.push(E::from_row(row)?);
            }
            Ok(entities)
        })
    }

    /// Returns every entity matching the predicate.
    ///
    /// The predicate is rendered to SQL and evaluated by the store;
    /// filtering never happens client-side.
    pub fn get_filtered(&self, predicate: &Predicate<E>) -> RepoResult<Vec<E>> {
        let (fragment, values) = predicate.render();
        let sql = format!("{}{fragment};", select_sql::<E>());
        self.uow.with_conn(|conn: &Connection| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(values.iter()))?;
            let mut entities = Vec::new();
            while let Some(row) = rows.next()? {
                entities.push(E::from_row(row)?);
            }
            Ok(entities)
        })
    }

    /// Delegates to the owned Unit of Work's `dispose()`. Safe to call more
    /// than once.
    pub fn dispose(&self) {
        self.uow.dispose();
    }
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::columns().join(", "), E::table())
}

#[cfg(test)]
mod tests {
    use super::select_sql;
    use crate::model::todo::Todo;

    #[test]
    fn select_sql_lists_id_then_mapped_columns() {
        assert_eq!(select_sql::<Todo>(), "SELECT id, task, completed FROM todos");
    }
}
