//! Unit of Work: one SQLite session with an explicit staged-change list.
//!
//! # Responsibility
//! - Own the connection for one logical caller scope.
//! - Stage INSERT/UPDATE/DELETE changes and flush them in one transaction.
//! - Guarantee deterministic release of the session on every exit path.
//!
//! # Invariants
//! - A failed commit rolls back and leaves every staged change in place, so
//!   the caller can retry or inspect.
//! - After `dispose()` every operation fails with `SessionError::Disposed`.
//! - Staging validates entities before any SQL is built.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::entity::{Entity, EntityId, ValidationError};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub type SessionResult<T> = Result<T, SessionError>;

/// Error raised by Unit of Work operations.
#[derive(Debug)]
pub enum SessionError {
    /// Operation attempted after `dispose()`.
    Disposed,
    /// An entity without a store-assigned identifier was attached or staged
    /// for update/delete.
    MissingId { table: &'static str },
    /// A staged update matched no row at commit time.
    StaleChange { table: &'static str, id: EntityId },
    /// Domain validation rejected the entity before staging.
    Validation(ValidationError),
    /// The backing store rejected a statement or the commit itself.
    Persistence(DbError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disposed => write!(f, "unit of work has been disposed"),
            Self::MissingId { table } => {
                write!(f, "entity for table `{table}` has no identifier yet")
            }
            Self::StaleChange { table, id } => {
                write!(f, "staged update matched no row in `{table}` for id {id}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Persistence(value)
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(DbError::Sqlite(value))
    }
}

/// Result of a successful commit.
///
/// `inserted_ids` holds one store-assigned identifier per staged insert, in
/// staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub inserted_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy)]
enum ChangeKind {
    Insert,
    Update { id: EntityId },
    Delete { id: EntityId },
}

/// One staged mutation, fully rendered at staging time so it can be
/// re-executed unchanged when a failed commit is retried.
struct StagedChange {
    kind: ChangeKind,
    table: &'static str,
    sql: String,
    params: Vec<Value>,
}

/// Owns a connected SQLite session and its pending change log.
///
/// One Unit of Work serves one logical caller scope; it is synchronous and
/// single-threaded by contract, so interior mutability uses `RefCell`
/// rather than locks. Concurrent stores are isolated by SQLite itself.
pub struct UnitOfWork {
    conn: RefCell<Option<Connection>>,
    staged: RefCell<Vec<StagedChange>>,
    tracked: RefCell<HashSet<(&'static str, EntityId)>>,
}

impl UnitOfWork {
    /// Wraps an already-bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: RefCell::new(Some(conn)),
            staged: RefCell::new(Vec::new()),
            tracked: RefCell::new(HashSet::new()),
        }
    }

    /// Opens a file-backed session with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens an in-memory session with migrations applied.
    pub fn open_in_memory() -> SessionResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Tracks the entity's identity in this session.
    ///
    /// Attaching an already-tracked entity is a no-op. The entity must have
    /// a store-assigned identifier.
    pub fn attach<E: Entity>(&self, entity: &E) -> SessionResult<()> {
        self.ensure_live()?;
        let id = require_id::<E>(entity)?;
        self.tracked.borrow_mut().insert((E::table(), id));
        Ok(())
    }

    /// Returns whether the entity's identity is tracked by this session.
    pub fn is_attached<E: Entity>(&self, entity: &E) -> SessionResult<bool> {
        self.ensure_live()?;
        Ok(match entity.id() {
            Some(id) => self.tracked.borrow().contains(&(E::table(), id)),
            None => false,
        })
    }

    /// Stages an INSERT for the entity. The assigned identifier is reported
    /// through the `CommitReceipt` of the flushing commit.
    pub fn stage_insert<E: Entity>(&self, entity: &E) -> SessionResult<()> {
        self.ensure_live()?;
        entity.validate()?;
        self.staged.borrow_mut().push(StagedChange {
            kind: ChangeKind::Insert,
            table: E::table(),
            sql: insert_sql::<E>(),
            params: entity.values(),
        });
        Ok(())
    }

    /// Stages a full-row UPDATE for the entity (all mapped columns).
    pub fn stage_update<E: Entity>(&self, entity: &E) -> SessionResult<()> {
        self.ensure_live()?;
        entity.validate()?;
        let id = require_id::<E>(entity)?;
        let mut params = entity.values();
        params.push(Value::Integer(id));
        self.staged.borrow_mut().push(StagedChange {
            kind: ChangeKind::Update { id },
            table: E::table(),
            sql: update_sql::<E>(),
            params,
        });
        Ok(())
    }

    /// Stages a DELETE for the entity. Deleting a row that no longer exists
    /// is a store-level no-op.
    pub fn stage_delete<E: Entity>(&self, entity: &E) -> SessionResult<()> {
        self.ensure_live()?;
        let id = require_id::<E>(entity)?;
        self.staged.borrow_mut().push(StagedChange {
            kind: ChangeKind::Delete { id },
            table: E::table(),
            sql: delete_sql::<E>(),
            params: vec![Value::Integer(id)],
        });
        Ok(())
    }

    /// Number of staged changes awaiting commit.
    pub fn pending(&self) -> usize {
        self.staged.borrow().len()
    }

    /// Flushes every staged change inside one transaction.
    ///
    /// On success the staged list is cleared and the receipt carries the
    /// identifiers assigned to staged inserts. On failure the transaction
    /// rolls back and all changes remain staged. Committing an empty stage
    /// is a no-op.
    pub fn commit(&self) -> SessionResult<CommitReceipt> {
        let started_at = Instant::now();
        let mut conn_slot = self.conn.borrow_mut();
        let conn = conn_slot.as_mut().ok_or(SessionError::Disposed)?;

        let staged = self.staged.borrow();
        let change_count = staged.len();
        if change_count == 0 {
            return Ok(CommitReceipt::default());
        }
        info!("event=commit module=session status=start changes={change_count}");

        let mut receipt = CommitReceipt::default();
        let result = apply_staged(conn, &staged, &mut receipt);
        drop(staged);
        drop(conn_slot);

        match result {
            Ok(()) => {
                self.staged.borrow_mut().clear();
                info!(
                    "event=commit module=session status=ok changes={change_count} inserted={} duration_ms={}",
                    receipt.inserted_ids.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(receipt)
            }
            Err(err) => {
                error!(
                    "event=commit module=session status=error changes={change_count} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Releases the session. Idempotent; staged changes and tracking state
    /// are discarded, and later operations fail with `Disposed`.
    pub fn dispose(&self) {
        let released = self.conn.borrow_mut().take();
        if released.is_some() {
            self.staged.borrow_mut().clear();
            self.tracked.borrow_mut().clear();
            info!("event=dispose module=session status=ok");
        }
    }

    /// Returns whether the session has been released.
    pub fn is_disposed(&self) -> bool {
        self.conn.borrow().is_none()
    }

    /// Runs a read-only closure against the live connection.
    ///
    /// Never commits. Fails with `Disposed` after disposal.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<SessionError>,
    {
        let slot = self.conn.borrow();
        let conn = slot.as_ref().ok_or(SessionError::Disposed)?;
        f(conn)
    }

    fn ensure_live(&self) -> SessionResult<()> {
        if self.conn.borrow().is_none() {
            return Err(SessionError::Disposed);
        }
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn apply_staged(
    conn: &mut Connection,
    staged: &[StagedChange],
    receipt: &mut CommitReceipt,
) -> SessionResult<()> {
    let tx = conn.transaction()?;
    for change in staged {
        let changed = tx.execute(&change.sql, params_from_iter(change.params.iter()))?;
        match change.kind {
            ChangeKind::Insert => receipt.inserted_ids.push(tx.last_insert_rowid()),
            ChangeKind::Update { id } => {
                if changed == 0 {
                    return Err(SessionError::StaleChange {
                        table: change.table,
                        id,
                    });
                }
            }
            ChangeKind::Delete { .. } => {}
        }
    }
    tx.commit()?;
    Ok(())
}

fn require_id<E: Entity>(entity: &E) -> SessionResult<EntityId> {
    entity
        .id()
        .ok_or(SessionError::MissingId { table: E::table() })
}

fn insert_sql<E: Entity>() -> String {
    let columns = E::columns();
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        E::table(),
        columns.join(", "),
        placeholders
    )
}

fn update_sql<E: Entity>() -> String {
    let columns = E::columns();
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE id = ?{};",
        E::table(),
        assignments,
        columns.len() + 1
    )
}

fn delete_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE id = ?1;", E::table())
}
