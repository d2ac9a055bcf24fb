use rusqlite::Connection;
use taskstore_core::db::open_db;
use taskstore_core::{RepoError, Repository, SessionError, Todo, UnitOfWork};

#[test]
fn dispose_is_idempotent() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    assert!(!uow.is_disposed());

    uow.dispose();
    uow.dispose();
    assert!(uow.is_disposed());
}

#[test]
fn disposing_a_repository_twice_is_safe() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    repo.dispose();
    repo.dispose();
    assert!(uow.is_disposed());
}

#[test]
fn operations_on_disposed_session_fail_with_disposed() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut todo = Todo::new("persist first");
    repo.add(&mut todo).unwrap();
    uow.dispose();

    assert!(matches!(
        uow.stage_insert(&Todo::new("late")),
        Err(SessionError::Disposed)
    ));
    assert!(matches!(uow.commit(), Err(SessionError::Disposed)));
    assert!(matches!(uow.attach(&todo), Err(SessionError::Disposed)));
    assert!(matches!(
        repo.get(1),
        Err(RepoError::Session(SessionError::Disposed))
    ));
}

#[test]
fn dispose_discards_staged_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discard.db");

    let uow = UnitOfWork::open(&path).unwrap();
    uow.stage_insert(&Todo::new("never flushed")).unwrap();
    assert_eq!(uow.pending(), 1);
    uow.dispose();
    assert_eq!(uow.pending(), 0);

    let fresh = UnitOfWork::open(&path).unwrap();
    let repo = Repository::<Todo>::new(&fresh);
    assert!(repo.get_paged(0, 10, taskstore_core::TodoSort::Id, true).unwrap().is_empty());
}

#[test]
fn attach_requires_an_id_and_is_idempotent() {
    let uow = UnitOfWork::open_in_memory().unwrap();

    let unpersisted = Todo::new("no id");
    assert!(matches!(
        uow.attach(&unpersisted),
        Err(SessionError::MissingId { table: "todos" })
    ));

    let mut persisted = Todo::new("has id");
    persisted.id = Some(7);
    assert!(!uow.is_attached(&persisted).unwrap());
    uow.attach(&persisted).unwrap();
    uow.attach(&persisted).unwrap();
    assert!(uow.is_attached(&persisted).unwrap());
}

#[test]
fn committing_an_empty_stage_is_a_noop() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let receipt = uow.commit().unwrap();
    assert!(receipt.inserted_ids.is_empty());
}

#[test]
fn failed_commit_keeps_changes_staged_and_retry_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retry.db");

    // Seed one row through its own session.
    let id = {
        let seed_uow = UnitOfWork::open(&path).unwrap();
        let seed_repo = Repository::<Todo>::new(&seed_uow);
        let mut seed = Todo::new("seed");
        seed_repo.add(&mut seed).unwrap()
    };

    let uow = UnitOfWork::open(&path).unwrap();
    let mut edited = Todo::new("edited");
    edited.id = Some(id);
    uow.attach(&edited).unwrap();
    uow.stage_update(&edited).unwrap();

    // The row disappears out-of-band, so the staged update has nothing to
    // match at commit time.
    let side = Connection::open(&path).unwrap();
    side.execute("DELETE FROM todos WHERE id = ?1;", [id]).unwrap();

    let err = uow.commit().unwrap_err();
    assert!(matches!(err, SessionError::StaleChange { table: "todos", id: stale } if stale == id));
    assert_eq!(uow.pending(), 1);

    // Restore the row; the retained staged change can now be retried as-is.
    side.execute(
        "INSERT INTO todos (id, task, completed) VALUES (?1, 'seed', 0);",
        [id],
    )
    .unwrap();

    uow.commit().unwrap();
    assert_eq!(uow.pending(), 0);

    let check = open_db(&path).unwrap();
    let task: String = check
        .query_row("SELECT task FROM todos WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(task, "edited");
}

#[test]
fn constraint_violation_surfaces_as_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("constraint.db");

    let uow = UnitOfWork::open(&path).unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut first = Todo::new("unique task");
    repo.add(&mut first).unwrap();

    let side = Connection::open(&path).unwrap();
    side.execute_batch("CREATE UNIQUE INDEX idx_todos_task_unique ON todos (task);")
        .unwrap();

    let mut duplicate = Todo::new("unique task");
    let err = repo.add(&mut duplicate).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Session(SessionError::Persistence(_))
    ));
    // The rejected insert stays staged for the caller to inspect or retry.
    assert_eq!(uow.pending(), 1);
}
