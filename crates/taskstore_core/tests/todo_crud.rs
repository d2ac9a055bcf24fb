use taskstore_core::{RepoError, Repository, SessionError, Todo, UnitOfWork};

#[test]
fn add_then_get_roundtrips_all_fields() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut todo = Todo::new("buy milk");
    let id = repo.add(&mut todo).unwrap();
    assert_eq!(todo.id, Some(id));

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.task, "buy milk");
    assert!(!loaded.completed);
    assert_eq!(loaded.id, Some(id));
}

#[test]
fn added_entity_is_tracked_by_the_session() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut todo = Todo::new("track me");
    repo.add(&mut todo).unwrap();
    assert!(uow.is_attached(&todo).unwrap());
}

#[test]
fn get_missing_id_returns_none_not_an_error() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    assert!(repo.get(12345).unwrap().is_none());
}

#[test]
fn remove_then_get_returns_none() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut todo = Todo::new("short lived");
    let id = repo.add(&mut todo).unwrap();

    repo.remove(&todo).unwrap();
    assert!(repo.get(id).unwrap().is_none());
}

#[test]
fn remove_with_unknown_id_is_a_store_level_noop() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut existing = Todo::new("keep me");
    let kept = repo.add(&mut existing).unwrap();

    let mut ghost = Todo::new("never persisted");
    ghost.id = Some(kept + 100);
    repo.remove(&ghost).unwrap();

    assert!(repo.get(kept).unwrap().is_some());
}

#[test]
fn update_then_get_reflects_every_field() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut todo = Todo::new("draft");
    let id = repo.add(&mut todo).unwrap();

    todo.task = "final wording".to_string();
    todo.complete();
    repo.update(&todo).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.task, "final wording");
    assert!(loaded.completed);
}

#[test]
fn update_missing_row_returns_not_found() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut ghost = Todo::new("no row behind me");
    ghost.id = Some(404);
    let err = repo.update(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn update_without_id_is_rejected_before_staging() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let unpersisted = Todo::new("no id yet");
    let err = repo.update(&unpersisted).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Session(SessionError::MissingId { table: "todos" })
    ));
    assert_eq!(uow.pending(), 0);
}

#[test]
fn add_all_flushes_once_and_assigns_ids_in_order() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut items = vec![Todo::new("one"), Todo::new("two"), Todo::new("three")];
    let ids = repo.add_all(&mut items).unwrap();

    assert_eq!(ids.len(), 3);
    assert!(ids[0] < ids[1] && ids[1] < ids[2]);
    for (item, id) in items.iter().zip(&ids) {
        assert_eq!(item.id, Some(*id));
        assert!(repo.get(*id).unwrap().is_some());
    }
    assert_eq!(uow.pending(), 0);
}

#[test]
fn staged_batch_commits_in_a_single_flush() {
    let uow = UnitOfWork::open_in_memory().unwrap();

    uow.stage_insert(&Todo::new("a")).unwrap();
    uow.stage_insert(&Todo::new("b")).unwrap();
    uow.stage_insert(&Todo::new("c")).unwrap();
    assert_eq!(uow.pending(), 3);

    let receipt = uow.commit().unwrap();
    assert_eq!(receipt.inserted_ids.len(), 3);
    assert_eq!(uow.pending(), 0);
}

#[test]
fn remove_all_deletes_batch_with_one_commit() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut items = vec![Todo::new("a"), Todo::new("b"), Todo::new("c")];
    let ids = repo.add_all(&mut items).unwrap();

    repo.remove_all(&items).unwrap();
    for id in ids {
        assert!(repo.get(id).unwrap().is_none());
    }
}

#[test]
fn remove_all_by_ids_deletes_each_resolved_entity() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut items = vec![Todo::new("a"), Todo::new("b")];
    let ids = repo.add_all(&mut items).unwrap();

    repo.remove_all_by_ids(&ids).unwrap();
    assert!(repo.get(ids[0]).unwrap().is_none());
    assert!(repo.get(ids[1]).unwrap().is_none());
}

#[test]
fn remove_all_by_ids_with_missing_id_fails_and_deletes_nothing() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut kept = Todo::new("survivor");
    let kept_id = repo.add(&mut kept).unwrap();
    let missing_id = kept_id + 100;

    let err = repo.remove_all_by_ids(&[kept_id, missing_id]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing_id));

    // Fail-fast policy: the batch resolves every id before staging, so the
    // existing row is untouched and nothing is left pending.
    assert!(repo.get(kept_id).unwrap().is_some());
    assert_eq!(uow.pending(), 0);
}

#[test]
fn add_rejects_invalid_entity_before_any_sql() {
    let uow = UnitOfWork::open_in_memory().unwrap();
    let repo = Repository::<Todo>::new(&uow);

    let mut empty = Todo::new("   ");
    let err = repo.add(&mut empty).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Session(SessionError::Validation(_))
    ));
    assert_eq!(uow.pending(), 0);
}
