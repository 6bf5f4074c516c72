use chrono::{DateTime, Duration, TimeZone, Utc};
use course_core::db::{open_db, open_db_in_memory};
use course_core::{Course, CourseStore, SqliteCourseStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
}

fn stamped(id: &str, name: &str) -> Course {
    let mut course = Course::with_id(id, name, "English", "A1", "Beginner");
    course.created_date = Some(t0());
    course
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    let inserted = store
        .insert_if_absent(Some("en-a1"), &stamped("en-a1", "English A1"))
        .unwrap();
    let loaded = store.get("en-a1").unwrap().unwrap();

    assert_eq!(loaded, inserted);
    assert_eq!(loaded.created_date, Some(t0()));
    assert_eq!(loaded.last_modified_date, None);
}

#[test]
fn generated_id_is_assigned_and_persisted() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    let inserted = store
        .insert_if_absent(None, &Course::new("Italian C1", "Italian", "C1", "Advanced"))
        .unwrap();

    assert!(!inserted.id.is_empty());
    assert_eq!(store.get(&inserted.id).unwrap().unwrap().name, "Italian C1");
}

#[test]
fn empty_explicit_id_gets_generated_id_and_list_still_works() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    let inserted = store
        .insert_if_absent(Some(""), &Course::new("n", "", "", ""))
        .unwrap();

    assert!(!inserted.id.is_empty());
    assert!(store.get("").unwrap().is_none());
    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, inserted.id);
}

#[test]
fn explicit_id_conflict_leaves_original_row() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    store
        .insert_if_absent(Some("dup"), &stamped("dup", "first"))
        .unwrap();
    let err = store
        .insert_if_absent(Some("dup"), &stamped("dup", "second"))
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(id) if id == "dup"));
    assert_eq!(store.get("dup").unwrap().unwrap().name, "first");
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn replace_keeps_created_date_and_clamps_last_modified() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();
    store
        .insert_if_absent(Some("c"), &stamped("c", "English A1"))
        .unwrap();

    let mut first = stamped("c", "English A2");
    first.created_date = None;
    first.last_modified_date = Some(t0() + Duration::hours(2));
    let replaced = store.replace_if_exists("c", &first).unwrap();
    assert_eq!(replaced.name, "English A2");
    assert_eq!(replaced.created_date, Some(t0()));
    assert_eq!(replaced.last_modified_date, Some(t0() + Duration::hours(2)));

    let mut stale = stamped("c", "English B1");
    stale.created_date = Some(t0() + Duration::days(30));
    stale.last_modified_date = Some(t0() + Duration::hours(1));
    let replaced = store.replace_if_exists("c", &stale).unwrap();
    assert_eq!(replaced.name, "English B1");
    assert_eq!(replaced.created_date, Some(t0()));
    assert_eq!(replaced.last_modified_date, Some(t0() + Duration::hours(2)));
}

#[test]
fn replace_missing_row_is_not_found_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    let err = store
        .replace_if_exists("ghost", &stamped("ghost", "n"))
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();
    store
        .insert_if_absent(Some("d"), &stamped("d", "n"))
        .unwrap();

    assert!(store.delete_if_exists("d").unwrap());
    assert!(!store.delete_if_exists("d").unwrap());
    assert!(store.get("d").unwrap().is_none());
}

#[test]
fn list_returns_rows_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();
    for id in ["zeta", "alpha", "mid"] {
        store.insert_if_absent(Some(id), &stamped(id, id)).unwrap();
    }

    let ids: Vec<_> = store.list().unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn read_rejects_undecodable_timestamp() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO courses (id, name, created_date) VALUES ('bad', 'n', ?1);",
        [i64::MAX],
    )
    .unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    assert!(matches!(store.get("bad"), Err(StoreError::InvalidData(_))));
}

#[test]
fn concurrent_connections_insert_same_id_exactly_once() {
    const WRITERS: usize = 8;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    drop(open_db(&path).unwrap());

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let store = SqliteCourseStore::try_new(&conn).unwrap();
                let course = stamped("shared", &format!("writer-{writer}"));
                barrier.wait();
                match store.insert_if_absent(Some("shared"), &course) {
                    Ok(_) => true,
                    Err(StoreError::Conflict(_)) => false,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);

    let conn = open_db(&path).unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

fn race_on_file<A, B, RA, RB>(path: &Path, left: A, right: B) -> (RA, RB)
where
    A: FnOnce(&SqliteCourseStore<'_>) -> RA + Send + 'static,
    B: FnOnce(&SqliteCourseStore<'_>) -> RB + Send + 'static,
    RA: Send + 'static,
    RB: Send + 'static,
{
    let barrier = Arc::new(Barrier::new(2));
    let left = spawn_on_own_connection(path.to_path_buf(), Arc::clone(&barrier), left);
    let right = spawn_on_own_connection(path.to_path_buf(), barrier, right);
    (left.join().unwrap(), right.join().unwrap())
}

fn spawn_on_own_connection<F, R>(path: PathBuf, barrier: Arc<Barrier>, op: F) -> JoinHandle<R>
where
    F: FnOnce(&SqliteCourseStore<'_>) -> R + Send + 'static,
    R: Send + 'static,
{
    thread::spawn(move || {
        let conn = open_db(&path).unwrap();
        let store = SqliteCourseStore::try_new(&conn).unwrap();
        barrier.wait();
        op(&store)
    })
}

#[test]
fn replace_racing_delete_never_survives_on_sqlite() {
    const ROUNDS: usize = 20;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replace-delete.db");
    let conn = open_db(&path).unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    for round in 0..ROUNDS {
        let id = format!("contended-{round}");
        store.insert_if_absent(Some(&id), &stamped(&id, "n")).unwrap();

        let replace_id = id.clone();
        let delete_id = id.clone();
        let (replaced, deleted) = race_on_file(
            &path,
            move |store| {
                let mut edit = stamped(&replace_id, "edited");
                edit.last_modified_date = Some(t0() + Duration::minutes(1));
                match store.replace_if_exists(&replace_id, &edit) {
                    Ok(_) => true,
                    Err(StoreError::NotFound(_)) => false,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            },
            move |store| store.delete_if_exists(&delete_id).unwrap(),
        );

        assert!(deleted, "round {round}: delete missed the existing row");
        assert!(
            store.get(&id).unwrap().is_none(),
            "round {round}: row survived delete (replaced={replaced})"
        );
    }
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn insert_racing_delete_leaves_consistent_state_on_sqlite() {
    const ROUNDS: usize = 20;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("insert-delete.db");
    let conn = open_db(&path).unwrap();
    let store = SqliteCourseStore::try_new(&conn).unwrap();

    for round in 0..ROUNDS {
        let id = format!("fresh-{round}");
        let insert_id = id.clone();
        let delete_id = id.clone();
        let (inserted, deleted) = race_on_file(
            &path,
            move |store| {
                store
                    .insert_if_absent(Some(&insert_id), &stamped(&insert_id, "n"))
                    .is_ok()
            },
            move |store| store.delete_if_exists(&delete_id).unwrap(),
        );

        assert!(inserted);
        let present = store.get(&id).unwrap().is_some();
        assert_eq!(present, !deleted);
    }
}
