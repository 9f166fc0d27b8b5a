use std::sync::Arc;
use taskd_core::models::{NewTask, Task, UpdateTask};
use taskd_core::repository::{TaskRepository, UserRepository};
use taskd_db::{params, Database, SqliteTaskRepository, SqliteUserRepository};
use taskd_mocks::fixtures;
use tempfile::TempDir;

/// File-backed database so data survives session close-and-reopen cycles.
/// The directory guard must live as long as the handle.
struct TestDb {
    db: Arc<Database>,
    _dir: TempDir,
}

async fn create_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Arc::new(Database::from_url(&url).expect("database"));
    db.migrate().await.expect("migrate");
    TestDb { db, _dir: dir }
}

#[tokio::test]
async fn test_database_creation_and_health() {
    let test_db = create_test_db().await;
    assert!(test_db.db.health_check().await.is_ok());

    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));
    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_save_then_get_roundtrip() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    let saved = repo
        .save(Task::new(NewTask {
            title: "Write the quarterly report".to_string(),
            description: "Numbers from finance, narrative from us".to_string(),
            completed: false,
        }))
        .await
        .expect("save");

    assert!(saved.is_persisted());
    assert_eq!(saved.created_at, saved.updated_at);

    let loaded = repo
        .get_by_id(saved.id.expect("id"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn test_absent_id_is_none_not_error() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    let missing = repo.get_by_id(424242).await.expect("get");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_empty_database_lists_empty_vec() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    let all = repo.get_all().await.expect("get_all");
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_listing_preserves_insertion_order() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    for title in ["first", "second", "third"] {
        repo.save(fixtures::unsaved_task(title)).await.expect("save");
    }

    let all = repo.get_all().await.expect("get_all");
    let titles: Vec<&str> = all.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    let ids: Vec<i64> = all.iter().filter_map(|task| task.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_create_update_delete_scenario() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    // Create: both timestamps carry the same instant
    let created = repo
        .save(fixtures::unsaved_task("lifecycle"))
        .await
        .expect("create");
    assert_eq!(created.created_at, created.updated_at);
    let id = created.id.expect("id");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    // Update: updated_at moves forward, created_at stays put
    let mut edited = created.clone();
    edited.apply(UpdateTask {
        completed: Some(true),
        ..UpdateTask::default()
    });
    let updated = repo.save(edited).await.expect("update");
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.created_at);

    // Delete, then the id reads back as absent
    repo.delete(id).await.expect("delete");
    assert!(repo.get_by_id(id).await.expect("get").is_none());

    // Deleting again is a not-found failure, not a silent success
    let err = repo.delete(id).await.expect_err("second delete");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_vanished_row_is_not_found() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    let saved = repo
        .save(fixtures::unsaved_task("doomed"))
        .await
        .expect("save");
    repo.delete(saved.id.expect("id")).await.expect("delete");

    let err = repo.save(saved).await.expect_err("vanished row");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_data_survives_session_replacement() {
    let test_db = create_test_db().await;
    let repo = SqliteTaskRepository::new(Arc::clone(&test_db.db));

    let saved = repo
        .save(fixtures::unsaved_task("durable"))
        .await
        .expect("save");

    // Force the cached session out so the next operation opens a fresh one
    let mut session = test_db.db.acquire().await.expect("acquire");
    session.close().await;
    test_db.db.release(session).await;

    let loaded = repo
        .get_by_id(saved.id.expect("id"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(loaded.title, "durable");
    assert_eq!(loaded.created_at, saved.created_at);
}

#[tokio::test]
async fn test_duplicate_username_conflicts_and_stores_one_row() {
    let test_db = create_test_db().await;
    let repo = SqliteUserRepository::new(Arc::clone(&test_db.db));

    repo.create(fixtures::new_user("dave")).await.expect("create");
    let err = repo
        .create(fixtures::new_user("dave"))
        .await
        .expect_err("duplicate username");
    assert!(err.is_conflict());

    // Exactly one row made it into storage
    let mut session = test_db.db.acquire().await.expect("acquire");
    let rows = session
        .select_all(
            "SELECT username FROM users WHERE username = ?",
            &params!["dave"],
        )
        .await
        .expect("select");
    test_db.db.release(session).await;
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_login_relevant_lookup_roundtrip() {
    let test_db = create_test_db().await;
    let repo = SqliteUserRepository::new(Arc::clone(&test_db.db));

    repo.create(fixtures::new_user("erin")).await.expect("create");

    let user = repo
        .find_by_username("erin")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(user.username, "erin");
    assert_eq!(user.password_hash, fixtures::sample_password_hash());

    assert!(repo
        .find_by_username("ERIN")
        .await
        .expect("find")
        .is_none());
}

#[tokio::test]
async fn test_tasks_and_users_share_one_database() {
    let test_db = create_test_db().await;
    let tasks = SqliteTaskRepository::new(Arc::clone(&test_db.db));
    let users = SqliteUserRepository::new(Arc::clone(&test_db.db));

    tasks
        .save(fixtures::unsaved_task("shared"))
        .await
        .expect("save");
    users.create(fixtures::new_user("frank")).await.expect("create");

    assert_eq!(tasks.get_all().await.expect("get_all").len(), 1);
    assert!(users
        .find_by_username("frank")
        .await
        .expect("find")
        .is_some());
}
