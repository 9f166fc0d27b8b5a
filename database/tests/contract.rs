//! Conformance tests every repository implementation must pass
//!
//! The same suite runs against the in-memory mock and the SQLite backend,
//! so both report absence, timestamps, conflicts, and missing-row mutations
//! identically.

use std::sync::Arc;
use taskd_core::models::UpdateTask;
use taskd_core::repository::{TaskRepository, UserRepository};
use taskd_db::{Database, SqliteTaskRepository, SqliteUserRepository};
use taskd_mocks::{fixtures, MockTaskRepository, MockUserRepository};
use tempfile::TempDir;

async fn run_task_repository_contract<R: TaskRepository>(repo: &R) {
    // Empty storage lists an empty vector, not an error
    assert!(repo.get_all().await.expect("get_all").is_empty());

    // Lookup of an unknown id reports absence as None
    assert!(repo.get_by_id(99_999).await.expect("get_by_id").is_none());

    // Insert assigns an identifier and stamps both timestamps equally
    let saved = repo
        .save(fixtures::unsaved_task("contract"))
        .await
        .expect("save");
    assert!(saved.is_persisted());
    assert_eq!(saved.created_at, saved.updated_at);

    // The roundtrip preserves every field
    let id = saved.id.expect("id");
    let loaded = repo
        .get_by_id(id)
        .await
        .expect("get_by_id")
        .expect("present");
    assert_eq!(loaded, saved);

    // Update refreshes updated_at and leaves created_at alone
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let mut edited = loaded.clone();
    edited.apply(UpdateTask {
        title: Some("contract renamed".to_string()),
        ..UpdateTask::default()
    });
    let updated = repo.save(edited).await.expect("update");
    assert_eq!(updated.title, "contract renamed");
    assert_eq!(updated.created_at, saved.created_at);
    assert!(updated.updated_at > saved.updated_at);

    // Delete removes the row; the id then reads back as absent
    repo.delete(id).await.expect("delete");
    assert!(repo.get_by_id(id).await.expect("get_by_id").is_none());

    // Mutations of missing rows are not-found failures
    assert!(repo.delete(id).await.expect_err("re-delete").is_not_found());
    assert!(repo
        .save(updated)
        .await
        .expect_err("update vanished row")
        .is_not_found());

    // A healthy repository answers its health check
    repo.health_check().await.expect("health check");
}

async fn run_user_repository_contract<R: UserRepository>(repo: &R) {
    // Unknown usernames report absence as None
    assert!(repo
        .find_by_username("contract-user")
        .await
        .expect("find")
        .is_none());

    repo.create(fixtures::new_user("contract-user"))
        .await
        .expect("create");

    let user = repo
        .find_by_username("contract-user")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(user.username, "contract-user");
    assert_eq!(user.password_hash, fixtures::sample_password_hash());

    // Re-registration conflicts instead of overwriting
    let err = repo
        .create(fixtures::new_user("contract-user"))
        .await
        .expect_err("duplicate");
    assert!(err.is_conflict());

    // The first record is untouched by the failed attempt
    let survivor = repo
        .find_by_username("contract-user")
        .await
        .expect("find")
        .expect("present");
    assert_eq!(survivor.password_hash, user.password_hash);
}

async fn sqlite_backend() -> (Arc<Database>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("contract.db").display());
    let db = Arc::new(Database::from_url(&url).expect("database"));
    db.migrate().await.expect("migrate");
    (db, dir)
}

#[tokio::test]
async fn test_mock_task_repository_meets_contract() {
    let repo = MockTaskRepository::new();
    run_task_repository_contract(&repo).await;
}

#[tokio::test]
async fn test_sqlite_task_repository_meets_contract() {
    let (db, _dir) = sqlite_backend().await;
    let repo = SqliteTaskRepository::new(db);
    run_task_repository_contract(&repo).await;
}

#[tokio::test]
async fn test_mock_user_repository_meets_contract() {
    let repo = MockUserRepository::new();
    run_user_repository_contract(&repo).await;
}

#[tokio::test]
async fn test_sqlite_user_repository_meets_contract() {
    let (db, _dir) = sqlite_backend().await;
    let repo = SqliteUserRepository::new(db);
    run_user_repository_contract(&repo).await;
}
