use super::*;

#[tokio::test]
async fn set_then_get_round_trips_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .set_item("eventVista_user", r#"{"id":"u-1"}"#)
        .await
        .expect("set");
    let value = storage.get_item("eventVista_user").await.expect("get");
    assert_eq!(value.as_deref(), Some(r#"{"id":"u-1"}"#));
}

#[tokio::test]
async fn set_overwrites_existing_key() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_item("k", "first").await.expect("set");
    storage.set_item("k", "second").await.expect("overwrite");
    assert_eq!(
        storage.get_item("k").await.expect("get").as_deref(),
        Some("second")
    );
}

#[tokio::test]
async fn remove_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set_item("k", "v").await.expect("set");
    storage.remove_item("k").await.expect("remove");
    storage.remove_item("k").await.expect("remove again");
    assert_eq!(storage.get_item("k").await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn memory_storage_behaves_like_local_storage() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get_item("k").await.expect("get"), None);
    storage.set_item("k", "v").await.expect("set");
    assert_eq!(storage.get_item("k").await.expect("get").as_deref(), Some("v"));
    storage.remove_item("k").await.expect("remove");
    assert_eq!(storage.get_item("k").await.expect("get"), None);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn empty_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("   "), DEFAULT_DATABASE_URL);
}

#[test]
fn keeps_memory_url_untouched() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(sqlite_path("sqlite::memory:"), None);
}

#[test]
fn prepare_creates_parent_directory() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("test.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    assert!(prepared.starts_with("sqlite://"));
    assert!(temp_root.path().join("data").exists());
}
