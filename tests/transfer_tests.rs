use gridfs_transfer::{
    ChunkedStore, DuplicatePolicy, MemoryStore, TransferError, list_versions, read_file,
    read_file_by_id, upload_file,
};
use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_file(tag: &str, contents: &[u8]) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "gridfs-transfer-{}-{}-{}",
        tag,
        std::process::id(),
        nanos
    ));
    fs::write(&temp_path, contents).expect("failed to write temp file");
    temp_path
}

#[tokio::test]
async fn geojson_round_trip_returns_identical_bytes() {
    let store = MemoryStore::default();
    let path = temp_file("a.geojson", b"{}");

    upload_file(&store, &path, "a.geojson", DuplicatePolicy::Allow)
        .await
        .expect("upload failed");
    let data = read_file(&store, "a.geojson").await.expect("read failed");

    assert_eq!(data, b"{}");
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn multi_chunk_payload_round_trips() {
    let store = MemoryStore::new(1024);
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let path = temp_file("areas", &payload);

    let id = upload_file(&store, &path, "PeopleGroupAreas.geojson", DuplicatePolicy::Allow)
        .await
        .expect("upload failed");

    assert_eq!(store.chunk_count(&id).await, Some(10));
    let data = read_file(&store, "PeopleGroupAreas.geojson")
        .await
        .expect("read failed");
    assert_eq!(data, payload);
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn reading_unknown_filename_is_remote_not_found() {
    let store = MemoryStore::default();

    let err = read_file(&store, "missing.geojson").await.unwrap_err();
    assert!(
        matches!(err, TransferError::RemoteObjectNotFound(ref name) if name == "missing.geojson")
    );
}

#[tokio::test]
async fn missing_local_file_performs_no_write() {
    let store = MemoryStore::default();
    let mut path = std::env::temp_dir();
    path.push(format!("gridfs-transfer-absent-{}", std::process::id()));

    let err = upload_file(&store, &path, "absent", DuplicatePolicy::Allow)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::LocalFileNotFound(ref p) if *p == path));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn directory_path_is_unreadable_not_missing() {
    let store = MemoryStore::default();
    let dir = std::env::temp_dir();

    let err = upload_file(&store, &dir, "dir", DuplicatePolicy::Allow)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::LocalFileUnreadable { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn duplicate_uploads_keep_both_and_oldest_is_read() {
    let store = MemoryStore::default();
    let first = temp_file("dup-first", b"first");
    let second = temp_file("dup-second", b"second");

    let first_id = upload_file(&store, &first, "dup.geojson", DuplicatePolicy::Allow)
        .await
        .expect("first upload failed");
    let second_id = upload_file(&store, &second, "dup.geojson", DuplicatePolicy::Allow)
        .await
        .expect("second upload failed");
    assert_ne!(first_id, second_id);

    let versions = list_versions(&store, "dup.geojson").await.unwrap();
    let ids: Vec<_> = versions.iter().map(|v| v.id.clone()).collect();
    assert_eq!(ids, vec![first_id.clone(), second_id.clone()]);

    assert_eq!(read_file(&store, "dup.geojson").await.unwrap(), b"first");
    assert_eq!(read_file_by_id(&store, &second_id).await.unwrap(), b"second");

    let _ = fs::remove_file(&first);
    let _ = fs::remove_file(&second);
}

#[tokio::test]
async fn reject_policy_refuses_existing_filename() {
    let store = MemoryStore::default();
    let path = temp_file("reject", b"v1");

    upload_file(&store, &path, "once.geojson", DuplicatePolicy::Reject)
        .await
        .expect("first upload failed");
    let err = upload_file(&store, &path, "once.geojson", DuplicatePolicy::Reject)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::DuplicateFilename(ref name) if name == "once.geojson"));
    assert_eq!(store.len().await, 1);
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn deleted_object_falls_back_to_next_version() {
    let store = MemoryStore::default();
    let old_id = store.put("layer.geojson", b"old").await.unwrap();
    store.put("layer.geojson", b"new").await.unwrap();

    store.delete(&old_id).await.unwrap();

    assert_eq!(read_file(&store, "layer.geojson").await.unwrap(), b"new");
}
