use crate::{
    ClipCatalog, ClipError, ClipStorage, EXPORT_MIME_TYPE,
    tests::support::{ScriptedStore, memory_store},
};

/// WHAT: Refreshing twice without writes yields the same snapshot
/// WHY: Refresh must be idempotent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unchanged_store_when_refreshing_twice_then_same_snapshot() {
    // Given: A store with two clips
    let store = memory_store().await;
    store.insert("1".to_string(), vec![1]).await.unwrap();
    store.insert("2".to_string(), vec![2, 2]).await.unwrap();
    let mut catalog = ClipCatalog::new();

    // When: Refreshing twice
    let first_count = catalog.refresh(&store).await.unwrap();
    let first = catalog.clips().to_vec();
    let second_count = catalog.refresh(&store).await.unwrap();

    // Then: Both snapshots are identical
    assert_eq!(first_count, 2);
    assert_eq!(second_count, 2);
    assert_eq!(catalog.clips(), first.as_slice());
}

/// WHAT: A failed refresh keeps the previous snapshot
/// WHY: A stale list is more useful than an empty one
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_loaded_catalog_when_refresh_fails_then_previous_snapshot_kept() {
    // Given: A loaded catalog
    let store = ScriptedStore::new().await;
    store.insert("1".to_string(), vec![1]).await.unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();

    // When: A later refresh fails after another insert
    store.insert("2".to_string(), vec![2]).await.unwrap();
    store.fail_reads(true);
    let result = catalog.refresh(&store).await;

    // Then: The error is reported and the old snapshot remains
    assert!(matches!(result, Err(ClipError::ReadFailed { .. })));
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.clips()[0].name, "1");
}

/// WHAT: Export names the file from the clip's id and name
/// WHY: Downloads need deterministic, distinguishable file names
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_clip_when_exporting_then_named_webm_with_bytes() {
    // Given: A catalog with one clip
    let store = memory_store().await;
    let id = store
        .insert("1700000000000".to_string(), b"clip".to_vec())
        .await
        .unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();

    // When: Exporting it
    let export = catalog.export_clip(&store, id).await.unwrap();

    // Then: The export carries the bytes under a deterministic name
    assert_eq!(export.file_name, format!("recorded_{}_1700000000000.webm", id));
    assert_eq!(export.mime_type, EXPORT_MIME_TYPE);
    assert_eq!(export.data, b"clip".to_vec());
}

/// WHAT: Exporting an id missing from the snapshot fails with NotFound
/// WHY: The clip may have been deleted from another view
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unknown_id_when_exporting_then_not_found() {
    // Given: A stored clip the catalog has not loaded yet
    let store = memory_store().await;
    let id = store.insert("1".to_string(), vec![1]).await.unwrap();
    let catalog = ClipCatalog::new();

    // When: Exporting it and an id that never existed
    let unlisted = catalog.export_clip(&store, id).await;
    let unknown = catalog.export_clip(&store, 99).await;

    // Then: Both report NotFound for their id
    assert!(matches!(unlisted, Err(ClipError::NotFound { id: found, .. }) if found == id));
    assert!(matches!(unknown, Err(ClipError::NotFound { id: 99, .. })));
}

/// WHAT: Exporting a listed clip deleted behind the catalog fails with NotFound
/// WHY: Another view may delete a clip between refresh and export
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_clip_deleted_after_refresh_when_exporting_then_not_found() {
    // Given: A catalog listing a clip that is then deleted directly in the store
    let store = memory_store().await;
    let id = store.insert("1".to_string(), vec![1]).await.unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();
    store.delete_by_id(id).await.unwrap();

    // When: Exporting from the stale snapshot
    let result = catalog.export_clip(&store, id).await;

    // Then: NotFound, and the stale entry is still listed until refresh
    assert!(matches!(result, Err(ClipError::NotFound { .. })));
    assert!(catalog.get(id).is_some());
}

/// WHAT: The snapshot holds metadata and sizes, not payloads
/// WHY: Memory must not grow with the total size of stored clips
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_clips_when_refreshing_then_snapshot_has_names_and_sizes() {
    // Given: A store with a large and a small clip
    let store = memory_store().await;
    let big = store.insert("big".to_string(), vec![7u8; 4096]).await.unwrap();
    let small = store.insert("small".to_string(), vec![1, 2, 3]).await.unwrap();
    let mut catalog = ClipCatalog::new();

    // When: Refreshing
    catalog.refresh(&store).await.unwrap();

    // Then: Each entry carries the payload size from storage
    assert_eq!(catalog.get(big).unwrap().size, 4096);
    assert_eq!(catalog.get(small).unwrap().size, 3);
    assert_eq!(catalog.get(small).unwrap().name, "small");
}

/// WHAT: Deleting a clip removes it from storage and the snapshot
/// WHY: Delete triggers a refresh so the list stays consistent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_clip_when_deleting_then_removed_from_store_and_catalog() {
    // Given: A catalog with two clips
    let store = memory_store().await;
    let doomed = store.insert("1".to_string(), vec![1]).await.unwrap();
    let kept = store.insert("2".to_string(), vec![2]).await.unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();

    // When: Deleting one, then deleting it again
    catalog.delete_clip(&store, doomed).await.unwrap();
    let again = catalog.delete_clip(&store, doomed).await;

    // Then: Only the other clip remains, and the repeat is harmless
    assert!(again.is_ok());
    assert!(catalog.get(doomed).is_none());
    assert!(catalog.get(kept).is_some());
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

/// WHAT: A failed delete leaves the catalog untouched
/// WHY: The clip must stay visible when it was not actually removed
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_store_when_deleting_then_error_and_catalog_unchanged() {
    // Given: A loaded catalog over a store that rejects writes
    let store = ScriptedStore::new().await;
    let id = store.insert("1".to_string(), vec![1]).await.unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();
    store.fail_writes(true);

    // When: Deleting
    let result = catalog.delete_clip(&store, id).await;

    // Then: The failure surfaces and the clip is still listed
    assert!(matches!(result, Err(ClipError::WriteFailed { .. })));
    assert!(catalog.get(id).is_some());
}

/// WHAT: A stale snapshot after a successful delete does not fail the delete
/// WHY: The delete happened; only the listing is out of date
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_failing_reads_when_deleting_then_delete_succeeds_with_stale_catalog() {
    // Given: A loaded catalog over a store whose reads fail
    let store = ScriptedStore::new().await;
    let id = store.insert("1".to_string(), vec![1]).await.unwrap();
    let mut catalog = ClipCatalog::new();
    catalog.refresh(&store).await.unwrap();
    store.fail_reads(true);

    // When: Deleting
    let result = catalog.delete_clip(&store, id).await;

    // Then: The delete is reported as successful, the snapshot is stale
    assert!(result.is_ok());
    assert_eq!(catalog.len(), 1);
    store.fail_reads(false);
    assert!(store.list_all().await.unwrap().is_empty());
}
