mod common;

use std::collections::HashSet;
use std::sync::Arc;

use link_shortener::domain::entities::{CreateOutcome, Link};
use link_shortener::domain::repositories::{LinkStore, StoreError};
use link_shortener::infrastructure::persistence::MemoryLinkStore;

#[tokio::test]
async fn test_store_and_find() {
    let (store, _dir) = common::open_temp_store().await;

    let (link, outcome) = store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, CreateOutcome::Created);
    assert_eq!(link.code, "abc12");

    let found = store.find("abc12").await.unwrap().unwrap();
    assert_eq!(found.long_url, "https://example.com");
    assert_eq!(found.owner_id, "owner-1");
    assert!(!found.deleted);

    assert!(store.find("zzz99").await.unwrap().is_none());
}

#[tokio::test]
async fn test_same_owner_same_url_conflicts() {
    let (store, _dir) = common::open_temp_store().await;
    store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();

    let (existing, outcome) = store
        .store(Link::new("owner-1", "xyz89", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, CreateOutcome::Conflict);
    assert_eq!(existing.code, "abc12");
    assert!(store.find("xyz89").await.unwrap().is_none());
}

#[tokio::test]
async fn test_other_owner_same_url_is_created() {
    let (store, _dir) = common::open_temp_store().await;
    store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();

    let (_, outcome) = store
        .store(Link::new("owner-2", "xyz89", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(outcome, CreateOutcome::Created);
}

#[tokio::test]
async fn test_code_collision_is_code_taken() {
    let (store, _dir) = common::open_temp_store().await;
    store
        .store(Link::new("owner-1", "abc12", "https://example.com/a"))
        .await
        .unwrap();

    let result = store
        .store(Link::new("owner-2", "abc12", "https://example.com/b"))
        .await;

    assert!(matches!(result, Err(StoreError::CodeTaken { code }) if code == "abc12"));
}

#[tokio::test]
async fn test_find_all_for_owner_includes_deleted() {
    let (store, _dir) = common::open_temp_store().await;
    for (owner, code, url) in [
        ("owner-1", "a1", "https://example.com/1"),
        ("owner-1", "a2", "https://example.com/2"),
        ("owner-2", "b1", "https://example.com/1"),
    ] {
        store.store(Link::new(owner, code, url)).await.unwrap();
    }
    store
        .mark_deleted_batch("owner-1", &["a2".to_string()])
        .await
        .unwrap();

    let links = store.find_all_for_owner("owner-1").await.unwrap();
    let codes: HashSet<String> = links.iter().map(|l| l.code.clone()).collect();

    assert_eq!(codes, HashSet::from(["a1".to_string(), "a2".to_string()]));
    assert!(links.iter().any(|l| l.code == "a2" && l.deleted));
    assert!(store.find_all_for_owner("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_deleted_skips_unknown_and_foreign_codes() {
    let (store, _dir) = common::open_temp_store().await;
    store
        .store(Link::new("owner-1", "mine1", "https://example.com/1"))
        .await
        .unwrap();
    store
        .store(Link::new("owner-2", "their", "https://example.com/2"))
        .await
        .unwrap();

    let codes = vec!["mine1".to_string(), "their".to_string(), "ghost".to_string()];
    store.mark_deleted_batch("owner-1", &codes).await.unwrap();
    // Idempotent.
    store.mark_deleted_batch("owner-1", &codes).await.unwrap();

    assert!(store.find("mine1").await.unwrap().unwrap().deleted);
    assert!(!store.find("their").await.unwrap().unwrap().deleted);
    assert!(store.find("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_journal_is_replayed_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");

    {
        let store = MemoryLinkStore::open(&path).await.unwrap();
        store
            .store(Link::new("owner-1", "abc12", "https://example.com"))
            .await
            .unwrap();
        store
            .store(Link::new("owner-2", "def34", "https://example.org"))
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let reopened = MemoryLinkStore::open(&path).await.unwrap();

    let link = reopened.find("abc12").await.unwrap().unwrap();
    assert_eq!(link.long_url, "https://example.com");
    assert_eq!(link.owner_id, "owner-1");

    let (existing, outcome) = reopened
        .store(Link::new("owner-2", "new99", "https://example.org"))
        .await
        .unwrap();
    assert_eq!(outcome, CreateOutcome::Conflict);
    assert_eq!(existing.code, "def34");
}

#[tokio::test]
async fn test_journal_line_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");

    let store = MemoryLinkStore::open(&path).await.unwrap();
    store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();
    store.close().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["user_id"], "owner-1");
    assert_eq!(record["short_url"], "abc12");
    assert_eq!(record["original_url"], "https://example.com");
    assert_eq!(record["is_deleted"], false);
}

#[tokio::test]
async fn test_conflicts_and_collisions_are_not_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");

    let store = MemoryLinkStore::open(&path).await.unwrap();
    store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();
    let _ = store
        .store(Link::new("owner-1", "zzz00", "https://example.com"))
        .await;
    let _ = store
        .store(Link::new("owner-2", "abc12", "https://example.net"))
        .await;
    store.close().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
}

#[tokio::test]
async fn test_deletions_are_not_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");

    {
        let store = MemoryLinkStore::open(&path).await.unwrap();
        store
            .store(Link::new("owner-1", "abc12", "https://example.com"))
            .await
            .unwrap();
        store
            .mark_deleted_batch("owner-1", &["abc12".to_string()])
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let reopened = MemoryLinkStore::open(&path).await.unwrap();

    assert!(!reopened.find("abc12").await.unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_unterminated_last_record_survives_next_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");
    std::fs::write(
        &path,
        "{\"user_id\":\"owner-1\",\"short_url\":\"aaaaa\",\"original_url\":\"https://a.example\",\"is_deleted\":false}",
    )
    .unwrap();

    {
        let store = MemoryLinkStore::open(&path).await.unwrap();
        assert!(store.find("aaaaa").await.unwrap().is_some());
        store
            .store(Link::new("owner-1", "bbbbb", "https://b.example"))
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let reopened = MemoryLinkStore::open(&path).await.unwrap();

    assert_eq!(
        reopened.find("aaaaa").await.unwrap().unwrap().long_url,
        "https://a.example"
    );
    assert_eq!(
        reopened.find("bbbbb").await.unwrap().unwrap().long_url,
        "https://b.example"
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
}

#[tokio::test]
async fn test_missing_journal_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("links.jsonl");

    let store = MemoryLinkStore::open(&path).await.unwrap();

    assert!(store.find_all_for_owner("owner-1").await.unwrap().is_empty());
    assert_eq!(store.path(), Some(path.as_path()));
    assert!(path.exists());
}

#[tokio::test]
async fn test_corrupt_journal_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.jsonl");
    std::fs::write(
        &path,
        "{\"user_id\":\"o\",\"short_url\":\"a\",\"original_url\":\"https://a.example\",\"is_deleted\":false}\n\nnot json\n",
    )
    .unwrap();

    let result = MemoryLinkStore::open(&path).await;

    assert!(matches!(result, Err(StoreError::CorruptJournal { line: 3, .. })));
}

#[tokio::test]
async fn test_close_is_idempotent_and_stops_operations() {
    let (store, _dir) = common::open_temp_store().await;

    store.ping().await.unwrap();
    store.close().await.unwrap();
    store.close().await.unwrap();

    assert!(matches!(store.ping().await, Err(StoreError::Closed)));
    assert!(matches!(
        store
            .store(Link::new("owner-1", "abc12", "https://example.com"))
            .await,
        Err(StoreError::Closed)
    ));
}

#[tokio::test]
async fn test_concurrent_stores_keep_every_link() {
    let (store, _dir) = common::open_temp_store().await;

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .store(Link::new(
                    "owner-1",
                    format!("code{i}"),
                    format!("https://example.com/{i}"),
                ))
                .await
        }));
    }
    for handle in handles {
        let (_, outcome) = handle.await.unwrap().unwrap();
        assert_eq!(outcome, CreateOutcome::Created);
    }

    assert_eq!(store.find_all_for_owner("owner-1").await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_journal_free_store() {
    let store = MemoryLinkStore::new();

    store
        .store(Link::new("owner-1", "abc12", "https://example.com"))
        .await
        .unwrap();

    assert!(store.path().is_none());
    assert!(store.find("abc12").await.unwrap().is_some());
    store.close().await.unwrap();
}
