use tidings_core::AppError;
use tidings_core::models::ArticleRecord;
use tidings_core::traits::{BlobStore, ensure_container};

use crate::common::setup_test_store;

#[tokio::test]
async fn create_container_is_idempotent() {
    let (store, _container) = setup_test_store().await;

    assert!(!store.container_exists("articles-data").await.unwrap());
    store.create_container("articles-data").await.unwrap();
    store.create_container("articles-data").await.unwrap();
    assert!(store.container_exists("articles-data").await.unwrap());
}

#[tokio::test]
async fn put_and_get_article_blob() {
    let (store, _container) = setup_test_store().await;
    ensure_container(&store, "articles-data").await.unwrap();

    let record = ArticleRecord {
        title: "Café prices soar".into(),
        content: "Para one Para two".into(),
        url: "https://www.bbc.com/news/articles/c1".into(),
    };
    let name = record.blob_name();
    store
        .put("articles-data", &name, record.to_json().unwrap(), true)
        .await
        .unwrap();

    let bytes = store.get("articles-data", &name).await.unwrap();
    assert_eq!(ArticleRecord::from_json(&bytes).unwrap(), record);
}

#[tokio::test]
async fn overwrite_keeps_single_blob() {
    let (store, _container) = setup_test_store().await;
    ensure_container(&store, "raw").await.unwrap();

    store.put("raw", "a.json", b"first".to_vec(), true).await.unwrap();
    store.put("raw", "a.json", b"second".to_vec(), true).await.unwrap();

    assert_eq!(store.list("raw").await.unwrap(), vec!["a.json"]);
    assert_eq!(store.get("raw", "a.json").await.unwrap(), b"second");
}

#[tokio::test]
async fn put_without_overwrite_rejects_existing() {
    let (store, _container) = setup_test_store().await;
    ensure_container(&store, "raw").await.unwrap();

    store.put("raw", "a.json", b"first".to_vec(), false).await.unwrap();
    let err = store
        .put("raw", "a.json", b"second".to_vec(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StorageError(_)));
    assert_eq!(store.get("raw", "a.json").await.unwrap(), b"first");
}

#[tokio::test]
async fn put_into_missing_container_fails() {
    let (store, _container) = setup_test_store().await;

    let err = store
        .put("nope", "a.json", b"x".to_vec(), true)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Container nope not found"));
}

#[tokio::test]
async fn list_is_sorted_and_scoped_to_container() {
    let (store, _container) = setup_test_store().await;
    ensure_container(&store, "raw").await.unwrap();
    ensure_container(&store, "sentiment").await.unwrap();

    for name in ["b.json", "B.json", "a.json"] {
        store.put("raw", name, vec![], true).await.unwrap();
    }
    store
        .put("sentiment", "sentiment-a.json", vec![], true)
        .await
        .unwrap();

    assert_eq!(
        store.list("raw").await.unwrap(),
        vec!["B.json", "a.json", "b.json"]
    );
    assert_eq!(
        store.list("sentiment").await.unwrap(),
        vec!["sentiment-a.json"]
    );
    assert!(store.list("missing").await.is_err());
}

#[tokio::test]
async fn missing_blob_is_storage_error() {
    let (store, _container) = setup_test_store().await;
    ensure_container(&store, "raw").await.unwrap();

    let err = store.get("raw", "missing.json").await.unwrap_err();
    assert!(matches!(err, AppError::StorageError(_)));
}
