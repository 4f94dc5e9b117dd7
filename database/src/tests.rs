use crate::{open_store, RestStore, SqliteStore};
use autoreply_core::{
    AutoresponderStore, CoreError, NewAutoresponder, StoreConfig, StoreError,
};
use httpmock::prelude::*;
use serde_json::json;

async fn setup_test_db() -> SqliteStore {
    let db = SqliteStore::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

fn sample_row(user_id: &str) -> NewAutoresponder {
    NewAutoresponder {
        user_id: user_id.to_string(),
        post_id: "17900001".to_string(),
        post_url: "https://instagram.com/p/abc".to_string(),
        post_caption: None,
        name: "Spring sale".to_string(),
        keywords: vec!["price".to_string(), "link".to_string()],
        dm_message: "Here is the link!".to_string(),
        is_active: true,
    }
}

#[tokio::test]
async fn test_insert_echoes_row() {
    let db = setup_test_db().await;

    let record = db
        .insert(sample_row("page_42"))
        .await
        .expect("Failed to insert autoresponder");

    assert!(!record.id.is_empty());
    assert_eq!(record.user_id, "page_42");
    assert_eq!(record.keywords, vec!["price", "link"]);
    assert_eq!(record.post_caption, None);
    assert!(record.is_active);
}

#[tokio::test]
async fn test_rows_listed_by_owner() {
    let db = setup_test_db().await;
    db.insert(sample_row("page_42")).await.unwrap();
    db.insert(sample_row("page_42")).await.unwrap();
    db.insert(sample_row("anonymous")).await.unwrap();

    let rows = db.get_autoresponders_for_owner("page_42").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].id, rows[1].id);

    let none = db.get_autoresponders_for_owner("page_7").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_insert_into_closed_pool_fails() {
    let db = setup_test_db().await;
    db.close().await;

    let result = db.insert(sample_row("page_42")).await;
    assert!(matches!(result, Err(CoreError::Store(StoreError::Sql(_)))));
}

#[tokio::test]
async fn test_open_sqlite_store_from_config() {
    let config = StoreConfig::Sqlite {
        database_url: "sqlite::memory:".to_string(),
    };
    let store = open_store(&config).await.expect("Failed to open store");
    let record = store.insert(sample_row("page_1")).await.unwrap();
    assert_eq!(record.name, "Spring sale");
}

#[tokio::test]
async fn test_rest_insert_returns_representation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/autoresponders")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key")
                .header("prefer", "return=representation")
                .json_body_partial(r#"{"user_id": "page_42", "is_active": true}"#);
            then.status(201).json_body(json!([{
                "id": "6f1c0d2e-0000-4000-8000-000000000001",
                "user_id": "page_42",
                "post_id": "17900001",
                "post_url": "https://instagram.com/p/abc",
                "post_caption": null,
                "name": "Spring sale",
                "keywords": ["price", "link"],
                "dm_message": "Here is the link!",
                "is_active": true,
                "created_at": "2024-05-01T10:00:00.123456+00:00"
            }]));
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let record = store.insert(sample_row("page_42")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(record.id, "6f1c0d2e-0000-4000-8000-000000000001");
    assert_eq!(record.keywords, vec!["price", "link"]);
}

#[tokio::test]
async fn test_rest_insert_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/autoresponders");
            then.status(400)
                .json_body(json!({ "message": "null value in column \"name\"" }));
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let result = store.insert(sample_row("page_42")).await;

    match result {
        Err(CoreError::Store(StoreError::Rejected { status_code, body })) => {
            assert_eq!(status_code, 400);
            assert!(body.contains("null value"));
        }
        other => panic!("Expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rest_insert_empty_echo() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/autoresponders");
            then.status(201).json_body(json!([]));
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let result = store.insert(sample_row("page_42")).await;
    assert!(matches!(
        result,
        Err(CoreError::Store(StoreError::EmptyResponse { .. }))
    ));
}

#[tokio::test]
async fn test_rest_insert_accepts_integer_id_without_timestamp() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/autoresponders");
            then.status(201).json_body(json!([{
                "id": 17,
                "user_id": "page_42",
                "post_id": "17900001",
                "name": "Spring sale",
                "keywords": ["price", "link"],
                "dm_message": "Here is the link!",
                "is_active": true
            }]));
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let record = store.insert(sample_row("page_42")).await.unwrap();

    mock.assert_hits_async(1).await;
    assert_eq!(record.id, "17");
    assert_eq!(record.user_id, "page_42");
    assert_eq!(record.post_url, "https://instagram.com/p/abc");
}

#[tokio::test]
async fn test_rest_insert_reads_zoneless_timestamp() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/autoresponders");
            then.status(201).json_body(json!([{
                "id": "a1",
                "created_at": "2024-05-01T10:00:00.5"
            }]));
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let record = store.insert(sample_row("page_42")).await.unwrap();

    assert_eq!(record.created_at.timestamp_millis(), 1_714_557_600_500);
    assert_eq!(record.name, "Spring sale");
}

#[tokio::test]
async fn test_rest_insert_malformed_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/autoresponders");
            then.status(201).body("<html>gateway</html>");
        })
        .await;

    let store = RestStore::new(&server.base_url(), "anon-key", "autoresponders").unwrap();
    let result = store.insert(sample_row("page_42")).await;
    assert!(matches!(
        result,
        Err(CoreError::Store(StoreError::MalformedResponse { .. }))
    ));
}
