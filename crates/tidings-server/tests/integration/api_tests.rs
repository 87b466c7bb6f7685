use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tidings_core::models::ArticleRecord;
use tidings_core::seed::fake_blob_name;
use tidings_core::traits::BlobStore;

use crate::common::{setup_test_app, setup_unconfigured_app};

async fn body_text(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn generate_fake_articles_uploads_ten_blobs() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::get("/api/GenerateFakeArticles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "Successfully generated and uploaded 10 fake articles."
    );

    let names = app.store.list(&app.config.raw_container).await.unwrap();
    assert_eq!(names.len(), 10);

    let bytes = app
        .store
        .get(&app.config.raw_container, &fake_blob_name(3))
        .await
        .unwrap();
    let record = ArticleRecord::from_json(&bytes).unwrap();
    assert_eq!(record.title, "Fake Article 3");
    assert_eq!(record.url, "https://fakeurl.com/article-3");
}

#[tokio::test]
async fn generate_fake_articles_accepts_post_and_overwrites() {
    let app = setup_test_app();

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::post("/api/GenerateFakeArticles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let names = app.store.list(&app.config.raw_container).await.unwrap();
    assert_eq!(names.len(), 10);
}

#[tokio::test]
async fn missing_storage_config_returns_500() {
    let router = setup_unconfigured_app();

    let response = router
        .oneshot(
            Request::get("/api/GenerateFakeArticles")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.starts_with("An error occurred: Configuration error:"));
    assert!(text.contains("BLOB_CONNECTION_STRING"));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = setup_test_app();

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(json["paths"]["/api/GenerateFakeArticles"]["post"].is_object());
    assert!(json["paths"]["/health"]["get"].is_object());
}
