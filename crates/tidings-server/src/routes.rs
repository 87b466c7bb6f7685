use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use tidings_core::seed::{FAKE_ARTICLE_COUNT, seed_fake_articles};

use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/GenerateFakeArticles",
            get(generate_fake_articles).post(generate_fake_articles),
        )
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Upload `fake-article-1.json` .. `fake-article-10.json` to the raw container.
#[utoipa::path(
    method(get, post),
    path = "/api/GenerateFakeArticles",
    responses(
        (status = 200, description = "Fake articles uploaded", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain"),
    ),
    tag = "seed"
)]
pub async fn generate_fake_articles(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let names = seed_fake_articles(
        &state.store,
        &state.config.raw_container,
        FAKE_ARTICLE_COUNT,
    )
    .await?;

    Ok((
        StatusCode::OK,
        format!(
            "Successfully generated and uploaded {} fake articles.",
            names.len()
        ),
    ))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "healthy" })
}

async fn openapi_json() -> impl IntoResponse {
    axum::Json(ApiDoc::openapi())
}
