use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tidings API",
        version = "0.1.0",
        description = "News ingestion and sentiment enrichment pipeline."
    ),
    paths(crate::routes::generate_fake_articles, crate::routes::health),
    components(schemas(crate::routes::HealthResponse)),
    tags(
        (name = "seed", description = "Synthetic input for the enrichment stage"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
