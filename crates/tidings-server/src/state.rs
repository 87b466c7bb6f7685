use tidings_core::PipelineConfig;
use tidings_store::BlobClient;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub store: BlobClient,
    pub config: PipelineConfig,
}
