use std::sync::Arc;

use axum::Router;

use tidings_core::PipelineConfig;
use tidings_server::routes;
use tidings_server::state::AppState;
use tidings_store::{AnyBlobStore, BlobClient, MemoryBlobStore, StoreConfig};

pub struct TestApp {
    pub router: Router,
    pub store: MemoryBlobStore,
    pub config: PipelineConfig,
}

/// Router backed by an in-memory blob store.
pub fn setup_test_app() -> TestApp {
    let store = MemoryBlobStore::new();
    let config = PipelineConfig::default();
    let state = Arc::new(AppState {
        store: BlobClient::from_store(AnyBlobStore::Memory(store.clone())),
        config: config.clone(),
    });

    TestApp {
        router: routes::router(state),
        store,
        config,
    }
}

/// Router whose storage has no connection string configured.
pub fn setup_unconfigured_app() -> Router {
    let state = Arc::new(AppState {
        store: BlobClient::new(StoreConfig::new(None)),
        config: PipelineConfig::default(),
    });
    routes::router(state)
}
