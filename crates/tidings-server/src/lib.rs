//! Host runtime: seed-data HTTP endpoint, ingestion timer and enrichment watcher.

pub mod error;
pub mod openapi;
pub mod pipeline;
pub mod routes;
pub mod state;
