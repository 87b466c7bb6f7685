pub mod client;
pub mod config;
pub mod fs;
pub mod memory;
pub mod postgres;

pub use client::{AnyBlobStore, BlobClient};
pub use config::{Backend, StoreConfig};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use postgres::PgBlobStore;
