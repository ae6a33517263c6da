//! Core cart logic for the GoMarketplace mobile app.
//! This crate owns the cart state, its invariants and its on-device storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::cart_item::{CartItem, CartItemValidationError, ProductDescriptor};
pub use service::cart_store::{
    CartError, CartPhase, CartResult, CartSnapshot, CartStore, CartStoreConfig, DEFAULT_LOAD_KEY,
    DEFAULT_PERSIST_KEY,
};
pub use service::provider::{CartContext, CartProvider};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, NoopKeyValueStore, SqliteKeyValueStore, StorageError,
    StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
