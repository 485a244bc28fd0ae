//! Infrastructure layer: persistence, the warehouse service, and configuration.

pub mod config;
pub mod service;
pub mod store;

mod integration_tests;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use service::WarehouseService;
pub use store::{InMemoryWarehouseStore, SqliteWarehouseStore, StoreError, WarehouseStore};
