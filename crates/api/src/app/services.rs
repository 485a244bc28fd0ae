use std::sync::Arc;

use stockroom_infra::{
    AppConfig, InMemoryWarehouseStore, SqliteWarehouseStore, StoreBackend, StoreError,
    WarehouseService, WarehouseStore,
};

/// The store handle is shared behind `Arc<dyn WarehouseStore>` so the
/// backend is chosen at startup without making handlers generic.
pub type SharedWarehouseService = WarehouseService<Arc<dyn WarehouseStore>>;

#[derive(Clone)]
pub struct AppServices {
    pub warehouses: SharedWarehouseService,
}

impl AppServices {
    pub fn new(store: Arc<dyn WarehouseStore>) -> Self {
        Self {
            warehouses: WarehouseService::new(store),
        }
    }

    /// Volatile services for tests and local experiments.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryWarehouseStore::new()))
    }
}

/// Open the store selected by `config`.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let store: Arc<dyn WarehouseStore> = match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory warehouse store; data is lost on restart");
            Arc::new(InMemoryWarehouseStore::new())
        }
        StoreBackend::Sqlite => {
            tracing::info!(database_url = %config.database_url, "opening sqlite warehouse store");
            Arc::new(SqliteWarehouseStore::connect(&config.database_url).await?)
        }
    };
    Ok(AppServices::new(store))
}
