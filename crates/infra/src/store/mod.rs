//! Persistence boundary for warehouses and their items.
//!
//! The store is the last line of defence for the invariants the service
//! pre-checks: name uniqueness, parent existence and cascade delete must all
//! hold even when two requests race past the service's checks.

pub mod in_memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{ItemId, WarehouseId};
use stockroom_inventory::{Item, NewItem, NewWarehouse, Warehouse, WarehouseChange};

pub use in_memory::InMemoryWarehouseStore;
pub use sqlite::SqliteWarehouseStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed row does not exist (or is not under the given parent).
    #[error("record not found")]
    NotFound,
    /// The unique constraint on warehouse names rejected the write.
    #[error("duplicate warehouse name: {0}")]
    DuplicateName(String),
    /// An item insert referenced a warehouse that does not exist.
    #[error("referenced warehouse does not exist")]
    WarehouseMissing,
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Durable storage for warehouses and items.
///
/// Every method is atomic: it either fully applies or leaves the store
/// untouched. Warehouses come back with their items in insertion order.
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    async fn insert_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, StoreError>;

    async fn find_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError>;

    /// All warehouses in creation order.
    async fn find_all_warehouses(&self) -> Result<Vec<Warehouse>, StoreError>;

    /// Exact, case-sensitive lookup.
    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, StoreError>;

    /// Write the fields `change` carries and return the stored warehouse.
    /// Fields left as `None` keep whatever value the row holds at write time.
    /// Items are not touched.
    async fn update_warehouse(&self, id: WarehouseId, change: &WarehouseChange) -> Result<Warehouse, StoreError>;

    /// Delete the warehouse and every item it owns in one step.
    async fn delete_warehouse(&self, id: WarehouseId) -> Result<(), StoreError>;

    async fn insert_item(&self, warehouse_id: WarehouseId, new: NewItem) -> Result<Item, StoreError>;

    async fn find_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    async fn find_items_by_warehouse(&self, warehouse_id: WarehouseId) -> Result<Vec<Item>, StoreError>;

    /// Delete `item_id` only if it belongs to `warehouse_id`.
    async fn delete_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> WarehouseStore for Arc<S>
where
    S: WarehouseStore + ?Sized,
{
    async fn insert_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, StoreError> {
        (**self).insert_warehouse(new).await
    }

    async fn find_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        (**self).find_warehouse(id).await
    }

    async fn find_all_warehouses(&self) -> Result<Vec<Warehouse>, StoreError> {
        (**self).find_all_warehouses().await
    }

    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, StoreError> {
        (**self).find_warehouse_by_name(name).await
    }

    async fn update_warehouse(&self, id: WarehouseId, change: &WarehouseChange) -> Result<Warehouse, StoreError> {
        (**self).update_warehouse(id, change).await
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> Result<(), StoreError> {
        (**self).delete_warehouse(id).await
    }

    async fn insert_item(&self, warehouse_id: WarehouseId, new: NewItem) -> Result<Item, StoreError> {
        (**self).insert_item(warehouse_id, new).await
    }

    async fn find_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).find_item(id).await
    }

    async fn find_items_by_warehouse(&self, warehouse_id: WarehouseId) -> Result<Vec<Item>, StoreError> {
        (**self).find_items_by_warehouse(warehouse_id).await
    }

    async fn delete_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> Result<(), StoreError> {
        (**self).delete_item(warehouse_id, item_id).await
    }
}
