//! Warehouse/Item service.
//!
//! Sits between the request adapter and the store. Every operation validates
//! first and only then touches the store, so a validation failure never
//! leaves a partial write behind. The store re-checks uniqueness and parent
//! existence itself; when a concurrent request slips past the pre-checks the
//! store's answer is mapped to the same `DomainError` a pre-check would have
//! produced.

use tracing::instrument;

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, WarehouseId};
use stockroom_inventory::{
    validate_warehouse_name, Item, NewItem, NewWarehouse, QuantityInput, Warehouse, WarehousePatch,
};

use crate::store::{StoreError, WarehouseStore};

/// Create/read/update/delete over warehouses and their items.
///
/// Holds nothing but the store handle; there is no state between calls.
#[derive(Debug, Clone)]
pub struct WarehouseService<S> {
    store: S,
}

impl<S> WarehouseService<S>
where
    S: WarehouseStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All warehouses in creation order, each with its items.
    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> DomainResult<Vec<Warehouse>> {
        self.store
            .find_all_warehouses()
            .await
            .map_err(|e| storage_failure("list_warehouses", e))
    }

    #[instrument(skip(self), fields(warehouse_id = %id))]
    pub async fn get_warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.store
            .find_warehouse(id)
            .await
            .map_err(|e| storage_failure("get_warehouse", e))?
            .ok_or_else(DomainError::warehouse_not_found)
    }

    #[instrument(skip(self, location, description))]
    pub async fn create_warehouse(
        &self,
        name: &str,
        location: Option<&str>,
        description: Option<&str>,
    ) -> DomainResult<Warehouse> {
        let taken = self.name_taken_by_other(name, None).await?;
        let name = validate_warehouse_name(name, taken.iter().map(String::as_str))?;
        let new = NewWarehouse::new(name, location, description);

        let warehouse = self.store.insert_warehouse(new).await.map_err(|e| match e {
            StoreError::DuplicateName(name) => DomainError::DuplicateName(name),
            other => storage_failure("create_warehouse", other),
        })?;

        tracing::info!(warehouse_id = %warehouse.id_typed(), "warehouse created");
        Ok(warehouse)
    }

    /// Partial update: fields absent from `patch` keep their current value.
    ///
    /// Only the present fields are sent to the store, which writes them in
    /// one step; a concurrent update to a different field survives.
    #[instrument(skip(self, patch), fields(warehouse_id = %id))]
    pub async fn update_warehouse(&self, id: WarehouseId, patch: WarehousePatch) -> DomainResult<Warehouse> {
        let current = self.get_warehouse(id).await?;

        let taken = match &patch.name {
            Some(raw) => self.name_taken_by_other(raw, Some(id)).await?,
            None => Vec::new(),
        };
        let change = patch.validate(taken.iter().map(String::as_str))?;

        if patch.is_empty() {
            return Ok(current);
        }

        let warehouse = self.store.update_warehouse(id, &change).await.map_err(|e| match e {
            StoreError::NotFound => DomainError::warehouse_not_found(),
            StoreError::DuplicateName(name) => DomainError::DuplicateName(name),
            other => storage_failure("update_warehouse", other),
        })?;

        tracing::info!("warehouse updated");
        Ok(warehouse)
    }

    /// Removes the warehouse and every item it owns in one store transaction.
    #[instrument(skip(self), fields(warehouse_id = %id))]
    pub async fn delete_warehouse(&self, id: WarehouseId) -> DomainResult<()> {
        self.store.delete_warehouse(id).await.map_err(|e| match e {
            StoreError::NotFound => DomainError::warehouse_not_found(),
            other => storage_failure("delete_warehouse", other),
        })?;

        tracing::info!("warehouse deleted");
        Ok(())
    }

    /// Checks run in this order: warehouse exists, item name, quantity.
    ///
    /// A quantity that cannot be parsed is stored as `0.0`; one that parses
    /// to a negative number is rejected.
    #[instrument(skip(self, quantity), fields(warehouse_id = %warehouse_id))]
    pub async fn add_item(
        &self,
        warehouse_id: WarehouseId,
        name: &str,
        quantity: &QuantityInput,
    ) -> DomainResult<Item> {
        let exists = self
            .store
            .find_warehouse(warehouse_id)
            .await
            .map_err(|e| storage_failure("add_item", e))?
            .is_some();
        if !exists {
            return Err(DomainError::WarehouseNotFound);
        }

        let new = NewItem::new(name, quantity)?;

        let item = self.store.insert_item(warehouse_id, new).await.map_err(|e| match e {
            StoreError::WarehouseMissing | StoreError::NotFound => DomainError::WarehouseNotFound,
            other => storage_failure("add_item", other),
        })?;

        tracing::info!(item_id = %item.id_typed(), quantity = item.quantity(), "item added");
        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_item(&self, item_id: ItemId) -> DomainResult<Item> {
        self.store
            .find_item(item_id)
            .await
            .map_err(|e| storage_failure("get_item", e))?
            .ok_or_else(DomainError::item_not_found)
    }

    /// Only succeeds when the item belongs to `warehouse_id`.
    #[instrument(skip(self), fields(warehouse_id = %warehouse_id, item_id = %item_id))]
    pub async fn remove_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> DomainResult<()> {
        self.store
            .delete_item(warehouse_id, item_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound | StoreError::WarehouseMissing => DomainError::item_not_found(),
                other => storage_failure("remove_item", other),
            })?;

        tracing::info!("item removed");
        Ok(())
    }

    /// Names held by warehouses other than `own` that collide with the
    /// trimmed `raw`. Uses the exact-name lookup rather than loading every row.
    async fn name_taken_by_other(&self, raw: &str, own: Option<WarehouseId>) -> DomainResult<Vec<String>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let found = self
            .store
            .find_warehouse_by_name(trimmed)
            .await
            .map_err(|e| storage_failure("find_warehouse_by_name", e))?;

        Ok(found
            .filter(|w| own.is_none_or(|own| *w.id() != own))
            .map(|w| vec![w.name().to_string()])
            .unwrap_or_default())
    }
}

fn storage_failure(operation: &str, err: StoreError) -> DomainError {
    tracing::error!(operation, error = %err, "warehouse store failure");
    DomainError::storage(err.to_string())
}
