use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::{Entity, ItemId, WarehouseId};
use stockroom_inventory::{Item, NewItem, NewWarehouse, Warehouse, WarehouseChange};

use super::{StoreError, WarehouseStore};

#[derive(Debug, Clone)]
struct WarehouseRecord {
    name: String,
    location: String,
    description: String,
}

#[derive(Debug, Default)]
struct State {
    // Ids only ever grow, so key order is insertion order.
    warehouses: BTreeMap<WarehouseId, WarehouseRecord>,
    items: BTreeMap<ItemId, Item>,
    last_warehouse_id: i64,
    last_item_id: i64,
}

impl State {
    fn items_of(&self, warehouse_id: WarehouseId) -> Vec<Item> {
        self.items
            .values()
            .filter(|i| i.warehouse_id() == warehouse_id)
            .cloned()
            .collect()
    }

    fn assemble(&self, id: WarehouseId, record: &WarehouseRecord) -> Warehouse {
        Warehouse::from_parts(
            id,
            record.name.clone(),
            record.location.clone(),
            record.description.clone(),
            self.items_of(id),
        )
    }

    fn name_taken_by_other(&self, name: &str, own: Option<WarehouseId>) -> bool {
        self.warehouses
            .iter()
            .any(|(id, r)| r.name == name && Some(*id) != own)
    }
}

/// In-memory warehouse store.
///
/// Intended for tests/dev. Not optimized for performance. Every operation
/// runs under a single lock acquisition, which makes it atomic.
#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    state: RwLock<State>,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl WarehouseStore for InMemoryWarehouseStore {
    async fn insert_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, StoreError> {
        let mut state = self.write()?;
        if state.name_taken_by_other(new.name.as_str(), None) {
            return Err(StoreError::DuplicateName(new.name.into_inner()));
        }

        state.last_warehouse_id += 1;
        let id = WarehouseId::new(state.last_warehouse_id);
        let record = WarehouseRecord {
            name: new.name.into_inner(),
            location: new.location,
            description: new.description,
        };
        let warehouse = state.assemble(id, &record);
        state.warehouses.insert(id, record);
        Ok(warehouse)
    }

    async fn find_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        let state = self.read()?;
        Ok(state.warehouses.get(&id).map(|r| state.assemble(id, r)))
    }

    async fn find_all_warehouses(&self) -> Result<Vec<Warehouse>, StoreError> {
        let state = self.read()?;
        Ok(state
            .warehouses
            .iter()
            .map(|(id, r)| state.assemble(*id, r))
            .collect())
    }

    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, StoreError> {
        let state = self.read()?;
        Ok(state
            .warehouses
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(id, r)| state.assemble(*id, r)))
    }

    async fn update_warehouse(&self, id: WarehouseId, change: &WarehouseChange) -> Result<Warehouse, StoreError> {
        let mut state = self.write()?;
        let Some(record) = state.warehouses.get(&id) else {
            return Err(StoreError::NotFound);
        };
        if let Some(name) = &change.name {
            if state.name_taken_by_other(name.as_str(), Some(id)) {
                return Err(StoreError::DuplicateName(name.to_string()));
            }
        }

        let mut warehouse = state.assemble(id, record);
        warehouse.apply(change.clone());
        state.warehouses.insert(
            id,
            WarehouseRecord {
                name: warehouse.name().to_string(),
                location: warehouse.location().to_string(),
                description: warehouse.description().to_string(),
            },
        );
        Ok(warehouse)
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.warehouses.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.items.retain(|_, item| item.warehouse_id() != id);
        Ok(())
    }

    async fn insert_item(&self, warehouse_id: WarehouseId, new: NewItem) -> Result<Item, StoreError> {
        let mut state = self.write()?;
        if !state.warehouses.contains_key(&warehouse_id) {
            return Err(StoreError::WarehouseMissing);
        }

        state.last_item_id += 1;
        let item = Item::from_parts(
            ItemId::new(state.last_item_id),
            new.name,
            new.quantity,
            warehouse_id,
        );
        state.items.insert(*item.id(), item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let state = self.read()?;
        Ok(state.items.get(&id).cloned())
    }

    async fn find_items_by_warehouse(&self, warehouse_id: WarehouseId) -> Result<Vec<Item>, StoreError> {
        let state = self.read()?;
        Ok(state.items_of(warehouse_id))
    }

    async fn delete_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let owned = state
            .items
            .get(&item_id)
            .is_some_and(|item| item.warehouse_id() == warehouse_id);
        if !owned {
            return Err(StoreError::NotFound);
        }
        state.items.remove(&item_id);
        Ok(())
    }
}
