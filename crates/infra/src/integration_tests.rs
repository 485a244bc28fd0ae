//! Service-level tests run against every store implementation.
//!
//! Each scenario is written once in `scenarios` and instantiated per backend
//! by `store_contract!`, so the in-memory and SQLite stores are held to the
//! same behaviour.

#[cfg(test)]
mod lockstep {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Barrier;

    use stockroom_core::{ItemId, WarehouseId};
    use stockroom_inventory::{Item, NewItem, NewWarehouse, Warehouse, WarehouseChange};

    use crate::store::{StoreError, WarehouseStore};

    /// Store wrapper that holds every lookup until a second caller has made
    /// the same lookup, so two operations both see the state from before
    /// either one writes.
    pub struct Lockstep<'a, S> {
        inner: &'a S,
        gate: Barrier,
        inserts: AtomicUsize,
        updates: AtomicUsize,
    }

    impl<'a, S> Lockstep<'a, S> {
        pub fn new(inner: &'a S) -> Self {
            Self {
                inner,
                gate: Barrier::new(2),
                inserts: AtomicUsize::new(0),
                updates: AtomicUsize::new(0),
            }
        }

        pub fn inserts(&self) -> usize {
            self.inserts.load(Ordering::SeqCst)
        }

        pub fn updates(&self) -> usize {
            self.updates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<'a, S: WarehouseStore> WarehouseStore for Lockstep<'a, S> {
        async fn insert_warehouse(&self, new: NewWarehouse) -> Result<Warehouse, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_warehouse(new).await
        }

        async fn find_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
            let found = self.inner.find_warehouse(id).await;
            self.gate.wait().await;
            found
        }

        async fn find_all_warehouses(&self) -> Result<Vec<Warehouse>, StoreError> {
            self.inner.find_all_warehouses().await
        }

        async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, StoreError> {
            let found = self.inner.find_warehouse_by_name(name).await;
            self.gate.wait().await;
            found
        }

        async fn update_warehouse(&self, id: WarehouseId, change: &WarehouseChange) -> Result<Warehouse, StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update_warehouse(id, change).await
        }

        async fn delete_warehouse(&self, id: WarehouseId) -> Result<(), StoreError> {
            self.inner.delete_warehouse(id).await
        }

        async fn insert_item(&self, warehouse_id: WarehouseId, new: NewItem) -> Result<Item, StoreError> {
            self.inner.insert_item(warehouse_id, new).await
        }

        async fn find_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
            self.inner.find_item(id).await
        }

        async fn find_items_by_warehouse(&self, warehouse_id: WarehouseId) -> Result<Vec<Item>, StoreError> {
            self.inner.find_items_by_warehouse(warehouse_id).await
        }

        async fn delete_item(&self, warehouse_id: WarehouseId, item_id: ItemId) -> Result<(), StoreError> {
            self.inner.delete_item(warehouse_id, item_id).await
        }
    }
}

#[cfg(test)]
mod scenarios {
    use stockroom_core::{DomainError, Entity, EntityKind, ItemId, WarehouseId};
    use stockroom_inventory::{QuantityInput, WarehousePatch};

    use super::lockstep::Lockstep;
    use crate::service::WarehouseService;
    use crate::store::WarehouseStore;

    pub async fn create_returns_empty_warehouse<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc
            .create_warehouse("  Main  ", Some(" Dock 4 "), None)
            .await
            .unwrap();
        assert_eq!(w.name(), "Main");
        assert_eq!(w.location(), "Dock 4");
        assert_eq!(w.description(), "");
        assert!(w.items().is_empty());

        let fetched = svc.get_warehouse(w.id_typed()).await.unwrap();
        assert_eq!(fetched, w);
    }

    pub async fn empty_name_is_rejected<S: WarehouseStore>(svc: WarehouseService<S>) {
        let err = svc.create_warehouse("   ", None, None).await.unwrap_err();
        assert_eq!(err, DomainError::EmptyName(EntityKind::Warehouse));
        assert!(svc.list_warehouses().await.unwrap().is_empty());
    }

    pub async fn duplicate_name_is_rejected<S: WarehouseStore>(svc: WarehouseService<S>) {
        svc.create_warehouse("A", None, None).await.unwrap();
        let err = svc.create_warehouse(" A ", None, None).await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateName("A".to_string()));
        assert!(err.to_string().contains("already exists"));

        let all = svc.list_warehouses().await.unwrap();
        assert_eq!(all.iter().filter(|w| w.name() == "A").count(), 1);
    }

    pub async fn names_are_case_sensitive<S: WarehouseStore>(svc: WarehouseService<S>) {
        svc.create_warehouse("main", None, None).await.unwrap();
        svc.create_warehouse("Main", None, None).await.unwrap();
        assert_eq!(svc.list_warehouses().await.unwrap().len(), 2);
    }

    pub async fn list_preserves_creation_order<S: WarehouseStore>(svc: WarehouseService<S>) {
        assert!(svc.list_warehouses().await.unwrap().is_empty());
        for name in ["Zulu", "Alpha", "Mike"] {
            svc.create_warehouse(name, None, None).await.unwrap();
        }
        let names: Vec<String> = svc
            .list_warehouses()
            .await
            .unwrap()
            .iter()
            .map(|w| w.name().to_string())
            .collect();
        assert_eq!(names, ["Zulu", "Alpha", "Mike"]);
    }

    pub async fn get_missing_warehouse_is_not_found<S: WarehouseStore>(svc: WarehouseService<S>) {
        let err = svc.get_warehouse(WarehouseId::new(42)).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Warehouse));
        assert!(err.is_not_found());
    }

    pub async fn partial_update_touches_only_present_fields<S: WarehouseStore>(
        svc: WarehouseService<S>,
    ) {
        let w = svc
            .create_warehouse("Main", Some("North"), Some("Cold storage"))
            .await
            .unwrap();

        let patch = WarehousePatch {
            location: Some("  South ".to_string()),
            ..WarehousePatch::default()
        };
        let updated = svc.update_warehouse(w.id_typed(), patch).await.unwrap();
        assert_eq!(updated.name(), "Main");
        assert_eq!(updated.location(), "South");
        assert_eq!(updated.description(), "Cold storage");

        let clear = WarehousePatch {
            description: Some("   ".to_string()),
            ..WarehousePatch::default()
        };
        let cleared = svc.update_warehouse(w.id_typed(), clear).await.unwrap();
        assert_eq!(cleared.description(), "");
        assert_eq!(cleared.location(), "South");

        let reread = svc.get_warehouse(w.id_typed()).await.unwrap();
        assert_eq!(reread, cleared);
    }

    pub async fn empty_patch_changes_nothing<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", Some("North"), None).await.unwrap();
        let same = svc
            .update_warehouse(w.id_typed(), WarehousePatch::default())
            .await
            .unwrap();
        assert_eq!(same, w);
    }

    pub async fn rename_checks_other_warehouses_only<S: WarehouseStore>(svc: WarehouseService<S>) {
        let a = svc.create_warehouse("A", None, None).await.unwrap();
        svc.create_warehouse("B", None, None).await.unwrap();

        let keep = WarehousePatch {
            name: Some(" A ".to_string()),
            ..WarehousePatch::default()
        };
        let renamed = svc.update_warehouse(a.id_typed(), keep).await.unwrap();
        assert_eq!(renamed.name(), "A");
        assert!(renamed.same_identity(&a));

        let clash = WarehousePatch {
            name: Some("B".to_string()),
            ..WarehousePatch::default()
        };
        let err = svc.update_warehouse(a.id_typed(), clash).await.unwrap_err();
        assert_eq!(err, DomainError::DuplicateName("B".to_string()));

        let blank = WarehousePatch {
            name: Some("  ".to_string()),
            location: Some("ignored".to_string()),
            ..WarehousePatch::default()
        };
        let err = svc.update_warehouse(a.id_typed(), blank).await.unwrap_err();
        assert_eq!(err, DomainError::EmptyName(EntityKind::Warehouse));

        let unchanged = svc.get_warehouse(a.id_typed()).await.unwrap();
        assert_eq!(unchanged.name(), "A");
        assert_eq!(unchanged.location(), "");
    }

    pub async fn update_missing_warehouse_is_not_found<S: WarehouseStore>(svc: WarehouseService<S>) {
        let patch = WarehousePatch::replace_all("X", "", "");
        let err = svc
            .update_warehouse(WarehouseId::new(7), patch)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Warehouse));
    }

    pub async fn add_item_and_read_back<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        let item = svc
            .add_item(w.id_typed(), " Widget ", &QuantityInput::Number(10.5))
            .await
            .unwrap();
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.quantity(), 10.5);
        assert_eq!(item.warehouse_id(), w.id_typed());

        let fetched = svc.get_warehouse(w.id_typed()).await.unwrap();
        assert_eq!(fetched.items(), [item.clone()]);
        assert_eq!(svc.get_item(item.id_typed()).await.unwrap(), item);
    }

    pub async fn items_keep_insertion_order_and_allow_duplicates<S: WarehouseStore>(
        svc: WarehouseService<S>,
    ) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        for qty in ["3", "1", "2"] {
            svc.add_item(w.id_typed(), "Bolt", &QuantityInput::from(qty))
                .await
                .unwrap();
        }
        let quantities: Vec<f64> = svc
            .get_warehouse(w.id_typed())
            .await
            .unwrap()
            .items()
            .iter()
            .map(|i| i.quantity())
            .collect();
        assert_eq!(quantities, [3.0, 1.0, 2.0]);
    }

    pub async fn negative_quantity_is_rejected_without_a_row<S: WarehouseStore>(
        svc: WarehouseService<S>,
    ) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        let err = svc
            .add_item(w.id_typed(), "X", &QuantityInput::Number(-5.0))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NegativeQuantity(-5.0));

        let err = svc
            .add_item(w.id_typed(), "X", &QuantityInput::from("-0.5"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NegativeQuantity(_)));

        assert!(svc.get_warehouse(w.id_typed()).await.unwrap().items().is_empty());
    }

    pub async fn unparsable_quantity_defaults_to_zero<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        for raw in [
            QuantityInput::from("not-a-number"),
            QuantityInput::Absent,
            QuantityInput::Other,
        ] {
            let item = svc.add_item(w.id_typed(), "X", &raw).await.unwrap();
            assert_eq!(item.quantity(), 0.0);
        }
    }

    pub async fn add_item_check_order<S: WarehouseStore>(svc: WarehouseService<S>) {
        // Missing warehouse wins over a bad name and a bad quantity.
        let err = svc
            .add_item(WarehouseId::new(99), "", &QuantityInput::Number(-1.0))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::WarehouseNotFound);

        // Name is checked before quantity.
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        let err = svc
            .add_item(w.id_typed(), "  ", &QuantityInput::Number(-1.0))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::EmptyName(EntityKind::Item));
    }

    pub async fn delete_cascades_to_items<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        let other = svc.create_warehouse("Other", None, None).await.unwrap();
        let a = svc
            .add_item(w.id_typed(), "A", &QuantityInput::Number(1.0))
            .await
            .unwrap();
        let b = svc
            .add_item(w.id_typed(), "B", &QuantityInput::Number(2.0))
            .await
            .unwrap();
        let survivor = svc
            .add_item(other.id_typed(), "C", &QuantityInput::Number(3.0))
            .await
            .unwrap();

        svc.delete_warehouse(w.id_typed()).await.unwrap();

        assert_eq!(
            svc.get_warehouse(w.id_typed()).await.unwrap_err(),
            DomainError::NotFound(EntityKind::Warehouse)
        );
        for gone in [a.id_typed(), b.id_typed()] {
            assert_eq!(
                svc.get_item(gone).await.unwrap_err(),
                DomainError::NotFound(EntityKind::Item)
            );
        }
        assert!(
            svc.store()
                .find_items_by_warehouse(w.id_typed())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(svc.get_item(survivor.id_typed()).await.unwrap(), survivor);
    }

    pub async fn delete_missing_warehouse_is_not_found<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        svc.delete_warehouse(w.id_typed()).await.unwrap();
        let err = svc.delete_warehouse(w.id_typed()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Warehouse));
    }

    pub async fn deleted_name_can_be_reused<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        svc.delete_warehouse(w.id_typed()).await.unwrap();
        let again = svc.create_warehouse("Main", None, None).await.unwrap();
        assert_ne!(again.id_typed(), w.id_typed());
    }

    pub async fn remove_item_is_scoped_to_its_warehouse<S: WarehouseStore>(svc: WarehouseService<S>) {
        let w1 = svc.create_warehouse("W1", None, None).await.unwrap();
        let w2 = svc.create_warehouse("W2", None, None).await.unwrap();
        let item = svc
            .add_item(w2.id_typed(), "Widget", &QuantityInput::Number(1.0))
            .await
            .unwrap();

        let err = svc.remove_item(w1.id_typed(), item.id_typed()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Item));
        assert_eq!(svc.get_item(item.id_typed()).await.unwrap(), item);

        svc.remove_item(w2.id_typed(), item.id_typed()).await.unwrap();
        let err = svc.remove_item(w2.id_typed(), item.id_typed()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Item));

        let err = svc
            .remove_item(WarehouseId::new(404), ItemId::new(404))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound(EntityKind::Item));
    }

    pub async fn concurrent_creates_with_same_name_admit_one<S: WarehouseStore>(
        svc: WarehouseService<S>,
    ) {
        let racing = WarehouseService::new(Lockstep::new(svc.store()));
        let (a, b) = tokio::join!(
            racing.create_warehouse("Race", None, None),
            racing.create_warehouse("Race", None, None),
        );

        // Both got past the name lookup, so the store had to reject one.
        assert_eq!(racing.store().inserts(), 2);
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let errors: Vec<&DomainError> = outcomes.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors, [&DomainError::DuplicateName("Race".to_string())]);

        let all = svc.list_warehouses().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "Race");
    }

    pub async fn concurrent_partial_updates_keep_both_fields<S: WarehouseStore>(
        svc: WarehouseService<S>,
    ) {
        let w = svc
            .create_warehouse("Main", Some("North"), Some("Cold"))
            .await
            .unwrap();
        let id = w.id_typed();

        let racing = WarehouseService::new(Lockstep::new(svc.store()));
        let move_south = WarehousePatch {
            location: Some("South".to_string()),
            ..WarehousePatch::default()
        };
        let freeze = WarehousePatch {
            description: Some("Frozen".to_string()),
            ..WarehousePatch::default()
        };
        let (a, b) = tokio::join!(
            racing.update_warehouse(id, move_south),
            racing.update_warehouse(id, freeze),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(racing.store().updates(), 2);

        let stored = svc.get_warehouse(id).await.unwrap();
        assert_eq!(stored.name(), "Main");
        assert_eq!(stored.location(), "South");
        assert_eq!(stored.description(), "Frozen");
    }
}

#[cfg(test)]
macro_rules! store_contract {
    ($backend:ident, $make:expr, [$($scenario:ident),* $(,)?]) => {
        mod $backend {
            use super::scenarios;
            use crate::service::WarehouseService;

            $(
                #[tokio::test]
                async fn $scenario() {
                    let store = $make;
                    scenarios::$scenario(WarehouseService::new(store)).await;
                }
            )*
        }
    };
}

#[cfg(test)]
macro_rules! all_scenarios {
    ($backend:ident, $make:expr) => {
        store_contract!($backend, $make, [
            create_returns_empty_warehouse,
            empty_name_is_rejected,
            duplicate_name_is_rejected,
            names_are_case_sensitive,
            list_preserves_creation_order,
            get_missing_warehouse_is_not_found,
            partial_update_touches_only_present_fields,
            empty_patch_changes_nothing,
            rename_checks_other_warehouses_only,
            update_missing_warehouse_is_not_found,
            add_item_and_read_back,
            items_keep_insertion_order_and_allow_duplicates,
            negative_quantity_is_rejected_without_a_row,
            unparsable_quantity_defaults_to_zero,
            add_item_check_order,
            delete_cascades_to_items,
            delete_missing_warehouse_is_not_found,
            deleted_name_can_be_reused,
            remove_item_is_scoped_to_its_warehouse,
            concurrent_creates_with_same_name_admit_one,
            concurrent_partial_updates_keep_both_fields,
        ]);
    };
}

#[cfg(test)]
all_scenarios!(in_memory, crate::store::InMemoryWarehouseStore::new());

#[cfg(test)]
all_scenarios!(
    sqlite,
    crate::store::SqliteWarehouseStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
);

#[cfg(test)]
mod shared_handle {
    use std::sync::Arc;

    use stockroom_inventory::QuantityInput;

    use crate::service::WarehouseService;
    use crate::store::{InMemoryWarehouseStore, WarehouseStore};

    #[tokio::test]
    async fn service_works_through_a_trait_object() {
        let store: Arc<dyn WarehouseStore> = Arc::new(InMemoryWarehouseStore::new());
        let svc = WarehouseService::new(store.clone());

        let w = svc.create_warehouse("Main", None, None).await.unwrap();
        svc.add_item(w.id_typed(), "Widget", &QuantityInput::Number(1.0))
            .await
            .unwrap();

        let seen_by_store = store.find_warehouse(w.id_typed()).await.unwrap().unwrap();
        assert_eq!(seen_by_store.items().len(), 1);
    }
}
