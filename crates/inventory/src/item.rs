use stockroom_core::{DomainResult, Entity, ItemId, WarehouseId};

use crate::validation::{ensure_non_negative, parse_quantity, validate_item_name, QuantityInput};

/// A named, quantified stock record owned by exactly one warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: f64,
    warehouse_id: WarehouseId,
}

impl Item {
    pub fn from_parts(id: ItemId, name: String, quantity: f64, warehouse_id: WarehouseId) -> Self {
        Self {
            id,
            name,
            quantity,
            warehouse_id,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The owning warehouse. Fixed at creation.
    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated input for adding an item to a warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: f64,
}

impl NewItem {
    /// Name is checked before quantity. Unparsable quantities become `0.0`;
    /// parsed negatives are rejected.
    pub fn new(raw_name: &str, quantity: &QuantityInput) -> DomainResult<Self> {
        let name = validate_item_name(raw_name)?;
        let quantity = ensure_non_negative(parse_quantity(quantity))?;
        Ok(Self { name, quantity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{DomainError, EntityKind};

    #[test]
    fn new_item_defaults_quantity_when_absent() {
        let item = NewItem::new("Widget", &QuantityInput::Absent).unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.quantity, 0.0);
    }

    #[test]
    fn new_item_forgives_malformed_quantity() {
        let item = NewItem::new("X", &"not-a-number".into()).unwrap();
        assert_eq!(item.quantity, 0.0);
    }

    #[test]
    fn new_item_rejects_negative_quantity() {
        let err = NewItem::new("X", &(-5.0).into()).unwrap_err();
        assert_eq!(err, DomainError::NegativeQuantity(-5.0));
    }

    #[test]
    fn name_is_checked_before_quantity() {
        let err = NewItem::new("  ", &(-5.0).into()).unwrap_err();
        assert_eq!(err, DomainError::EmptyName(EntityKind::Item));
    }

    #[test]
    fn entity_id_matches_typed_id() {
        let item = Item::from_parts(ItemId::new(3), "Bolt".into(), 2.0, WarehouseId::new(1));
        assert_eq!(*item.id(), item.id_typed());
        assert_eq!(item.warehouse_id(), WarehouseId::new(1));
    }
}
