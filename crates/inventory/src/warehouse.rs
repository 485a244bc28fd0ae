use stockroom_core::{DomainResult, Entity, WarehouseId};

use crate::item::Item;
use crate::validation::{normalize_optional_text, validate_warehouse_name, WarehouseName};

/// A named container exclusively owning its stock items.
#[derive(Debug, Clone, PartialEq)]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    location: String,
    description: String,
    items: Vec<Item>,
}

impl Warehouse {
    /// Rebuild a warehouse from stored state. `items` must be in insertion order.
    pub fn from_parts(
        id: WarehouseId,
        name: String,
        location: String,
        description: String,
        items: Vec<Item>,
    ) -> Self {
        Self {
            id,
            name,
            location,
            description,
            items,
        }
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Apply an already-validated change. Fields the change leaves as `None`
    /// keep their current value.
    pub fn apply(&mut self, change: WarehouseChange) {
        if let Some(name) = change.name {
            self.name = name.into_inner();
        }
        if let Some(location) = change.location {
            self.location = location;
        }
        if let Some(description) = change.description {
            self.description = description;
        }
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Validated input for creating a warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWarehouse {
    pub name: WarehouseName,
    pub location: String,
    pub description: String,
}

impl NewWarehouse {
    pub fn new(name: WarehouseName, location: Option<&str>, description: Option<&str>) -> Self {
        Self {
            name,
            location: normalize_optional_text(location),
            description: normalize_optional_text(description),
        }
    }
}

/// Partial update as requested by a caller.
///
/// `None` means the key was absent and the field stays untouched. `Some(raw)`
/// means the key was present; an empty or whitespace-only `raw` clears
/// `location`/`description` and is rejected for `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl WarehousePatch {
    /// A patch that sets every field (form-style full replacement).
    pub fn replace_all(
        name: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location.into()),
            description: Some(description.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none() && self.description.is_none()
    }

    /// Validate against the names held by *other* warehouses.
    pub fn validate<'a, I>(&self, other_names: I) -> DomainResult<WarehouseChange>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let name = match &self.name {
            Some(raw) => Some(validate_warehouse_name(raw, other_names)?),
            None => None,
        };
        Ok(WarehouseChange {
            name,
            location: self.location.as_deref().map(|raw| normalize_optional_text(Some(raw))),
            description: self
                .description
                .as_deref()
                .map(|raw| normalize_optional_text(Some(raw))),
        })
    }
}

/// A validated [`WarehousePatch`], ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseChange {
    pub name: Option<WarehouseName>,
    pub location: Option<String>,
    pub description: Option<String>,
}
