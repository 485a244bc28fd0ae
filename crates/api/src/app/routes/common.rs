use stockroom_core::{ItemId, WarehouseId};

/// Path ids that do not parse as integers address nothing, so callers answer
/// them with 404 rather than 400.
pub fn parse_warehouse_id(raw: &str) -> Option<WarehouseId> {
    raw.parse().ok()
}

pub fn parse_item_id(raw: &str) -> Option<ItemId> {
    raw.parse().ok()
}
