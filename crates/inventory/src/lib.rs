//! Inventory domain module: warehouses and the stock items they own.
//!
//! This crate contains the business rules for warehouses and items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Name uniqueness needs the set of existing names, which callers
//! look up and pass in.

pub mod item;
pub mod validation;
pub mod warehouse;

pub use item::{Item, NewItem};
pub use validation::{
    ensure_non_negative, normalize_optional_text, parse_quantity, validate_item_name,
    validate_warehouse_name, QuantityInput, WarehouseName,
};
pub use warehouse::{NewWarehouse, Warehouse, WarehouseChange, WarehousePatch};
