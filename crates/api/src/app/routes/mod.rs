use axum::{
    routing::{get, post},
    Router,
};

pub mod common;
pub mod items;
pub mod pages;
pub mod system;
pub mod warehouses;

/// Router for every warehouse/item endpoint, JSON and HTML alike.
///
/// `POST /warehouses` and `POST /warehouses/:id/items` serve both front ends:
/// JSON bodies get JSON back, form submissions get a redirect.
pub fn router() -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route(
            "/warehouses",
            get(warehouses::list_warehouses).post(warehouses::create_warehouse),
        )
        .route(
            "/warehouses/:id",
            get(warehouses::get_warehouse)
                .put(warehouses::update_warehouse)
                .delete(warehouses::delete_warehouse),
        )
        .route("/warehouses/:id/view", get(pages::view_warehouse))
        .route(
            "/warehouses/:id/edit",
            get(pages::edit_warehouse_form).post(pages::edit_warehouse_submit),
        )
        .route("/warehouses/:id/delete", post(pages::delete_warehouse_submit))
        .route("/warehouses/:id/items", post(items::add_item))
        .route("/warehouses/:id/items/:item_id", axum::routing::delete(items::remove_item))
        .route(
            "/warehouses/:id/items/:item_id/delete",
            post(pages::remove_item_submit),
        )
        .route("/items/:item_id", get(items::get_item))
}
