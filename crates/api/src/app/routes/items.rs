use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_core::DomainError;

use crate::app::dto::{BodyKind, ItemResponse, MessageResponse, Payload};
use crate::app::errors;
use crate::app::html::{redirect_with_flash, Flash, Pages};
use crate::app::routes::common::{parse_item_id, parse_warehouse_id};
use crate::app::services::AppServices;

pub const ITEM_ADDED: &str = "Item added successfully";
pub const ITEM_REMOVED: &str = "Item removed successfully";

/// JSON bodies answer 201 with the item; form submissions redirect back to
/// the warehouse page.
pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path(id): Path<String>,
    body: Payload,
) -> axum::response::Response {
    let Some(warehouse_id) = parse_warehouse_id(&id) else {
        return match body.kind() {
            BodyKind::Json => errors::domain_error_to_response(DomainError::WarehouseNotFound),
            BodyKind::Form => pages.not_found(&DomainError::WarehouseNotFound.to_string()),
        };
    };

    let name = body.text("name").unwrap_or_default();
    let quantity = body.quantity("quantity");
    let result = services.warehouses.add_item(warehouse_id, &name, &quantity).await;

    let view = format!("/warehouses/{warehouse_id}/view");
    match (body.kind(), result) {
        (BodyKind::Json, Ok(item)) => (StatusCode::CREATED, Json(ItemResponse::from(&item))).into_response(),
        (BodyKind::Json, Err(e)) => errors::domain_error_to_response(e),
        (BodyKind::Form, Ok(_)) => redirect_with_flash(&view, &Flash::success(ITEM_ADDED)),
        (BodyKind::Form, Err(e)) => pages.form_failure(e, &view),
    }
}

/// Succeeds only when the item belongs to the warehouse in the path.
pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, item_id)): Path<(String, String)>,
) -> axum::response::Response {
    let (Some(warehouse_id), Some(item_id)) = (parse_warehouse_id(&id), parse_item_id(&item_id)) else {
        return errors::domain_error_to_response(DomainError::item_not_found());
    };

    match services.warehouses.remove_item(warehouse_id, item_id).await {
        Ok(()) => Json(MessageResponse { message: ITEM_REMOVED }).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(item_id): Path<String>,
) -> axum::response::Response {
    let Some(item_id) = parse_item_id(&item_id) else {
        return errors::domain_error_to_response(DomainError::item_not_found());
    };

    match services.warehouses.get_item(item_id).await {
        Ok(item) => Json(ItemResponse::from(&item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
