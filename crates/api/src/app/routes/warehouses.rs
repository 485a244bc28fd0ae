use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_core::DomainError;

use crate::app::dto::{BodyKind, MessageResponse, Payload, WarehouseResponse};
use crate::app::errors;
use crate::app::html::{redirect_with_flash, Flash, Pages};
use crate::app::routes::common::parse_warehouse_id;
use crate::app::services::AppServices;

pub const WAREHOUSE_DELETED: &str = "Warehouse deleted successfully";
pub const WAREHOUSE_CREATED: &str = "Warehouse created successfully";

pub async fn list_warehouses(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.warehouses.list_warehouses().await {
        Ok(all) => Json(all.iter().map(WarehouseResponse::from).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Some(id) = parse_warehouse_id(&id) else {
        return errors::domain_error_to_response(DomainError::warehouse_not_found());
    };

    match services.warehouses.get_warehouse(id).await {
        Ok(w) => Json(WarehouseResponse::from(&w)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// JSON bodies answer 201 with the warehouse; form submissions redirect to
/// the index with a flash.
pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    body: Payload,
) -> axum::response::Response {
    let name = body.text("name").unwrap_or_default();
    let location = body.text("location");
    let description = body.text("description");

    let result = services
        .warehouses
        .create_warehouse(&name, location.as_deref(), description.as_deref())
        .await;

    match (body.kind(), result) {
        (BodyKind::Json, Ok(w)) => (StatusCode::CREATED, Json(WarehouseResponse::from(&w))).into_response(),
        (BodyKind::Json, Err(e)) => errors::domain_error_to_response(e),
        (BodyKind::Form, Ok(_)) => redirect_with_flash("/", &Flash::success(WAREHOUSE_CREATED)),
        (BodyKind::Form, Err(e)) => pages.form_failure(e, "/"),
    }
}

/// Partial update: only keys present in the body are changed.
pub async fn update_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Payload,
) -> axum::response::Response {
    let Some(id) = parse_warehouse_id(&id) else {
        return errors::domain_error_to_response(DomainError::warehouse_not_found());
    };

    match services.warehouses.update_warehouse(id, body.patch()).await {
        Ok(w) => Json(WarehouseResponse::from(&w)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Some(id) = parse_warehouse_id(&id) else {
        return errors::domain_error_to_response(DomainError::warehouse_not_found());
    };

    match services.warehouses.delete_warehouse(id).await {
        Ok(()) => Json(MessageResponse {
            message: WAREHOUSE_DELETED,
        })
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
