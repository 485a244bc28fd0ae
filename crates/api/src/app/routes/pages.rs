//! HTML front end.
//!
//! Form handlers mirror the JSON endpoints but answer with redirects and
//! flash messages instead of JSON bodies.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Form,
};
use serde::Deserialize;
use tera::Context;

use stockroom_core::DomainError;
use stockroom_inventory::{Warehouse, WarehousePatch};

use crate::app::dto::WarehouseResponse;
use crate::app::errors;
use crate::app::html::{redirect_with_flash, Flash, FlashQuery, Pages};
use crate::app::routes::common::{parse_item_id, parse_warehouse_id};
use crate::app::routes::items::ITEM_REMOVED;
use crate::app::routes::warehouses::WAREHOUSE_DELETED;
use crate::app::services::AppServices;

pub const WAREHOUSE_UPDATED: &str = "Warehouse updated successfully";

#[derive(Debug, Default, Deserialize)]
pub struct EditWarehouseForm {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

pub async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Query(flash): Query<FlashQuery>,
) -> axum::response::Response {
    let warehouses = match services.warehouses.list_warehouses().await {
        Ok(all) => all,
        Err(e) => return page_failure(&pages, e),
    };

    let mut context = Context::new();
    context.insert(
        "warehouses",
        &warehouses.iter().map(WarehouseResponse::from).collect::<Vec<_>>(),
    );
    pages.render(StatusCode::OK, "index.html", context, flash.into_flash())
}

pub async fn view_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path(id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> axum::response::Response {
    let warehouse = match load_warehouse(&services, &id).await {
        Ok(w) => w,
        Err(e) => return page_failure(&pages, e),
    };

    let mut context = Context::new();
    context.insert("warehouse", &WarehouseResponse::from(&warehouse));
    pages.render(StatusCode::OK, "view.html", context, flash.into_flash())
}

pub async fn edit_warehouse_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load_warehouse(&services, &id).await {
        Ok(w) => render_edit(&pages, StatusCode::OK, &w, None),
        Err(e) => page_failure(&pages, e),
    }
}

/// Full replacement: a field missing from the form is cleared.
///
/// Validation failures re-render the form with status 400 and the stored
/// values.
pub async fn edit_warehouse_submit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path(id): Path<String>,
    Form(form): Form<EditWarehouseForm>,
) -> axum::response::Response {
    let current = match load_warehouse(&services, &id).await {
        Ok(w) => w,
        Err(e) => return page_failure(&pages, e),
    };

    let patch = WarehousePatch::replace_all(
        form.name.unwrap_or_default(),
        form.location.unwrap_or_default(),
        form.description.unwrap_or_default(),
    );

    match services.warehouses.update_warehouse(current.id_typed(), patch).await {
        Ok(_) => redirect_with_flash("/", &Flash::success(WAREHOUSE_UPDATED)),
        Err(e) if e.is_validation() => {
            tracing::info!(error = %e, "warehouse edit rejected");
            render_edit(&pages, StatusCode::BAD_REQUEST, &current, Some(e.to_string()))
        }
        Err(e) => page_failure(&pages, e),
    }
}

pub async fn delete_warehouse_submit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Some(id) = parse_warehouse_id(&id) else {
        return page_failure(&pages, DomainError::warehouse_not_found());
    };

    match services.warehouses.delete_warehouse(id).await {
        Ok(()) => redirect_with_flash("/", &Flash::success(WAREHOUSE_DELETED)),
        Err(e) => page_failure(&pages, e),
    }
}

/// An item that is missing (or lives in another warehouse) becomes an error
/// flash on the warehouse page rather than a 404.
pub async fn remove_item_submit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(pages): Extension<Arc<Pages>>,
    Path((id, item_id)): Path<(String, String)>,
) -> axum::response::Response {
    let Some(warehouse_id) = parse_warehouse_id(&id) else {
        return page_failure(&pages, DomainError::warehouse_not_found());
    };
    let view = format!("/warehouses/{warehouse_id}/view");

    let Some(item_id) = parse_item_id(&item_id) else {
        return redirect_with_flash(&view, &Flash::error("Item not found"));
    };

    match services.warehouses.remove_item(warehouse_id, item_id).await {
        Ok(()) => redirect_with_flash(&view, &Flash::success(ITEM_REMOVED)),
        Err(e) if e.is_not_found() => redirect_with_flash(&view, &Flash::error("Item not found")),
        Err(e) => page_failure(&pages, e),
    }
}

async fn load_warehouse(services: &AppServices, raw_id: &str) -> Result<Warehouse, DomainError> {
    let id = parse_warehouse_id(raw_id).ok_or_else(DomainError::warehouse_not_found)?;
    services.warehouses.get_warehouse(id).await
}

fn render_edit(pages: &Pages, status: StatusCode, warehouse: &Warehouse, error: Option<String>) -> axum::response::Response {
    let mut context = Context::new();
    context.insert("warehouse", &WarehouseResponse::from(warehouse));
    context.insert("error", &error);
    pages.render(status, "edit.html", context, None)
}

fn page_failure(pages: &Pages, err: DomainError) -> axum::response::Response {
    let status = errors::status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "page request failed");
    }
    pages.error_page(status, &errors::public_message(&err))
}
