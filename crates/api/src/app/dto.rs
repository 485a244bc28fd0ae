use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    Form,
};
use serde::Serialize;
use serde_json::{Map, Value};

use stockroom_core::{ItemId, WarehouseId};
use stockroom_inventory::{Item, QuantityInput, Warehouse, WarehousePatch};

use crate::app::errors;

// -------------------------
// Request bodies
// -------------------------

/// Which encoding a body arrived in. Decides whether the handler answers
/// with JSON or with a redirect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

/// A request body accepted either as a JSON object or as form fields.
///
/// `Content-Type: application/json` is parsed as JSON (malformed input is a
/// 400). Anything else is treated as a form submission; a body that is not
/// `application/x-www-form-urlencoded` yields no fields at all.
#[derive(Debug, Clone)]
pub struct Payload {
    kind: BodyKind,
    fields: Map<String, Value>,
}

impl Payload {
    pub fn json(fields: Map<String, Value>) -> Self {
        Self {
            kind: BodyKind::Json,
            fields,
        }
    }

    pub fn form(fields: HashMap<String, String>) -> Self {
        Self {
            kind: BodyKind::Form,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Text value of `key`. Strings pass through, numbers are stringified,
    /// everything else (including `null`) counts as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_text)
    }

    /// Booleans count as `1`/`0`, the way a numeric cast reads them.
    pub fn quantity(&self, key: &str) -> QuantityInput {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => QuantityInput::Number(if *b { 1.0 } else { 0.0 }),
            None | Some(Value::Null) => QuantityInput::Absent,
            Some(Value::Number(n)) => n.as_f64().map(QuantityInput::Number).unwrap_or(QuantityInput::Other),
            Some(Value::String(s)) => QuantityInput::Text(s.clone()),
            Some(_) => QuantityInput::Other,
        }
    }

    /// Partial update: a key that is present (even as `null` or a non-text
    /// value) becomes `Some`, so it is set rather than left untouched.
    pub fn patch(&self) -> WarehousePatch {
        let field = |key: &str| {
            self.fields
                .get(key)
                .map(|v| scalar_text(v).unwrap_or_default())
        };
        WarehousePatch {
            name: field("name"),
            location: field("location"),
            description: field("description"),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| errors::json_error(rejection.status(), rejection.body_text()))?;

            return match serde_json::from_slice::<Value>(&body) {
                Ok(Value::Object(fields)) => Ok(Payload::json(fields)),
                Ok(_) => Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "request body must be a JSON object",
                )),
                Err(e) => Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    format!("malformed JSON body: {e}"),
                )),
            };
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| errors::json_error(rejection.status(), rejection.body_text()))?;
            return Ok(Payload::form(fields));
        }

        Ok(Payload::form(HashMap::new()))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub name: String,
    pub quantity: f64,
    pub warehouse_id: WarehouseId,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id_typed(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            warehouse_id: item.warehouse_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseResponse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
    pub description: String,
    pub items: Vec<ItemResponse>,
}

impl From<&Warehouse> for WarehouseResponse {
    fn from(w: &Warehouse) -> Self {
        Self {
            id: w.id_typed(),
            name: w.name().to_string(),
            location: w.location().to_string(),
            description: w.description().to_string(),
            items: w.items().iter().map(ItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
