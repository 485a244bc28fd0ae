//! Validation rules applied before any mutation reaches the store.
//!
//! Everything here is side-effect free and holds no state between calls.

use stockroom_core::{DomainError, DomainResult, EntityKind, ValueObject};

/// A warehouse name that is trimmed, non-empty and was unique among the
/// names it was checked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WarehouseName(String);

impl WarehouseName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for WarehouseName {}

impl AsRef<str> for WarehouseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WarehouseName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim `raw` and check it against `existing` (case-sensitive, exact).
///
/// When validating a rename, `existing` must not contain the warehouse's own
/// current name.
pub fn validate_warehouse_name<'a, I>(raw: &str, existing: I) -> DomainResult<WarehouseName>
where
    I: IntoIterator<Item = &'a str>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyName(EntityKind::Warehouse));
    }
    if existing.into_iter().any(|n| n == trimmed) {
        return Err(DomainError::DuplicateName(trimmed.to_string()));
    }
    Ok(WarehouseName(trimmed.to_string()))
}

/// Item names are trimmed and must be non-empty; duplicates are allowed.
pub fn validate_item_name(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyName(EntityKind::Item));
    }
    Ok(trimmed.to_string())
}

/// Trimmed text, or the empty string when absent. Never fails.
pub fn normalize_optional_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// The shape a quantity arrived in, before parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuantityInput {
    /// The field was not supplied (or was `null`).
    #[default]
    Absent,
    /// A JSON number.
    Number(f64),
    /// Text, e.g. a form field or a JSON string.
    Text(String),
    /// Anything else (arrays, objects).
    Other,
}

impl From<f64> for QuantityInput {
    fn from(value: f64) -> Self {
        QuantityInput::Number(value)
    }
}

impl From<&str> for QuantityInput {
    fn from(value: &str) -> Self {
        QuantityInput::Text(value.to_string())
    }
}

/// Parse a quantity, falling back to `0.0` for anything unparsable.
///
/// Negative values are returned as parsed; rejecting them is the caller's
/// job (see [`ensure_non_negative`]). Non-finite values (`nan`, `inf`) count
/// as unparsable.
pub fn parse_quantity(raw: &QuantityInput) -> f64 {
    let parsed = match raw {
        QuantityInput::Number(n) => Some(*n),
        QuantityInput::Text(s) => s.trim().parse::<f64>().ok(),
        QuantityInput::Absent | QuantityInput::Other => None,
    };
    parsed.filter(|q| q.is_finite()).unwrap_or(0.0)
}

pub fn ensure_non_negative(quantity: f64) -> DomainResult<f64> {
    if quantity < 0.0 {
        return Err(DomainError::NegativeQuantity(quantity));
    }
    Ok(quantity)
}
