//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// validated warehouse name is one: two names with the same text are the same
/// name, whichever warehouse carries them.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Sku(String);
///
/// impl ValueObject for Sku {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
