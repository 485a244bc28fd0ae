//! Identity of stored domain objects.

/// Something the store hands out an id for.
///
/// Two entities are the same entity when their ids match, however much their
/// other fields differ (a renamed warehouse is still that warehouse).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
