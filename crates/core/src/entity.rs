//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Reference entities (rights, roles, programs, facilities, supervisory
/// nodes) are compared by this identity, never by their attribute values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
