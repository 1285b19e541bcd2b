//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stored records such as role nodes are entities: two values with the same id
/// are the same record, even if one is a stale snapshot of the other.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
