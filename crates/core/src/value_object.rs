//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. An identity key (a verified email) is one: two keys with
//! the same text are the same key.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one. Construction is where validation happens, so a value that exists
/// is a valid value.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct IdentityKey(String);
///
/// impl ValueObject for IdentityKey {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
