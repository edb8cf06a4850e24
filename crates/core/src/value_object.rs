//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// `RightQuery` is the canonical example in this workspace: two queries for
/// the same right and scope are the same question.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Scope {
///     program: ProgramId,
///     facility: FacilityId,
/// }
///
/// impl ValueObject for Scope {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
