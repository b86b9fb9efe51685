//! The tagged nullability wrapper shared by fields and array components.

/// A schema node that may or may not admit `null`.
///
/// The host describes a nullable `T` as a union of `T` and `null`; here it is
/// an explicit tag, and every unwrap site goes through `non_nullable`.
#[derive(Debug, Clone, PartialEq)]
pub enum MaybeNullable<T> {
    Required(T),
    Nullable(T),
}

impl<T> MaybeNullable<T> {
    /// Returns `true` if `null` is an admissible value.
    pub fn is_nullable(&self) -> bool {
        matches!(self, MaybeNullable::Nullable(_))
    }

    /// Strips exactly one level of nullability. `T` and `nullable<T>` resolve
    /// to the same inner node.
    pub fn non_nullable(&self) -> &T {
        match self {
            MaybeNullable::Required(inner) | MaybeNullable::Nullable(inner) => inner,
        }
    }

    /// Consumes the wrapper, returning the inner node.
    pub fn into_inner(self) -> T {
        match self {
            MaybeNullable::Required(inner) | MaybeNullable::Nullable(inner) => inner,
        }
    }

    /// Wraps the same inner node as nullable.
    pub fn into_nullable(self) -> Self {
        MaybeNullable::Nullable(self.into_inner())
    }
}
