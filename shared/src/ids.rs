//! Newtype IDs for type-safe entity references.
//!
//! The remote persistence API identifies every entity with an integer. Each
//! entity gets its own wrapper so a `PalletId` can never be passed where an
//! `OrderId` is expected.

/// Define a type-safe ID wrapper around `i64`.
///
/// Generated types are `Copy`, hashable, ordered, and serialize transparently
/// as the bare integer.
///
/// ```rust
/// shared::define_id!(CrateId);
///
/// let id = CrateId::new(7);
/// assert_eq!(id.as_i64(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(SpeciesId);
define_id!(SupplierId);
define_id!(PalletId);
define_id!(BoxId);
define_id!(ReceptionId);
define_id!(OrderId);
define_id!(StoreId);
define_id!(PositionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_bare_integer() {
        let id = PalletId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: PalletId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_conversions() {
        let order = OrderId::from(9);
        assert_eq!(i64::from(order), 9);
        assert_eq!(order.to_string(), "9");
    }
}
