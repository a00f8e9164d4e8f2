//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into arena `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.
//!
//! Handles are *stable*: removing an entity from an arena leaves a tombstone
//! slot, so a handle never silently starts pointing at a different record.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the type's MAX.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Handle of a topological node in a network arena.
    pub struct NodeId(u32);
}

typed_id! {
    /// Handle of a directed link in a network arena.
    pub struct LinkId(u32);
}

typed_id! {
    /// Handle of a cross-section element (lane, shoulder, stripe) in a road
    /// network's element arena.
    pub struct ElementId(u32);
}

typed_id! {
    /// Handle of a moving agent (GTU) registered in a network.
    pub struct GtuId(u32);
}

typed_id! {
    /// Index of a vehicle (GTU) type in the type registry.
    /// `u16` keeps per-type cache keys compact (max 65,535 types).
    pub struct GtuTypeId(u16);
}

typed_id! {
    /// Index of a link type in a network's link-type table.
    pub struct LinkTypeId(u16);
}
