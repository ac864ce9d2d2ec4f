//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`IngredientId`] - Identity of a catalog ingredient
//! - [`RecipeId`] - Identity of a recipe
//! - [`OrderId`] - Identity of a queued order
//! - [`Fingerprint`] - Stock ledger state hash for rollback verification
//!
//! Ids are assigned by auto-incrementing counters owned by their registries,
//! start at 1, and are never reused within a process lifetime. The newtypes
//! keep the three id spaces from being mixed up at compile time.
//!
//! # Examples
//!
//! ```
//! use larder::core::types::{IngredientId, RecipeId};
//!
//! let flour = IngredientId::new(1);
//! assert_eq!(flour.as_u32(), 1);
//! assert_eq!(flour.to_string(), "1");
//!
//! // Distinct id spaces: this would not compile
//! // let r: RecipeId = flour;
//! let cake = RecipeId::new(1);
//! assert_eq!(cake.as_u32(), 1);
//! ```

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw id value.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw id value.
            pub const fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u32>().map(Self)
            }
        }
    };
}

id_type! {
    /// Identity of an ingredient in the catalog.
    ///
    /// Stock entries and recipe requirements refer to ingredients by this id,
    /// never by position, so catalog compaction on removal cannot invalidate
    /// them.
    IngredientId
}

id_type! {
    /// Identity of a recipe in the recipe book.
    ///
    /// Orders hold a `RecipeId` as a weak back-reference: dereferencing it is
    /// a lookup that must tolerate "not found" (the recipe may have been
    /// deleted since the order was placed).
    RecipeId
}

id_type! {
    /// Identity of an order in the queue.
    ///
    /// Assignment order equals enqueue order; ids are strictly increasing for
    /// the queue's lifetime and are not reclaimed when orders complete.
    OrderId
}

/// SHA-256 digest of a stock ledger's state.
///
/// Recorded before and after a fulfillment attempt so rollback can be
/// verified: a failed attempt must leave the ledger with the same
/// fingerprint it started with. The fingerprint is evidence for tests and
/// diagnostics, not an authority the engine acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint over `(id, quantity)` pairs.
    ///
    /// Quantities are hashed bit-exactly (`f64::to_bits`), so two ledgers
    /// compare equal only if every entry is exactly equal.
    pub fn compute(entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let mut hasher = Sha256::new();
        for (id, qty) in entries {
            hasher.update(id.to_le_bytes());
            hasher.update(qty.to_bits().to_le_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// The digest as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrips_through_display_and_parse() {
        let id = IngredientId::new(42);
        let parsed: IngredientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = RecipeId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: RecipeId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn fingerprint_depends_on_quantities() {
        let a = Fingerprint::compute([(1, 500.0), (2, 100.0)]);
        let b = Fingerprint::compute([(1, 500.0), (2, 100.0)]);
        let c = Fingerprint::compute([(1, 500.0), (2, 99.0)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn fingerprint_depends_on_entry_order() {
        let a = Fingerprint::compute([(1, 1.0), (2, 2.0)]);
        let b = Fingerprint::compute([(2, 2.0), (1, 1.0)]);
        assert_ne!(a, b);
    }
}
