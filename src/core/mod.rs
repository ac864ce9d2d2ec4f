//! core
//!
//! Domain registries, strong types, configuration, and locking.
//!
//! The four registries mirror the data model exactly:
//!
//! - [`catalog`] - ingredient identities (id, name, unit)
//! - [`stock`] - quantity on hand per ingredient id
//! - [`recipes`] - recipes and their ordered requirement lists
//! - [`orders`] - the FIFO queue of pending production orders
//!
//! Registries enforce their own local invariants (id monotonicity, FIFO
//! order, non-negative quantities) but not cross-registry referential
//! integrity; that lives in the command layer ([`crate::app`]), which the
//! registries supply with existence queries and reference scans.

pub mod catalog;
pub mod config;
pub mod lock;
pub mod orders;
pub mod recipes;
pub mod stock;
pub mod types;

// Re-exports for convenience
pub use catalog::{Ingredient, IngredientCatalog};
pub use orders::{Order, OrderQueue};
pub use recipes::{Recipe, RecipeBook, Requirement};
pub use stock::{StockEntry, StockLedger};
pub use types::{Fingerprint, IngredientId, OrderId, RecipeId};
