//! core::stock
//!
//! The stock ledger: quantity on hand per ingredient id.
//!
//! # Mutation rules
//!
//! The ledger admits exactly two mutations of a quantity:
//!
//! - [`StockLedger::deposit`] - unconditional add; creates the entry on first
//!   deposit.
//! - [`StockLedger::withdraw`] - conditional subtract; fails without mutating
//!   if the entry is missing, the amount is non-positive, or the balance is
//!   insufficient (strict comparison).
//!
//! A quantity can therefore never go negative: withdrawals that would
//! underflow are rejected outright, not clamped.
//!
//! The ledger does not check that ingredient ids exist in the catalog; that
//! is the command layer's job. An entry can outlive its catalog ingredient
//! (the display layers render it as unknown).

use serde::{Deserialize, Serialize};

use super::types::{Fingerprint, IngredientId};

/// Quantity on hand for one ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub ingredient: IngredientId,
    /// Always `>= 0`.
    pub quantity: f64,
}

/// Per-ingredient quantity-on-hand registry.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    entries: Vec<StockEntry>,
}

impl StockLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to an ingredient's balance, creating the entry on
    /// first deposit.
    ///
    /// Callers pass non-negative amounts; the command layer validates user
    /// input and the fulfillment engine only ever re-deposits amounts it
    /// previously withdrew.
    pub fn deposit(&mut self, ingredient: IngredientId, quantity: f64) {
        debug_assert!(quantity >= 0.0, "deposit amount must be non-negative");
        match self.entry_mut(ingredient) {
            Some(entry) => entry.quantity += quantity,
            None => self.entries.push(StockEntry {
                ingredient,
                quantity,
            }),
        }
    }

    /// Subtract `quantity` from an ingredient's balance.
    ///
    /// Returns `false` without mutating if the entry does not exist, the
    /// amount is `<= 0`, or the balance is below the amount. Sufficiency is
    /// a strict `>=` on `f64`.
    pub fn withdraw(&mut self, ingredient: IngredientId, quantity: f64) -> bool {
        if quantity <= 0.0 {
            return false;
        }
        let Some(entry) = self.entry_mut(ingredient) else {
            return false;
        };
        if entry.quantity >= quantity {
            entry.quantity -= quantity;
            true
        } else {
            false
        }
    }

    /// The balance for an ingredient, if it has an entry.
    pub fn quantity(&self, ingredient: IngredientId) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.ingredient == ingredient)
            .map(|entry| entry.quantity)
    }

    /// Whether the ingredient has a stock entry (even at quantity 0).
    pub fn contains(&self, ingredient: IngredientId) -> bool {
        self.quantity(ingredient).is_some()
    }

    /// Drop an ingredient's entry entirely, compacting storage.
    ///
    /// This removes the ingredient from stock management; it is independent
    /// of catalog deletion. Returns `false` if there is no entry.
    pub fn remove_entry(&mut self, ingredient: IngredientId) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.ingredient == ingredient)
        {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Iterate the ledger entries.
    pub fn iter(&self) -> impl Iterator<Item = &StockEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bit-exact digest of the ledger state, for rollback verification.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            self.entries
                .iter()
                .map(|entry| (entry.ingredient.as_u32(), entry.quantity)),
        )
    }

    fn entry_mut(&mut self, ingredient: IngredientId) -> Option<&mut StockEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.ingredient == ingredient)
    }
}
