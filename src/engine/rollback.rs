//! engine::rollback
//!
//! The rollback stack: a LIFO undo log for partial withdrawals.
//!
//! During a fulfillment attempt, every successful withdrawal is recorded on
//! the stack. If a later requirement cannot be satisfied, the stack is
//! unwound: each recorded amount is deposited back, most recent first, which
//! restores the ledger to its exact pre-attempt state. Only ingredients that
//! were actually withdrawn are reverted.
//!
//! # Replay-exactly-once
//!
//! [`RollbackStack::unwind`] consumes the stack, so a recorded log cannot be
//! replayed twice: double-depositing is unrepresentable. On the commit path
//! the stack is simply dropped; its entries are never replayed.

use serde::Serialize;

use crate::core::stock::StockLedger;
use crate::core::types::IngredientId;

/// What a logged stock operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Quantity was withdrawn from the ledger (forward phase).
    Withdraw,
    /// Quantity was deposited back during rollback.
    Restore,
}

/// One entry of the operation log a fulfillment attempt reports.
///
/// The log records every withdrawal and every rollback deposit in execution
/// order, for observability and audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockOp {
    pub ingredient: IngredientId,
    pub quantity: f64,
    pub kind: OpKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RollbackEntry {
    ingredient: IngredientId,
    quantity: f64,
}

/// LIFO log of the withdrawals made during the current fulfillment attempt.
#[derive(Debug, Default)]
pub struct RollbackStack {
    entries: Vec<RollbackEntry>,
}

impl RollbackStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful withdrawal on top of the stack.
    pub fn record(&mut self, ingredient: IngredientId, quantity: f64) {
        self.entries.push(RollbackEntry {
            ingredient,
            quantity,
        });
    }

    /// Number of recorded withdrawals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo every recorded withdrawal, most recent first.
    ///
    /// Each entry is deposited back into `ledger` and appended to `log` as a
    /// [`OpKind::Restore`] operation. Consumes the stack: the undo can run
    /// at most once.
    pub fn unwind(mut self, ledger: &mut StockLedger, log: &mut Vec<StockOp>) {
        while let Some(entry) = self.entries.pop() {
            ledger.deposit(entry.ingredient, entry.quantity);
            log.push(StockOp {
                ingredient: entry.ingredient,
                quantity: entry.quantity,
                kind: OpKind::Restore,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> IngredientId {
        IngredientId::new(raw)
    }

    #[test]
    fn unwind_restores_the_ledger_exactly() {
        let mut ledger = StockLedger::new();
        ledger.deposit(id(1), 500.0);
        ledger.deposit(id(2), 150.0);
        let before = ledger.fingerprint();

        let mut stack = RollbackStack::new();
        assert!(ledger.withdraw(id(1), 200.0));
        stack.record(id(1), 200.0);
        assert!(ledger.withdraw(id(2), 100.0));
        stack.record(id(2), 100.0);

        let mut log = Vec::new();
        stack.unwind(&mut ledger, &mut log);

        assert_eq!(ledger.fingerprint(), before);
        assert_eq!(ledger.quantity(id(1)), Some(500.0));
        assert_eq!(ledger.quantity(id(2)), Some(150.0));
    }

    #[test]
    fn unwind_replays_in_reverse_order_of_recording() {
        let mut ledger = StockLedger::new();
        ledger.deposit(id(1), 10.0);
        ledger.deposit(id(2), 10.0);
        ledger.deposit(id(3), 10.0);

        let mut stack = RollbackStack::new();
        for raw in 1..=3 {
            assert!(ledger.withdraw(id(raw), 5.0));
            stack.record(id(raw), 5.0);
        }

        let mut log = Vec::new();
        stack.unwind(&mut ledger, &mut log);

        let replay: Vec<u32> = log.iter().map(|op| op.ingredient.as_u32()).collect();
        assert_eq!(replay, vec![3, 2, 1]);
        assert!(log.iter().all(|op| op.kind == OpKind::Restore));
    }

    #[test]
    fn dropping_the_stack_leaves_withdrawals_in_place() {
        let mut ledger = StockLedger::new();
        ledger.deposit(id(1), 100.0);

        let mut stack = RollbackStack::new();
        assert!(ledger.withdraw(id(1), 40.0));
        stack.record(id(1), 40.0);
        drop(stack);

        assert_eq!(ledger.quantity(id(1)), Some(60.0));
    }
}
