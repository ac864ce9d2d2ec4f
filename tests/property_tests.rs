//! Property-based tests for the fulfillment transaction.
//!
//! These tests use proptest to verify the engine's invariants across
//! randomly generated catalogs, stock levels, and recipes.
//!
//! All quantities are multiples of 0.25 so every value, sum, and difference
//! is exactly representable in an f64 and the assertions can compare
//! exactly.

use proptest::prelude::*;

use larder::app::App;
use larder::core::types::IngredientId;
use larder::engine::{OpKind, Outcome};

const STEP: f64 = 0.25;

/// One ingredient: its stock level in steps (None = no stock entry at all)
/// and its required quantity in steps.
type Setup = Vec<(Option<u32>, u32)>;

fn setup() -> impl Strategy<Value = Setup> {
    prop::collection::vec((prop::option::of(0u32..=400), 1u32..=400), 1..=5)
}

/// Build an app with one recipe whose requirement order matches `setup`
/// order, one pending order, and the given stock levels.
fn build(setup: &Setup) -> App {
    let mut app = App::new();
    let mut ids = Vec::new();
    for (i, (stock, _)) in setup.iter().enumerate() {
        let id = app.add_ingredient(&format!("ing-{}", i), "g");
        if let Some(steps) = stock {
            app.deposit_stock(id, *steps as f64 * STEP).unwrap();
        }
        ids.push(id);
    }

    let recipe = app.add_recipe("subject", "");
    // Requirements front-insert, so add in reverse to iterate in setup order.
    for (id, (_, req)) in ids.iter().zip(setup).rev() {
        app.add_requirement(recipe, *id, *req as f64 * STEP).unwrap();
    }
    app.place_order(recipe).unwrap();
    app
}

/// Whether the recipe can be satisfied: every requirement is covered by the
/// ingredient's stock (a missing entry covers nothing).
fn satisfiable(setup: &Setup) -> bool {
    setup
        .iter()
        .all(|(stock, req)| stock.map_or(false, |s| s >= *req))
}

proptest! {
    /// The attempt succeeds exactly when every requirement is covered, and
    /// a success withdraws exactly the required amount from each entry.
    #[test]
    fn fulfillment_is_all_or_nothing(setup in setup()) {
        let mut app = build(&setup);
        let attempt = app.process_next();

        if satisfiable(&setup) {
            prop_assert!(matches!(attempt.outcome, Outcome::Success { .. }), "expected Success outcome");
            for (i, (stock, req)) in setup.iter().enumerate() {
                let id = IngredientId::new(i as u32 + 1);
                let expected = (stock.unwrap() - req) as f64 * STEP;
                prop_assert_eq!(app.stock.quantity(id), Some(expected));
            }
            prop_assert!(app.orders.is_empty());
        } else {
            prop_assert!(matches!(attempt.outcome, Outcome::Failed { .. }), "expected Failed outcome");
            prop_assert_eq!(app.orders.len(), 1);
        }
    }

    /// A failed attempt leaves every stock quantity bit-identical.
    #[test]
    fn failure_preserves_every_quantity(setup in setup()) {
        prop_assume!(!satisfiable(&setup));
        let mut app = build(&setup);
        let before = app.stock.fingerprint();

        let attempt = app.process_next();

        prop_assert!(matches!(attempt.outcome, Outcome::Failed { .. }), "expected Failed outcome");
        prop_assert!(attempt.ledger_consistent());
        prop_assert_eq!(app.stock.fingerprint(), before);
        for (i, (stock, _)) in setup.iter().enumerate() {
            let id = IngredientId::new(i as u32 + 1);
            prop_assert_eq!(app.stock.quantity(id), stock.map(|s| s as f64 * STEP));
        }
    }

    /// No outcome ever drives a stock quantity below zero.
    #[test]
    fn stock_never_goes_negative(setup in setup()) {
        let mut app = build(&setup);
        app.process_next();
        for entry in app.stock.iter() {
            prop_assert!(entry.quantity >= 0.0);
        }
    }

    /// The operation log pairs up: a success logs one withdrawal per
    /// requirement, a failure logs each completed withdrawal and then its
    /// restore in reverse order.
    #[test]
    fn log_shape_matches_outcome(setup in setup()) {
        let mut app = build(&setup);
        let attempt = app.process_next();

        match attempt.outcome {
            Outcome::Success { ref log, .. } => {
                prop_assert_eq!(log.len(), setup.len());
                prop_assert!(log.iter().all(|op| op.kind == OpKind::Withdraw));
            }
            Outcome::Failed { ref log, .. } => {
                prop_assert_eq!(log.len() % 2, 0);
                let half = log.len() / 2;
                prop_assert!(half < setup.len());
                // Withdrawals first, then restores mirroring them LIFO.
                for (i, op) in log[..half].iter().enumerate() {
                    prop_assert_eq!(op.kind, OpKind::Withdraw);
                    let restore = &log[log.len() - 1 - i];
                    prop_assert_eq!(restore.kind, OpKind::Restore);
                    prop_assert_eq!(restore.ingredient, op.ingredient);
                    prop_assert_eq!(restore.quantity, op.quantity);
                }
            }
            ref other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    /// A failed order keeps its id and its place at the head of the queue.
    #[test]
    fn failed_orders_keep_their_place(setup in setup()) {
        prop_assume!(!satisfiable(&setup));
        let mut app = build(&setup);
        let head = app.orders.peek_head().unwrap().id;

        app.process_next();

        prop_assert_eq!(app.orders.peek_head().unwrap().id, head);
    }
}
