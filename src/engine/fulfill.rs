//! engine::fulfill
//!
//! The order-fulfillment transaction engine.
//!
//! # State machine
//!
//! One call to [`process_next`] runs one attempt against the head order:
//!
//! ```text
//! Start ──(no head order)──────────────▶ EmptyQueue
//!   │
//!   ├──(recipe lookup fails)───────────▶ Discarded   (order dropped, no stock effect)
//!   │
//!   ▼
//! Withdrawing ──(all requirements ok)──▶ Success     (withdrawals stand, undo log dropped)
//!   │
//!   └──(a withdrawal fails)──▶ RollingBack ──▶ Failed (ledger restored, order requeued at head)
//! ```
//!
//! The withdrawing phase iterates the recipe's requirement list in its
//! stored order, recording each successful withdrawal on a
//! [`RollbackStack`]. On failure the stack is unwound LIFO, which returns
//! the ledger to its exact pre-attempt state, and the order goes back to the
//! head of the queue for a future retry. The reported available quantity is
//! read *after* rollback completes, so it reflects true current stock.
//!
//! # Invariants
//!
//! - A `Failed` attempt leaves every ledger quantity exactly as it was
//!   (verifiable via the attempt's before/after fingerprints)
//! - A `Success` attempt changes exactly the required quantities
//! - The queue is reordered by nothing: `Failed` restores the head,
//!   `Success` and `Discarded` remove exactly the head
//!
//! # Edge cases
//!
//! - A recipe with zero requirements commits immediately with an empty log
//!   (enqueueing such an order is rejected upstream; reaching one here is
//!   not an error).
//! - A requirement with quantity `<= 0` indicates a data error; the
//!   withdrawal is rejected by the ledger, so the attempt fails hard rather
//!   than silently skipping the line.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::rollback::{OpKind, RollbackStack, StockOp};
use crate::core::catalog::IngredientCatalog;
use crate::core::orders::OrderQueue;
use crate::core::recipes::RecipeBook;
use crate::core::stock::StockLedger;
use crate::core::types::{Fingerprint, IngredientId, OrderId, RecipeId};

/// Terminal outcome of one fulfillment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every requirement was withdrawn; the order is complete and removed.
    Success {
        order: OrderId,
        recipe: RecipeId,
        /// All entries are [`OpKind::Withdraw`].
        log: Vec<StockOp>,
    },

    /// A requirement could not be satisfied; the ledger was rolled back and
    /// the order re-inserted at the head of the queue.
    Failed {
        order: OrderId,
        recipe: RecipeId,
        /// The ingredient whose withdrawal failed.
        ingredient: IngredientId,
        /// Its catalog name, if it is still cataloged.
        name: Option<String>,
        /// Quantity the recipe required.
        needed: f64,
        /// Quantity actually in stock, read after rollback completed.
        available: f64,
        /// Withdrawals in execution order, then restores in rollback order.
        log: Vec<StockOp>,
    },

    /// The order's recipe no longer exists; the order was dropped
    /// permanently with no stock effect. A distinct non-error outcome.
    Discarded { order: OrderId, recipe: RecipeId },

    /// There was no head order to process; no attempt took place.
    EmptyQueue,
}

impl Outcome {
    /// The operation log, when the outcome carries one.
    pub fn log(&self) -> &[StockOp] {
        match self {
            Outcome::Success { log, .. } | Outcome::Failed { log, .. } => log,
            Outcome::Discarded { .. } | Outcome::EmptyQueue => &[],
        }
    }
}

/// Report of one fulfillment attempt.
///
/// Besides the outcome, each attempt carries an op id, its start time, and
/// ledger fingerprints taken before and after, so rollback can be audited
/// after the fact.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub op_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub fingerprint_before: Fingerprint,
    pub fingerprint_after: Fingerprint,
    pub outcome: Outcome,
}

impl Attempt {
    /// Whether the ledger was left bit-identical on a non-mutating outcome.
    ///
    /// `Failed`, `Discarded`, and `EmptyQueue` must not change the ledger;
    /// for `Success` this is trivially true.
    pub fn ledger_consistent(&self) -> bool {
        match self.outcome {
            Outcome::Success { .. } => true,
            _ => self.fingerprint_before == self.fingerprint_after,
        }
    }
}

/// Run one fulfillment attempt against the head of the order queue.
///
/// The caller provides the registries separately so the engine can borrow
/// the catalog and recipe book immutably while mutating the ledger and
/// queue.
pub fn process_next(
    catalog: &IngredientCatalog,
    recipes: &RecipeBook,
    stock: &mut StockLedger,
    orders: &mut OrderQueue,
) -> Attempt {
    let op_id = Uuid::new_v4();
    let started_at = Utc::now();
    let fingerprint_before = stock.fingerprint();

    // Start: pop the head order.
    let Some(order) = orders.pop_head() else {
        return Attempt {
            op_id,
            started_at,
            fingerprint_after: fingerprint_before.clone(),
            fingerprint_before,
            outcome: Outcome::EmptyQueue,
        };
    };

    // Weak back-reference: the recipe may have been deleted out from under
    // the order. Discard lazily, exactly here.
    let Some(recipe) = recipes.find(order.recipe) else {
        return Attempt {
            op_id,
            started_at,
            fingerprint_after: fingerprint_before.clone(),
            fingerprint_before,
            outcome: Outcome::Discarded {
                order: order.id,
                recipe: order.recipe,
            },
        };
    };

    // Withdrawing: all-or-nothing across the requirement list.
    let mut rollback = RollbackStack::new();
    let mut log = Vec::with_capacity(recipe.requirements.len());
    let mut shortfall: Option<(IngredientId, f64)> = None;

    for req in &recipe.requirements {
        if stock.withdraw(req.ingredient, req.quantity) {
            rollback.record(req.ingredient, req.quantity);
            log.push(StockOp {
                ingredient: req.ingredient,
                quantity: req.quantity,
                kind: OpKind::Withdraw,
            });
        } else {
            shortfall = Some((req.ingredient, req.quantity));
            break;
        }
    }

    match shortfall {
        None => {
            // Committed: the undo log is dropped, never replayed.
            drop(rollback);
            Attempt {
                op_id,
                started_at,
                fingerprint_before,
                fingerprint_after: stock.fingerprint(),
                outcome: Outcome::Success {
                    order: order.id,
                    recipe: recipe.id,
                    log,
                },
            }
        }
        Some((ingredient, needed)) => {
            // RollingBack: LIFO replay of exactly the recorded withdrawals.
            rollback.unwind(stock, &mut log);

            let available = stock.quantity(ingredient).unwrap_or(0.0);
            let name = catalog.name_of(ingredient).map(str::to_string);
            let fingerprint_after = stock.fingerprint();

            let order_id = order.id;
            let recipe_id = order.recipe;
            orders.requeue_head(order);

            Attempt {
                op_id,
                started_at,
                fingerprint_before,
                fingerprint_after,
                outcome: Outcome::Failed {
                    order: order_id,
                    recipe: recipe_id,
                    ingredient,
                    name,
                    needed,
                    available,
                    log,
                },
            }
        }
    }
}
