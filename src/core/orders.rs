//! core::orders
//!
//! The FIFO queue of pending production orders.
//!
//! An order holds a [`RecipeId`] as a weak back-reference: the queue does not
//! own the recipe, and the reference is only dereferenced (by lookup) at
//! processing time. An order whose recipe has been deleted is not proactively
//! purged; the fulfillment engine discards it lazily the first time it
//! reaches the head of the queue.
//!
//! # Ordering invariants
//!
//! - Enqueue order equals id assignment order equals (absent early removal)
//!   processing order.
//! - Removing an arbitrary order preserves the relative order of the rest.
//! - A failed fulfillment attempt re-inserts the order at the head, so the
//!   queue is unchanged by the attempt.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::types::{OrderId, RecipeId};

/// A queued request to fulfill one recipe instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Weak back-reference; resolve via the recipe book and tolerate
    /// "not found".
    pub recipe: RecipeId,
}

/// FIFO queue of pending orders with queue-scoped, strictly increasing ids.
#[derive(Debug, Clone)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
    next_id: u32,
}

impl Default for OrderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderQueue {
    /// Create an empty queue. The first order id is 1.
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Append an order for a recipe at the tail and return its id.
    ///
    /// Ids are never reclaimed, even after the order completes, so a
    /// reported id stays unambiguous for the queue's lifetime.
    pub fn enqueue(&mut self, recipe: RecipeId) -> OrderId {
        let id = OrderId::new(self.next_id);
        self.next_id += 1;
        self.orders.push_back(Order { id, recipe });
        id
    }

    /// Remove and return the head order.
    pub fn pop_head(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Re-insert an order at the head (failed attempt keeps its place).
    pub fn requeue_head(&mut self, order: Order) {
        self.orders.push_front(order);
    }

    /// The head order, if any, without removing it.
    pub fn peek_head(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Remove an arbitrary order by id (manual cancellation), preserving the
    /// relative order of the rest. Returns `false` if the id is not queued.
    pub fn remove(&mut self, id: OrderId) -> bool {
        match self.orders.iter().position(|order| order.id == id) {
            Some(idx) => {
                self.orders.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether any pending order references the recipe (referential scan for
    /// recipe deletion checks).
    pub fn references(&self, recipe: RecipeId) -> bool {
        self.orders.iter().any(|order| order.recipe == recipe)
    }

    /// Iterate the pending orders from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(raw: u32) -> RecipeId {
        RecipeId::new(raw)
    }

    #[test]
    fn enqueue_assigns_increasing_ids_in_fifo_order() {
        let mut queue = OrderQueue::new();
        let a = queue.enqueue(rec(1));
        let b = queue.enqueue(rec(2));
        let c = queue.enqueue(rec(1));
        assert_eq!(
            (a.as_u32(), b.as_u32(), c.as_u32()),
            (1, 2, 3)
        );

        assert_eq!(queue.pop_head().unwrap().id, a);
        assert_eq!(queue.pop_head().unwrap().id, b);
        assert_eq!(queue.pop_head().unwrap().id, c);
        assert!(queue.pop_head().is_none());
    }

    #[test]
    fn ids_are_not_reclaimed_after_processing() {
        let mut queue = OrderQueue::new();
        queue.enqueue(rec(1));
        queue.pop_head();
        assert_eq!(queue.enqueue(rec(1)).as_u32(), 2);
    }

    #[test]
    fn remove_preserves_relative_order_of_the_rest() {
        let mut queue = OrderQueue::new();
        let a = queue.enqueue(rec(1));
        let b = queue.enqueue(rec(2));
        let c = queue.enqueue(rec(3));

        assert!(queue.remove(b));
        assert!(!queue.remove(b));

        let remaining: Vec<OrderId> = queue.iter().map(|order| order.id).collect();
        assert_eq!(remaining, vec![a, c]);
    }

    #[test]
    fn requeue_head_restores_the_popped_order() {
        let mut queue = OrderQueue::new();
        let a = queue.enqueue(rec(1));
        let b = queue.enqueue(rec(2));

        let popped = queue.pop_head().unwrap();
        queue.requeue_head(popped);

        let order: Vec<OrderId> = queue.iter().map(|order| order.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn references_scans_pending_orders() {
        let mut queue = OrderQueue::new();
        queue.enqueue(rec(1));
        assert!(queue.references(rec(1)));
        assert!(!queue.references(rec(2)));

        queue.pop_head();
        assert!(!queue.references(rec(1)));
    }
}
