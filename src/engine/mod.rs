//! engine
//!
//! The order-fulfillment transaction engine.
//!
//! # Architecture
//!
//! One attempt processes the head order as a single all-or-nothing
//! operation against the stock ledger:
//!
//! 1. **Start**: pop the head order; resolve its weak recipe reference
//! 2. **Withdrawing**: withdraw each requirement in list order, recording
//!    every success on an explicit rollback stack
//! 3. **RollingBack** (on shortfall): unwind the stack LIFO, restoring the
//!    ledger exactly, and requeue the order at the head
//! 4. **Committed** (all succeeded): drop the stack; the withdrawals stand
//!
//! There is no snapshotting: atomicity comes entirely from the undo log.
//! The engine mutates nothing besides the ledger and the queue, and always
//! runs to a terminal outcome; the single-writer contract (one command at a
//! time, enforced across processes by [`crate::core::lock::DataLock`])
//! guarantees no interleaved mutation during an attempt.

pub mod fulfill;
pub mod rollback;

// Re-exports for convenience
pub use fulfill::{process_next, Attempt, Outcome};
pub use rollback::{OpKind, RollbackStack, StockOp};
