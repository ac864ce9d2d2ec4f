//! Larder - shared-kitchen inventory with transactional order fulfillment
//!
//! Larder tracks an ingredient catalog, a stock ledger, a recipe book, and a
//! FIFO order queue, and fulfills orders as all-or-nothing transactions: a
//! recipe's requirements are withdrawn one by one, and any shortfall unwinds
//! the already-made withdrawals through an explicit rollback stack before
//! the order is requeued.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, picks a front end)
//! - [`bridge`] - Line-protocol front end for external dashboards
//! - [`ui`] - Interactive terminal menu and output utilities
//! - [`app`] - The application context and cross-registry command rules
//! - [`engine`] - The fulfillment transaction (withdraw, rollback, commit)
//! - [`core`] - Registries, domain types, configuration, and locking
//! - [`store`] - Flat-file persistence for the registries
//!
//! # Correctness Invariants
//!
//! 1. A fulfillment attempt either withdraws every requirement or leaves the
//!    ledger bit-identical to its pre-attempt state
//! 2. Failed orders return to the head of the queue; nothing reorders it
//! 3. Ids are never reused within a registry's lifetime
//! 4. One process mutates a data directory at a time, enforced by an
//!    exclusive lock

pub mod app;
pub mod bridge;
pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;
