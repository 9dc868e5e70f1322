//! Concurrency shell around the battle engine.
//!
//! The engine in `battle-core` runs one battle at a time, purely. This
//! crate is where batches, threads, cancellation, and observability live:
//!
//! - [`batch`] — fan a batch of battle specs across a worker pool sharing
//!   one plan cache, collecting results in submission order.
//! - [`providers`] — deterministic [`ActionProvider`] implementations:
//!   scripted turns for replay, a greedy single-cast AI for sparring.
//!
//! Logging happens here, via `tracing`; the engine itself only appends to
//! its event log.
//!
//! [`ActionProvider`]: battle_core::ActionProvider

pub mod batch;
pub mod providers;

pub use batch::{BatchError, BatchRunner, BattleSpec};
pub use providers::{GreedyProvider, ScriptedProvider};
