//! Reactive Primitives
//!
//! This module implements the reactive containers and the effects that
//! observe them.
//!
//! # Concepts
//!
//! ## Variables
//!
//! A [`Variable`] is an observable record: a map from field keys to JSON
//! values. Reading a field inside an effect subscribes that effect to the
//! field; writing a field re-runs every subscriber, even if the value did
//! not change.
//!
//! ## Computed Values
//!
//! A [`Computed`] is a read-only container whose single `value` field holds
//! the latest result of a function. It recomputes eagerly whenever anything
//! it read is written.
//!
//! ## Persisted Variables
//!
//! A [`PersistedVariable`] mirrors its record into a key/value
//! [`Store`](crate::storage::Store) and follows changes made to that key by
//! other contexts.
//!
//! ## Effects
//!
//! An [`Effect`] is a side-effecting function that re-runs whenever one of
//! the fields it read is written. Before each re-run (and on disposal) the
//! cleanup returned by the previous run is called, and the effect's
//! dependencies are dropped and rediscovered from scratch.
//!
//! # Implementation Notes
//!
//! Dependency tracking uses a thread-local stack of running computations.
//! A field read registers the top of the stack as a subscriber; nested
//! effects push on top of it and pop on exit. [`untracked`] hides the stack
//! for the duration of a closure.
//!
//! Updates are synchronous: a write returns only after every affected
//! effect, and everything those effects wrote in turn, has re-run.

pub(crate) mod computation;
pub(crate) mod context;
pub(crate) mod runtime;
mod computed;
mod effect;
mod persisted;
mod record;
mod variable;

pub use computation::{Cleanup, ComputationId};
pub use computed::{Computed, VALUE_FIELD};
pub use context::untracked;
pub use effect::Effect;
pub use persisted::PersistedVariable;
pub use record::Record;
pub use runtime::{Runtime, RuntimeConfig};
pub use variable::{create_ref, Variable};
