//! Ripple Core
//!
//! This crate provides a fine-grained reactivity engine. It implements:
//!
//! - Observable records (variables, computed values, persisted variables)
//! - Automatic dependency tracking and synchronous effect re-execution
//! - Minimal edit scripts between sequences and child-list reconciliation
//! - Binding adapters that push derived state into external sinks
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Field identities and the subscription graph
//! - `reactive`: Containers, effects and the tracking context
//! - `storage`: Key/value stores and codecs for persisted variables
//! - `diff`: Edit-distance engine and reconciler
//! - `bind`: Binding adapters for render targets and child lists
//!
//! # Example
//!
//! ```rust,ignore
//! use ripple_core::reactive::{Computed, Effect, Variable};
//! use serde_json::json;
//!
//! // Create a variable
//! let cart = Variable::new(&json!({ "items": 2, "price": 5 }))?;
//!
//! // Create a derived value
//! let c = cart.clone();
//! let total = Computed::new(move || {
//!     let items = c.get_as::<i64>("items").ok().flatten().unwrap_or(0);
//!     let price = c.get_as::<i64>("price").ok().flatten().unwrap_or(0);
//!     items * price
//! });
//!
//! // Create an effect
//! let t = total.clone();
//! Effect::new(move || println!("Total: {}", t.get()));
//!
//! // Update the variable
//! cart.set("items", 3);
//! // Effect automatically runs, prints: "Total: 15"
//! ```

pub mod bind;
pub mod diff;
pub mod error;
pub mod graph;
pub mod reactive;
pub mod storage;

#[cfg(feature = "python")]
mod python;

pub use error::{ReactiveError, Result};
