//! Reactive Runtime
//!
//! The runtime is the per-thread coordinator behind containers and effects.
//! It holds the configuration and the nested-update counter, and exposes a
//! read-only view of the tracking context.
//!
//! # How It Works
//!
//! 1. When a container field is read inside an effect, the current
//!    computation (top of the context stack) is subscribed to that field.
//!
//! 2. When a field is written, every subscriber re-runs synchronously,
//!    depth first: cascading writes inside a subscriber finish before the
//!    next subscriber starts.
//!
//! 3. Each computation counts how many of its own runs are on the stack.
//!    A write that keeps re-triggering its own effect would otherwise
//!    recurse until the stack overflows; once one computation is nested
//!    inside itself `max_update_depth` times the runtime panics with
//!    [`UpdateDepthExceeded`](crate::ReactiveError::UpdateDepthExceeded)
//!    instead. Long acyclic chains nest many different computations and
//!    are never stopped.
//!
//! 4. The update depth reported by [`Runtime::update_depth`] counts nested
//!    notifications of any field. It is a diagnostic only.
//!
//! # Thread Safety
//!
//! Configuration, the update counter and the context stack are all
//! thread-local. Containers may be shared across threads, but reads are only
//! attributed to effects running on the reading thread.

use std::cell::Cell;

use serde::Deserialize;

use super::computation::ComputationId;
use super::context::ReactiveContext;
use crate::error::Result;

/// Runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How many times a single computation may be re-run from inside its
    /// own run before the runtime gives up on a probable cycle.
    pub max_update_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_update_depth: 100,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

thread_local! {
    static CONFIG: Cell<RuntimeConfig> = Cell::new(RuntimeConfig::default());
    static UPDATE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// The reactive runtime of the current thread.
pub struct Runtime;

impl Runtime {
    /// Install `config` for the current thread.
    pub fn configure(config: RuntimeConfig) {
        CONFIG.with(|cell| cell.set(config));
    }

    /// The configuration in effect on the current thread.
    pub fn config() -> RuntimeConfig {
        CONFIG.with(Cell::get)
    }

    /// Get the computation currently being tracked, if any.
    pub fn current_computation() -> Option<ComputationId> {
        ReactiveContext::current_id()
    }

    /// Check if reads are currently being tracked.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }

    /// Number of computations currently running on this thread.
    pub fn context_depth() -> usize {
        ReactiveContext::depth()
    }

    /// Number of notifications currently nested on this thread.
    pub fn update_depth() -> usize {
        UPDATE_DEPTH.with(Cell::get)
    }
}

/// Guard counting one level of nested notification.
pub(crate) struct UpdateDepth;

impl UpdateDepth {
    pub(crate) fn enter() -> Self {
        UPDATE_DEPTH.with(|cell| cell.set(cell.get() + 1));
        Self
    }
}

impl Drop for UpdateDepth {
    fn drop(&mut self) {
        UPDATE_DEPTH.with(|cell| cell.set(cell.get().saturating_sub(1)));
    }
}
