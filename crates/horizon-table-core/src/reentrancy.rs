//! Reentrancy verification for model mutations.
//!
//! Table models deliver their change notifications synchronously, so a slot
//! connected to a model can call back into that same model while the model is
//! still in the middle of a mutation. Some layers tolerate this and some do
//! not. A [`DispatchGate`] lets a layer mark the window during which it is
//! applying a mutation and delivering its events, and reject nested mutations
//! inside that window with [`ModelError::Reentrant`].
//!
//! # Usage
//!
//! ```
//! use horizon_table_core::{DispatchGate, ModelError, ModelResult};
//!
//! struct Counter {
//!     gate: DispatchGate,
//! }
//!
//! impl Counter {
//!     fn increment(&self) -> ModelResult<()> {
//!         let _dispatch = self.gate.enter("increment")?;
//!         // ... mutate state and emit events ...
//!         Ok(())
//!     }
//! }
//!
//! let counter = Counter { gate: DispatchGate::new() };
//! assert!(counter.increment().is_ok());
//!
//! let _held = counter.gate.enter("outer").unwrap();
//! assert_eq!(counter.increment(), Err(ModelError::Reentrant("increment")));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ModelError, ModelResult};
use crate::logging::targets;

/// Tracks whether a model is currently applying a mutation.
///
/// The gate is open by default. [`enter`](Self::enter) closes it and returns
/// a [`DispatchToken`]; the gate reopens when the token is dropped.
#[derive(Debug, Default)]
pub struct DispatchGate {
    active: AtomicBool,
}

impl DispatchGate {
    /// Create an open gate.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Close the gate for the duration of `operation`.
    ///
    /// Fails with [`ModelError::Reentrant`] naming `operation` if the gate is
    /// already closed. Nothing is changed in that case.
    pub fn enter(&self, operation: &'static str) -> ModelResult<DispatchToken<'_>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(
                target: targets::REENTRANCY,
                operation,
                "rejected reentrant mutation"
            );
            return Err(ModelError::Reentrant(operation));
        }
        Ok(DispatchToken { gate: self })
    }

    /// Returns `true` while a token from this gate is alive.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// RAII token proving its holder owns the dispatch window of a
/// [`DispatchGate`]. Dropping it reopens the gate.
#[derive(Debug)]
#[must_use = "the gate reopens as soon as the token is dropped"]
pub struct DispatchToken<'a> {
    gate: &'a DispatchGate,
}

impl Drop for DispatchToken<'_> {
    fn drop(&mut self) {
        self.gate.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_open_by_default() {
        let gate = DispatchGate::new();
        assert!(!gate.is_active());
    }

    #[test]
    fn test_gate_rejects_nested_entry() {
        let gate = DispatchGate::new();
        let token = gate.enter("outer").unwrap();
        assert!(gate.is_active());
        assert_eq!(gate.enter("inner").unwrap_err(), ModelError::Reentrant("inner"));
        drop(token);
        assert!(!gate.is_active());
    }

    #[test]
    fn test_gate_reopens_after_error_path() {
        fn failing(gate: &DispatchGate) -> ModelResult<()> {
            let _token = gate.enter("failing")?;
            Err(ModelError::invalid_argument("boom"))
        }

        let gate = DispatchGate::new();
        assert!(failing(&gate).is_err());
        assert!(gate.enter("again").is_ok());
    }

    #[test]
    fn test_gate_default() {
        let gate = DispatchGate::default();
        assert!(gate.enter("first").is_ok());
    }
}
