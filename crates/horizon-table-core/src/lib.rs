//! Core systems for Horizon Table.
//!
//! This crate provides the foundational pieces shared by every table model:
//!
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Subscriptions**: RAII handles that stop delivery when dropped
//! - **Errors**: The [`ModelError`] type returned by model operations
//! - **Reentrancy Gate**: Detection of mutations requested mid-dispatch
//! - **Logging**: Tracing targets, span names, and helper macros
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_table_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Subscribe a slot to handle the signal
//! let subscription = value_changed.subscribe(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Stop delivery when done
//! subscription.dispose();
//! ```

mod error;
pub mod logging;
pub mod reentrancy;
pub mod signal;

pub use error::{IndexKind, ModelError, ModelResult};
pub use logging::PerfSpan;
pub use reentrancy::{DispatchGate, DispatchToken};
pub use signal::{ConnectionId, Signal, Subscription};
