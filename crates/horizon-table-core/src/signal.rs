//! Signal/slot system for Horizon Table.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism used by
//! every table model to publish change notifications. Signals are emitted by a
//! model when its state changes, and connected slots (callbacks) are invoked in
//! response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`Subscription`] - RAII handle that disconnects when dropped or disposed
//!
//! # Delivery
//!
//! Emission is synchronous: every connected slot has run by the time
//! [`Signal::emit`] returns. The connection list is snapshotted before
//! dispatch and no lock is held while slots run, so a slot may connect new
//! slots or dispose of subscriptions (its own included) while handling an
//! event. A slot that is disconnected mid-dispatch still sees the in-flight
//! event, but nothing after it.
//!
//! # Example
//!
//! ```
//! use horizon_table_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let subscription = text_changed.subscribe(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Stop delivery
//! subscription.dispose();
//! assert_eq!(text_changed.connection_count(), 0);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connection storage shared between a signal and its subscriptions.
struct ConnectionList<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

/// Type-erased removal used by [`Subscription`], which does not know the
/// argument type of the signal it belongs to.
trait Disconnect: Send + Sync {
    fn remove(&self, id: ConnectionId) -> bool;
    fn contains(&self, id: ConnectionId) -> bool;
}

impl<Args: 'static> Disconnect for ConnectionList<Args> {
    fn remove(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    fn contains(&self, id: ConnectionId) -> bool {
        self.slots.lock().contains_key(id)
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a reference
/// to the provided arguments.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a struct/tuple for richer payloads.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect), used to disconnect
/// - [`Subscription`] - Returned by [`subscribe`](Self::subscribe), disconnects on drop
pub struct Signal<Args> {
    connections: Arc<ConnectionList<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(ConnectionList {
                slots: Mutex::new(SlotMap::with_key()),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// The slot stays connected until [`disconnect`](Self::disconnect) is
    /// called with the returned ID or the signal is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_table_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// assert!(signal.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.slots.lock().insert(Arc::new(slot))
    }

    /// Connect a slot and return a [`Subscription`] that owns the connection.
    ///
    /// Dropping the subscription (or calling [`Subscription::dispose`])
    /// disconnects the slot. Use [`Subscription::detach`] to keep the slot
    /// connected for the lifetime of the signal.
    #[must_use = "dropping the subscription disconnects the slot immediately"]
    pub fn subscribe<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let connections: Arc<dyn Disconnect> = self.connections.clone();
        Subscription {
            connections: Some(Arc::downgrade(&connections)),
            id,
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.remove(id)
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.slots.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.slots.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// If the signal is blocked, this does nothing.
    #[tracing::instrument(skip_all, target = "horizon_table_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// A handle to a connected slot that disconnects it when dropped.
///
/// Returned by [`Signal::subscribe`] and by the `subscribe_*` methods of the
/// table models. Disposing of a subscription stops further delivery and has no
/// other side effect. A subscription that outlives its signal is inert.
///
/// # Example
///
/// ```
/// use horizon_table_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _subscription = signal.subscribe(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43); // Nothing happens - the subscription was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
#[must_use = "dropping the subscription disconnects the slot immediately"]
pub struct Subscription {
    connections: Option<Weak<dyn Disconnect>>,
    id: ConnectionId,
}

impl Subscription {
    /// The connection ID of the subscribed slot.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` while the slot is still connected to a live signal.
    pub fn is_connected(&self) -> bool {
        self.connections
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|connections| connections.contains(self.id))
    }

    /// Disconnect the slot now.
    pub fn dispose(self) {
        drop(self);
    }

    /// Give up ownership of the connection without disconnecting it.
    ///
    /// The slot stays connected until the signal is dropped or
    /// [`Signal::disconnect`] is called with the returned ID.
    pub fn detach(mut self) -> ConnectionId {
        self.connections = None;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.take().and_then(|weak| weak.upgrade()) {
            connections.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id));
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2);
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(i));
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();

        for _ in 0..5 {
            signal.connect(|_| {});
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_subscription_dropped() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let subscription = signal.subscribe(move |&value| {
                received_clone.lock().push(value);
            });
            assert!(subscription.is_connected());
            signal.emit(1);
        }

        signal.emit(2);
        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_subscription_dispose_only_removes_own_slot() {
        let signal = Signal::<i32>::new();
        let first = signal.subscribe(|_| {});
        let second = signal.subscribe(|_| {});

        first.dispose();
        assert_eq!(signal.connection_count(), 1);
        assert!(second.is_connected());
    }

    #[test]
    fn test_subscription_detach() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let id = signal
            .subscribe(move |&value| received_clone.lock().push(value))
            .detach();

        signal.emit(7);
        assert_eq!(*received.lock(), vec![7]);
        assert!(signal.disconnect(id));
    }

    #[test]
    fn test_subscription_outlives_signal() {
        let signal = Signal::<i32>::new();
        let subscription = signal.subscribe(|_| {});
        drop(signal);
        assert!(!subscription.is_connected());
        subscription.dispose();
    }

    #[test]
    fn test_connect_during_emit() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let signal_clone = signal.clone();
        let received_clone = received.clone();
        signal.connect(move |&value| {
            let received_inner = received_clone.clone();
            signal_clone.connect(move |&v| received_inner.lock().push(v * 10));
            received_clone.lock().push(value);
        });

        signal.emit(1);
        // The slot connected during dispatch does not see the in-flight event.
        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_slot_disposes_itself() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let holder: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let received_clone = received.clone();
        let holder_clone = holder.clone();
        let subscription = signal.subscribe(move |&value| {
            received_clone.lock().push(value);
            holder_clone.lock().take();
        });
        *holder.lock() = Some(subscription);

        signal.emit(1);
        signal.emit(2);
        assert_eq!(*received.lock(), vec![1]);
    }
}
