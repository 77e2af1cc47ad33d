//! Signal/slot system for Lattice Grid.
//!
//! Signals are emitted by the grid when its state changes, and connected slots
//! (callbacks) are invoked in response. All invocation is direct: `emit` calls
//! every connected slot on the current thread and returns once they have all
//! finished. There is no event loop and no deferred delivery.
//!
//! # Key Types
//!
//! - [`Signal<Args>`]: a notification with typed arguments
//! - [`ConnectionId`]: handle for one connected slot
//! - [`ConnectionGuard`]: scoped connection, removed on drop
//!
//! # Example
//!
//! ```
//! use lattice_grid_core::Signal;
//!
//! let term_changed = Signal::<String>::new();
//!
//! let conn_id = term_changed.connect(|term| {
//!     println!("Searching for: {}", term);
//! });
//!
//! term_changed.emit("ann".to_string());
//! term_changed.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// Identifies one connected slot, for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A notification that any number of slots can subscribe to.
///
/// Slots receive `&Args`; signals with nothing to report use `()`.
///
/// # Reentrancy
///
/// Slots are collected before any of them runs, so a slot may connect or
/// disconnect on the same signal without deadlocking. Such changes take
/// effect from the next emission.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Creates a signal with no slots.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Subscribes `slot`, returning the id to unsubscribe it with.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Subscribes `slot` for as long as the returned guard lives.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }

    /// Unsubscribes a slot. Returns `false` for an unknown id.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Unsubscribes a slot, reporting an unknown id as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection(id))
        }
    }

    /// Unsubscribes every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of subscribed slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Suppresses emission while `blocked` is set.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot before returning.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// Scoped subscription returned by [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use lattice_grid_core::Signal;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let rows_patched = Signal::<usize>::new();
/// let patched = Arc::new(AtomicUsize::new(0));
///
/// {
///     let patched = patched.clone();
///     let _guard = rows_patched.connect_scoped(move |n| {
///         patched.fetch_add(*n, Ordering::SeqCst);
///     });
///     rows_patched.emit(2);
/// }
///
/// rows_patched.emit(7);
/// assert_eq!(patched.load(Ordering::SeqCst), 2);
/// ```
pub struct ConnectionGuard<'a, Args: 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<'_, Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |v: &T| sink.lock().push(v.clone()));
        seen
    }

    #[test]
    fn test_emit_reaches_every_slot() {
        let layout_changed = Signal::<usize>::new();
        let first = recorder(&layout_changed);
        let second = recorder(&layout_changed);

        layout_changed.emit(4);
        layout_changed.emit(0);

        assert_eq!(*first.lock(), vec![4, 0]);
        assert_eq!(*second.lock(), vec![4, 0]);
    }

    #[test]
    fn test_disconnected_slot_stops_receiving() {
        let search_changed = Signal::<String>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = search_changed.connect(move |term: &String| sink.lock().push(term.clone()));

        search_changed.emit("an".into());
        assert!(search_changed.disconnect(id));
        search_changed.emit("ann".into());

        assert_eq!(*seen.lock(), vec!["an"]);
        assert_eq!(
            search_changed.try_disconnect(id),
            Err(SignalError::InvalidConnection(id))
        );
    }

    #[test]
    fn test_blocked_emission_is_dropped() {
        let rows_patched = Signal::<Vec<u32>>::new();
        let seen = recorder(&rows_patched);

        rows_patched.set_blocked(true);
        assert!(rows_patched.is_blocked());
        rows_patched.emit(vec![1]);
        rows_patched.set_blocked(false);
        rows_patched.emit(vec![2, 3]);

        assert_eq!(*seen.lock(), vec![vec![2, 3]]);
    }

    #[test]
    fn test_disconnect_all() {
        let source_replaced = Signal::<()>::new();
        source_replaced.connect(|_| {});
        source_replaced.connect(|_| {});
        assert_eq!(source_replaced.connection_count(), 2);

        source_replaced.disconnect_all();
        assert_eq!(source_replaced.connection_count(), 0);
    }

    #[test]
    fn test_slot_may_connect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let inner = signal.clone();
        signal.connect(move |_| {
            inner.connect(|_| {});
        });

        signal.emit(());
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_scoped_connection() {
        let signal = Signal::<usize>::new();
        let total = Arc::new(Mutex::new(0));

        {
            let total = total.clone();
            let _guard = signal.connect_scoped(move |n| *total.lock() += n);
            assert_eq!(signal.connection_count(), 1);
            signal.emit(3);
        }

        signal.emit(4);
        assert_eq!(*total.lock(), 3);
        assert_eq!(signal.connection_count(), 0);
    }
}
