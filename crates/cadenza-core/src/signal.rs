//! Signal/slot system for Cadenza.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism for
//! inter-widget communication. Signals are emitted by widgets when their
//! state changes, and connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Identifier for a connection within one signal
//! - [`ConnectionHandle`] - Detached handle supporting disconnect/block/query
//!
//! # Lifetime-scoped disconnection
//!
//! [`Signal::connect`] returns a [`ConnectionHandle`]. Dropping the handle
//! severs the connection, so an owner that stores its handles (see
//! [`crate::ObjectBase::retain_connection`]) disconnects everything it
//! subscribed to when it is itself dropped. Callers never disconnect
//! manually on teardown.
//!
//! # Example
//!
//! ```
//! use cadenza_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let handle = text_changed.connect(|text| {
//!     println!("text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello".to_string());
//! assert!(handle.is_connected());
//! drop(handle); // disconnects
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection within one signal.
    ///
    /// Returned alongside a [`ConnectionHandle`]; remains valid until the
    /// connection is disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Serial numbers identify connections process-wide for logging and
/// debugging. They increase monotonically and are never reused.
static NEXT_SERIAL: AtomicU32 = AtomicU32::new(1);

fn next_serial() -> u32 {
    let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
    // 2^32 connections over a process lifetime means something is leaking
    // subscriptions in a loop; wrapping silently would alias live handles.
    assert!(serial != u32::MAX, "connection serial space exhausted");
    serial
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
    /// Process-wide serial, for trace output.
    serial: u32,
    /// Whether this particular connection is suppressed.
    blocked: bool,
}

/// The shared connection table of one signal.
///
/// Handles hold a weak reference to this so they can disconnect or block
/// their connection after the signal owner has moved elsewhere.
struct ConnectionTable<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
}

/// Type-erased view of a connection table, so [`ConnectionHandle`] does not
/// carry the signal's argument type.
trait AnyConnectionTable: Send + Sync {
    fn disconnect(&self, id: ConnectionId) -> bool;
    fn set_connection_blocked(&self, id: ConnectionId, blocked: bool) -> bool;
    fn is_connected(&self, id: ConnectionId) -> bool;
    fn is_connection_blocked(&self, id: ConnectionId) -> bool;
}

impl<Args: 'static> AnyConnectionTable for ConnectionTable<Args> {
    fn disconnect(&self, id: ConnectionId) -> bool {
        match self.connections.lock().remove(id) {
            Some(conn) => {
                tracing::trace!(target: "cadenza_core::signal", serial = conn.serial, "disconnected");
                true
            }
            None => false,
        }
    }

    fn set_connection_blocked(&self, id: ConnectionId, blocked: bool) -> bool {
        match self.connections.lock().get_mut(id) {
            Some(conn) => {
                conn.blocked = blocked;
                true
            }
            None => false,
        }
    }

    fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }

    fn is_connection_blocked(&self, id: ConnectionId) -> bool {
        self.connections
            .lock()
            .get(id)
            .is_some_and(|conn| conn.blocked)
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected, unblocked slots are invoked with
/// the provided arguments, in connection order.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple for multiple arguments.
pub struct Signal<Args> {
    /// All active connections, shared with detached handles.
    table: Arc<ConnectionTable<Args>>,
    /// Whether emission of the whole signal is temporarily suppressed.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            table: Arc::new(ConnectionTable {
                connections: Mutex::new(SlotMap::with_key()),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a [`ConnectionHandle`]. Dropping the handle disconnects the
    /// slot; call [`ConnectionHandle::detach`] for a connection that should
    /// live as long as the signal.
    pub fn connect<F>(&self, slot: F) -> ConnectionHandle
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let serial = next_serial();
        let connection = Connection {
            slot: Arc::new(slot),
            serial,
            blocked: false,
        };
        let id = self.table.connections.lock().insert(connection);
        tracing::trace!(target: "cadenza_core::signal", serial, "connected");
        ConnectionHandle {
            table: Arc::downgrade(&(self.table.clone() as Arc<dyn AnyConnectionTable>)),
            id,
            serial,
            owns: true,
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        AnyConnectionTable::disconnect(&*self.table, id)
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.table.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.table.connections.lock().len()
    }

    /// Block or unblock emission of the whole signal.
    ///
    /// While blocked, calls to `emit()` do nothing. Useful during batch
    /// updates to suppress cascading notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected, unblocked slots.
    ///
    /// Slots run synchronously in connection order. The connection table is
    /// not held locked during invocation, so a slot may connect or
    /// disconnect; changes take effect on the next emit.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "cadenza_core::signal", "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.table.connections.lock();
            connections
                .iter()
                .filter(|(_, conn)| !conn.blocked)
                .map(|(_, conn)| conn.slot.clone())
                .collect()
        };

        tracing::trace!(target: "cadenza_core::signal", slot_count = slots.len(), "emitting signal");
        for slot in slots {
            slot(&args);
        }
    }
}

/// A detached handle to one signal-slot connection.
///
/// The handle keeps working after the signal has been moved into a widget or
/// shared elsewhere; it holds a weak reference, so it never prolongs the
/// signal's life. Once the signal is dropped every query reports the
/// connection as gone.
///
/// Dropping an owning handle disconnects the slot. This is the mechanism
/// behind automatic lifetime-scoped disconnection: owners stash handles (see
/// [`crate::ObjectBase::retain_connection`]) and teardown does the rest.
pub struct ConnectionHandle {
    table: Weak<dyn AnyConnectionTable>,
    id: ConnectionId,
    serial: u32,
    /// Whether dropping this handle severs the connection.
    owns: bool,
}

impl ConnectionHandle {
    /// The process-wide serial number of this connection.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Disconnect the slot now.
    ///
    /// Returns `true` if the connection was still alive. Idempotent.
    pub fn disconnect(&self) -> bool {
        match self.table.upgrade() {
            Some(table) => table.disconnect(self.id),
            None => false,
        }
    }

    /// Suppress invocation of this slot until [`unblock`](Self::unblock).
    ///
    /// Returns `false` if the connection is gone.
    pub fn block(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.set_connection_blocked(self.id, true))
    }

    /// Re-enable invocation of this slot.
    ///
    /// Returns `false` if the connection is gone.
    pub fn unblock(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.set_connection_blocked(self.id, false))
    }

    /// Whether the connection is still established.
    pub fn is_connected(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.is_connected(self.id))
    }

    /// Whether this particular connection is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.is_connection_blocked(self.id))
    }

    /// Consume the handle without disconnecting.
    ///
    /// The connection then lives as long as the signal itself.
    pub fn detach(mut self) {
        self.owns = false;
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if self.owns {
            self.disconnect();
        }
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("serial", &self.serial)
            .field("connected", &self.is_connected())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let _handle = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_handle_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let handle = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(handle.is_connected());
        assert!(handle.disconnect());
        assert!(!handle.is_connected());
        assert!(!handle.disconnect()); // idempotent
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_drop_disconnects() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _handle = signal.connect(move |&value| {
                received_clone.lock().push(value);
            });
            signal.emit(1);
        } // handle dropped, connection severed

        signal.emit(2);
        assert_eq!(*received.lock(), vec![1]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_detach_keeps_connection() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal
            .connect(move |&value| {
                received_clone.lock().push(value);
            })
            .detach();

        signal.emit(7);
        assert_eq!(*received.lock(), vec![7]);
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_handle_block_unblock() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let handle = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(handle.block());
        assert!(handle.is_blocked());
        signal.emit(2); // suppressed for this connection only
        assert!(handle.unblock());
        assert!(!handle.is_blocked());
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let _handle = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2); // ignored
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_multiple_connections() {
        let signal = Signal::<String>::new();
        let count = Arc::new(Mutex::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let count_clone = count.clone();
            handles.push(signal.connect(move |_| {
                *count_clone.lock() += 1;
            }));
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit("test".to_string());
        assert_eq!(*count.lock(), 3);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();

        let mut handles = Vec::new();
        for _ in 0..5 {
            handles.push(signal.connect(|_| {}));
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
        for handle in &handles {
            assert!(!handle.is_connected());
        }
    }

    #[test]
    fn test_handle_outlives_signal() {
        let signal = Signal::<()>::new();
        let handle = signal.connect(|_| {});
        assert!(handle.is_connected());

        drop(signal);
        assert!(!handle.is_connected());
        assert!(!handle.is_blocked());
        assert!(!handle.block());
        assert!(!handle.disconnect());
    }

    #[test]
    fn test_serials_increase() {
        let signal = Signal::<()>::new();
        let a = signal.connect(|_| {});
        let b = signal.connect(|_| {});
        assert!(b.serial() > a.serial());
    }

    #[test]
    fn test_slot_may_connect_during_emit() {
        let signal = Arc::new(Signal::<i32>::new());
        let late = Arc::new(Mutex::new(Vec::new()));

        let signal_clone = signal.clone();
        let late_clone = late.clone();
        let _handle = signal.connect(move |_| {
            let late_inner = late_clone.clone();
            signal_clone
                .connect(move |&v| late_inner.lock().push(v))
                .detach();
        });

        signal.emit(1); // adds a second connection; must not deadlock
        signal.emit(2);
        // The connection added during the first emit sees only the second.
        assert_eq!(*late.lock(), vec![2]);
    }
}
