//! Object model for Cadenza.
//!
//! Provides the base lifecycle node of the toolkit:
//! - Parent-child ownership with automatic drop cascade
//! - Object naming with change notification
//! - Retained signal connections, severed on destruction
//!
//! # Key Types
//!
//! - [`Object`] - Trait implemented by every lifecycle node
//! - [`ObjectBase`] - Helper struct objects embed to implement [`Object`]
//!
//! # Ownership
//!
//! An object owns its children by value (`Vec<Box<dyn Object>>`). Dropping a
//! parent drops the whole subtree; there is no separate delete step and no
//! back-registration to undo. Each [`ObjectBase`] also owns the
//! [`ConnectionHandle`]s it retained, so every signal connection registered
//! against an object is disconnected when the object goes away — callers
//! never clean up connections manually.
//!
//! # Related Modules
//!
//! - [`crate::signal`] - Connections retained here auto-disconnect on drop

use parking_lot::Mutex;

use crate::signal::{ConnectionHandle, Signal};

/// The base implementation for all lifecycle nodes.
///
/// Objects embed this as a field and delegate [`Object`] to it.
///
/// # Example
///
/// ```
/// use cadenza_core::{Object, ObjectBase};
///
/// struct Player {
///     base: ObjectBase,
/// }
///
/// impl Object for Player {
///     fn object_base(&self) -> &ObjectBase { &self.base }
///     fn object_base_mut(&mut self) -> &mut ObjectBase { &mut self.base }
/// }
/// ```
pub struct ObjectBase {
    /// Human-readable name for debugging and lookup.
    name: Mutex<String>,

    /// Child objects, owned. Dropping the parent drops them.
    children: Vec<Box<dyn Object>>,

    /// Connections registered against this object; dropped (and thereby
    /// disconnected) together with it.
    connections: Mutex<Vec<ConnectionHandle>>,

    /// Signal emitted when the name changes, with the new name.
    pub name_changed: Signal<String>,
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectBase {
    /// Create a new object base with an empty name and no children.
    pub fn new() -> Self {
        Self {
            name: Mutex::new(String::new()),
            children: Vec::new(),
            connections: Mutex::new(Vec::new()),
            name_changed: Signal::new(),
        }
    }

    /// Create a new object base with the given name.
    pub fn with_name(name: impl Into<String>) -> Self {
        let base = Self::new();
        *base.name.lock() = name.into();
        base
    }

    /// Get the object's name.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    /// Set the object's name, notifying `name_changed` on an actual change.
    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        {
            let mut current = self.name.lock();
            if *current == name {
                return;
            }
            *current = name.clone();
        }
        tracing::trace!(target: "cadenza_core::object", name = %name, "renamed object");
        self.name_changed.emit(name);
    }

    /// Append a child object. The child is owned and dropped with the parent.
    pub fn add_child(&mut self, child: Box<dyn Object>) {
        self.children.push(child);
    }

    /// The object's children.
    pub fn children(&self) -> &[Box<dyn Object>] {
        &self.children
    }

    /// Mutable access to the children list.
    pub fn children_mut(&mut self) -> &mut Vec<Box<dyn Object>> {
        &mut self.children
    }

    /// Remove and return the child at `index`, or `None` if out of range.
    ///
    /// This is the only way a child leaves its parent alive; dropping the
    /// returned box destroys the child's subtree and its connections.
    pub fn take_child(&mut self, index: usize) -> Option<Box<dyn Object>> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Retain a connection handle for the lifetime of this object.
    ///
    /// The connection is disconnected when this object is dropped. This is
    /// the auto-disconnect contract: connect, retain, forget.
    pub fn retain_connection(&self, handle: ConnectionHandle) {
        self.connections.lock().push(handle);
    }

    /// Connect `slot` to `signal`, scoped to this object's lifetime.
    ///
    /// Shorthand for `connect` plus [`retain_connection`]: the slot fires
    /// until this object is dropped.
    ///
    /// [`retain_connection`]: Self::retain_connection
    pub fn connect_owned<Args, F>(&self, signal: &Signal<Args>, slot: F)
    where
        Args: 'static,
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.retain_connection(signal.connect(slot));
    }

    /// Number of connections currently retained by this object alone
    /// (children not included).
    pub fn retained_connection_count(&self) -> usize {
        self.connections.lock().len()
    }
}

/// Trait implemented by every lifecycle node in the toolkit.
///
/// Destruction is `Drop`: dropping an object drops its children recursively
/// and severs every retained signal connection in the subtree.
pub trait Object: Send {
    /// Access the embedded [`ObjectBase`].
    fn object_base(&self) -> &ObjectBase;

    /// Mutable access to the embedded [`ObjectBase`].
    fn object_base_mut(&mut self) -> &mut ObjectBase;

    /// The object's name.
    fn name(&self) -> String {
        self.object_base().name()
    }

    /// Set the object's name, notifying `name_changed` on change.
    fn set_name(&self, name: &str) {
        self.object_base().set_name(name);
    }
}

impl Object for ObjectBase {
    fn object_base(&self) -> &ObjectBase {
        self
    }

    fn object_base_mut(&mut self) -> &mut ObjectBase {
        self
    }
}
