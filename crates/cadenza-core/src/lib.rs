//! Core systems for Cadenza.
//!
//! This crate provides the foundational components of the Cadenza terminal
//! toolkit:
//!
//! - **Signal/Slot System**: Type-safe inter-object communication with
//!   lifetime-scoped disconnection
//! - **Object Model**: Parent-child ownership by value, naming, retained
//!   connections
//! - **Timers**: One-shot and repeating timers polled by the event loop
//!
//! # Signal/Slot Example
//!
//! ```
//! use cadenza_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let volume_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let handle = volume_changed.connect(|value| {
//!     println!("volume is now {}", value);
//! });
//!
//! // Emit the signal
//! volume_changed.emit(80);
//!
//! // Dropping the handle disconnects the slot
//! drop(handle);
//! ```

mod error;
pub mod logging;
pub mod object;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, SignalError, TimerError};
pub use object::{Object, ObjectBase};
pub use signal::{ConnectionHandle, ConnectionId, Signal};
pub use timer::{TimerId, TimerKind, TimerManager};
