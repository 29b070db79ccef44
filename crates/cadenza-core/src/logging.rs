//! Logging facilities for Cadenza.
//!
//! The toolkit is instrumented with the `tracing` crate. A terminal
//! application cannot log to stdout while it owns the screen, so the binary
//! installs a subscriber writing to a file; the toolkit crates only emit.
//!
//! To see logs from a test or tool, install any subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, e.g.
/// `RUST_LOG=cadenza_core::signal=trace`.
pub mod targets {
    /// Signal emission and connection bookkeeping.
    pub const SIGNAL: &str = "cadenza_core::signal";
    /// Object lifecycle (naming, teardown).
    pub const OBJECT: &str = "cadenza_core::object";
    /// Timer scheduling.
    pub const TIMER: &str = "cadenza_core::timer";
    /// Window geometry, focus and repaint.
    pub const WINDOW: &str = "cadenza_tui::window";
    /// List-view viewport and selection maintenance.
    pub const ITEM_VIEW: &str = "cadenza_tui::item_view";
    /// Event dispatch loop.
    pub const APP: &str = "cadenza::app";
}
