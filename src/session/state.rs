//! Session state machine.

/// Lifecycle state of a remote connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session; the terminal re-enterable resting state.
    #[default]
    Disconnected,
    /// A connect request is in flight, guarded by the connect watchdog.
    Connecting,
    /// The remote session is established.
    Connected,
}

impl ConnectionState {
    /// Check if the session is established.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Check if a connect request is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }
}

/// Per-session flags tracked alongside the connection state.
///
/// `command_running` and `shell_active` are mutually informative but not
/// mutually exclusive; `shell_toggling` is set by a toggle request and
/// cleared by the confirming shell event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionFlags {
    /// A one-shot command is currently executing.
    pub command_running: bool,
    /// The interactive shell is open.
    pub shell_active: bool,
    /// A shell start/stop request is awaiting its confirming event.
    pub shell_toggling: bool,
    /// A password prompt was detected; the next submission is masked.
    pub mask_next_input: bool,
}

impl SessionFlags {
    /// Clear everything. Used when a connection is (re)established or lost.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
