//! Transport event and command contracts.
//!
//! The engine never talks to a socket itself. It consumes [`ServerEvent`]s
//! delivered by some message-based transport and emits [`ClientCommand`]s
//! back to it. Both sides are plain serde types so any transport (websocket,
//! IPC, test harness) can carry them as tagged JSON.

use serde::{Deserialize, Serialize};

/// Lifecycle tag on a command-output event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandState {
    /// The remote side accepted the command and started it.
    Started,
    /// Writing stdin to the running command failed.
    InputError,
    /// A chunk of live output; no lifecycle change.
    Stream,
    /// The command completed (successfully or not).
    Finished,
}

/// Inbound event produced by the remote side.
///
/// Events for a given channel must be delivered in the order the remote side
/// produced them; the sanitizers' cross-chunk state depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Outcome of a connect attempt.
    ConnectionResult {
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Output or lifecycle change of a one-shot command.
    CommandOutput {
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<CommandState>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_output: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The transport-level session ended.
    Disconnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A chunk of interactive-shell output.
    ShellOutput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        #[serde(default, rename = "isError")]
        is_error: bool,
    },
    /// Interactive-shell lifecycle change.
    ShellEvent {
        ok: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        active: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Outbound command sent to the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Open a new remote session.
    Connect {
        host: String,
        port: u16,
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    /// Close the session (or cancel a pending connect).
    Disconnect,
    /// Run a one-shot command.
    RunCommand { command: String },
    /// Stdin for the currently running one-shot command.
    CommandInput { data: String },
    /// Start the interactive shell.
    ShellStart,
    /// Stop the interactive shell.
    ShellStop,
    /// Input for the interactive shell, sent verbatim.
    ShellInput { data: String },
}
