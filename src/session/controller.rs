//! Session controller: the per-connection state machine.
//!
//! One [`SessionController`] tracks one remote session. Every user action
//! and every inbound [`ServerEvent`] is a synchronous method that mutates
//! the session state, appends to the transcript, and returns the [`Effect`]s
//! the host must perform (commands to send, watchdog timer operations).
//! The controller itself never fails and never blocks.

use std::time::Duration;

use tracing::{debug, warn};

use super::history::CommandHistory;
use super::state::{ConnectionState, SessionFlags};
use super::transcript::{Message, Transcript};
use crate::output::{detect_password_prompt, sanitize_once, StreamSanitizer};
use crate::protocol::{ClientCommand, CommandState, ServerEvent};

/// How long a connect attempt may stay unanswered before it is abandoned.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Shown in the transcript in place of a masked (password) submission.
pub const MASKED_INPUT_PLACEHOLDER: &str = "********";

/// Shown in the transcript when an empty shell line is sent.
pub const EMPTY_INPUT_PLACEHOLDER: &str = "(empty line sent)";

/// Parameters for a connect request. The controller forwards the password
/// to the transport but never retains it.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
}

/// Side effect requested by the controller, to be performed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a command to the transport.
    Send(ClientCommand),
    /// Arm the connect watchdog; fire [`SessionController::handle_connect_timeout`]
    /// with this generation after [`CONNECT_TIMEOUT`].
    StartConnectWatchdog { generation: u64 },
    /// Disarm any pending connect watchdog.
    CancelConnectWatchdog,
}

/// State machine for one remote session.
pub struct SessionController {
    connection: ConnectionState,
    flags: SessionFlags,
    transcript: Transcript,
    history: CommandHistory,
    /// Sanitizer for one-shot command output, stateful across chunks.
    command_channel: StreamSanitizer,
    /// Sanitizer for interactive-shell output, stateful across chunks.
    shell_channel: StreamSanitizer,
    /// Incremented whenever a watchdog is armed or invalidated; a firing
    /// with a stale generation is a no-op.
    watchdog_generation: u64,
}

impl SessionController {
    /// Create a controller in the disconnected state.
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            flags: SessionFlags::default(),
            transcript: Transcript::new(),
            history: CommandHistory::new(),
            command_channel: StreamSanitizer::new(),
            shell_channel: StreamSanitizer::new(),
            watchdog_generation: 0,
        }
    }

    /// Current connection lifecycle state.
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Current session flags.
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// The display transcript.
    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// Request a connection to a remote host.
    ///
    /// Ignored while a connect attempt is already in flight. A missing host
    /// or username is rejected locally and never reaches the transport.
    pub fn connect(&mut self, params: ConnectParams) -> Vec<Effect> {
        if self.connection.is_connecting() {
            debug!("connect request ignored: attempt already in flight");
            return Vec::new();
        }

        let host = params.host.trim();
        let username = params.username.trim();
        if host.is_empty() || username.is_empty() {
            self.transcript.push_server(
                "A host address and username are required to connect.",
                true,
            );
            return Vec::new();
        }

        debug!(host, username, port = params.port, "connecting");
        self.connection = ConnectionState::Connecting;
        self.transcript.push_server(
            format!("Connecting to {username}@{host}:{}...", params.port),
            false,
        );

        self.watchdog_generation += 1;
        vec![
            Effect::Send(ClientCommand::Connect {
                host: host.to_string(),
                port: params.port,
                username: username.to_string(),
                password: params.password,
            }),
            Effect::StartConnectWatchdog {
                generation: self.watchdog_generation,
            },
        ]
    }

    /// The connect watchdog fired.
    ///
    /// A stale generation, or a firing after the state already left
    /// `Connecting`, is a no-op.
    pub fn handle_connect_timeout(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.watchdog_generation || !self.connection.is_connecting() {
            return Vec::new();
        }
        warn!("connect attempt timed out after {CONNECT_TIMEOUT:?}");
        self.connection = ConnectionState::Disconnected;
        self.flags.command_running = false;
        self.transcript
            .push_server("Connection attempt timed out.", true);
        // Cancel the pending attempt on the remote side as well.
        vec![Effect::Send(ClientCommand::Disconnect)]
    }

    /// Request a disconnect.
    ///
    /// Only ever issued by explicit user action or genuine transport-level
    /// session end; the host must not call this merely because a view
    /// unmounted. State transitions follow from the resulting events.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        debug!("disconnect requested");
        self.command_channel.reset();
        self.shell_channel.reset();
        vec![Effect::Send(ClientCommand::Disconnect)]
    }

    /// Submit a line of user input.
    ///
    /// Routed by session state: interactive-shell input while the shell is
    /// active, stdin to the running command while one is executing, or a new
    /// one-shot command otherwise. A submission while disconnected is a
    /// no-op.
    pub fn submit(&mut self, input: &str) -> Vec<Effect> {
        if !self.connection.is_connected() {
            debug!("submission ignored: not connected");
            return Vec::new();
        }

        if self.flags.shell_active {
            return self.submit_shell_input(input);
        }
        if self.flags.command_running {
            return self.submit_command_input(input);
        }
        self.submit_command(input)
    }

    fn submit_command(&mut self, input: &str) -> Vec<Effect> {
        let command = input.trim();
        if command.is_empty() {
            return Vec::new();
        }

        if self.consume_mask() {
            self.transcript.push_user(MASKED_INPUT_PLACEHOLDER);
        } else {
            self.history.push(command);
            self.transcript.push_user(command);
        }
        self.flags.command_running = true;
        debug!(command, "running one-shot command");
        vec![Effect::Send(ClientCommand::RunCommand {
            command: command.to_string(),
        })]
    }

    fn submit_command_input(&mut self, input: &str) -> Vec<Effect> {
        self.transcript.push_user(self.display_for_input(input));
        self.consume_mask();
        vec![Effect::Send(ClientCommand::CommandInput {
            data: format!("{input}\n"),
        })]
    }

    fn submit_shell_input(&mut self, input: &str) -> Vec<Effect> {
        let masked = self.consume_mask();
        if masked {
            self.transcript.push_user(MASKED_INPUT_PLACEHOLDER);
        } else if input.is_empty() {
            self.transcript.push_user(EMPTY_INPUT_PLACEHOLDER);
        } else {
            self.transcript.push_user(input);
            self.history.push(input);
        }
        vec![Effect::Send(ClientCommand::ShellInput {
            data: format!("{input}\n"),
        })]
    }

    fn display_for_input(&self, input: &str) -> String {
        if self.flags.mask_next_input {
            MASKED_INPUT_PLACEHOLDER.to_string()
        } else if input.is_empty() {
            EMPTY_INPUT_PLACEHOLDER.to_string()
        } else {
            input.to_string()
        }
    }

    /// Toggle the interactive shell. Only valid while connected.
    pub fn toggle_shell(&mut self) -> Vec<Effect> {
        if !self.connection.is_connected() {
            return Vec::new();
        }
        self.flags.shell_toggling = true;
        let command = if self.flags.shell_active {
            ClientCommand::ShellStop
        } else {
            ClientCommand::ShellStart
        };
        debug!(?command, "toggling interactive shell");
        vec![Effect::Send(command)]
    }

    /// Process an inbound transport event.
    pub fn handle_event(&mut self, event: ServerEvent) -> Vec<Effect> {
        match event {
            ServerEvent::ConnectionResult { ok, message } => {
                self.on_connection_result(ok, message)
            }
            ServerEvent::CommandOutput {
                ok,
                state,
                output,
                error_output,
                command,
                message,
            } => self.on_command_output(ok, state, output, error_output, command, message),
            ServerEvent::Disconnected { message } => self.on_disconnected(message),
            ServerEvent::ShellOutput { output, is_error } => {
                self.on_shell_output(output, is_error)
            }
            ServerEvent::ShellEvent {
                ok,
                active,
                message,
            } => self.on_shell_event(ok, active, message),
        }
    }

    fn on_connection_result(&mut self, ok: bool, message: Option<String>) -> Vec<Effect> {
        // Either outcome resolves the pending attempt; a watchdog firing
        // later with the old generation is ignored.
        self.watchdog_generation += 1;

        if ok {
            debug!("connection established");
            self.connection = ConnectionState::Connected;
            self.flags.clear();
        } else {
            debug!("connection failed");
            self.connection = ConnectionState::Disconnected;
            self.flags.command_running = false;
            self.flags.mask_next_input = false;
        }
        self.command_channel.reset();
        self.shell_channel.reset();

        if let Some(message) = message {
            let text = sanitize_once(&message);
            if !text.is_empty() {
                self.transcript.push_server(text, !ok);
            }
        }
        vec![Effect::CancelConnectWatchdog]
    }

    fn on_disconnected(&mut self, message: Option<String>) -> Vec<Effect> {
        debug!("session ended by transport");
        self.watchdog_generation += 1;
        self.connection = ConnectionState::Disconnected;
        self.flags.clear();
        self.command_channel.reset();
        self.shell_channel.reset();

        if let Some(message) = message {
            let text = sanitize_once(&message);
            if !text.is_empty() {
                self.transcript.push_server(text, false);
            }
        }
        vec![Effect::CancelConnectWatchdog]
    }

    fn on_command_output(
        &mut self,
        ok: bool,
        state: Option<CommandState>,
        output: Option<String>,
        error_output: Option<String>,
        command: Option<String>,
        message: Option<String>,
    ) -> Vec<Effect> {
        match state {
            Some(CommandState::Started) => {
                debug!("command started");
                self.flags.command_running = true;
                self.flags.mask_next_input = false;
                self.command_channel.reset();
            }
            Some(CommandState::InputError) => {
                debug!("command stdin rejected");
                self.flags.command_running = false;
                self.flags.mask_next_input = false;
            }
            _ => {}
        }

        // Server-side command confirmation: echo it back as user input.
        if state.is_none() {
            if let Some(command) = &command {
                self.transcript.push_user(command.clone());
            }
        }

        if state != Some(CommandState::Stream) {
            if let Some(message) = &message {
                let text = sanitize_once(message);
                if !text.is_empty() {
                    self.scan_for_password_prompt(&text);
                    self.transcript.push_server(text, !ok);
                }
            }
        }

        if let Some(output) = &output {
            let text = self.command_channel.sanitize(output);
            if !text.is_empty() {
                self.scan_for_password_prompt(&text);
                self.transcript.push_server(text, !ok);
            }
        }
        if let Some(error_output) = &error_output {
            let text = self.command_channel.sanitize(error_output);
            if !text.is_empty() {
                self.scan_for_password_prompt(&text);
                self.transcript.push_server(text, true);
            }
        }

        let finished = state == Some(CommandState::Finished)
            || (state.is_none() && message.is_some());
        if finished {
            debug!("command finished");
            self.flags.command_running = false;
            self.flags.mask_next_input = false;
        }
        Vec::new()
    }

    fn on_shell_output(&mut self, output: Option<String>, is_error: bool) -> Vec<Effect> {
        if let Some(output) = &output {
            let text = self.shell_channel.sanitize(output);
            if !text.is_empty() {
                self.scan_for_password_prompt(&text);
                self.transcript.push_server(text, is_error);
            }
        }
        Vec::new()
    }

    fn on_shell_event(
        &mut self,
        ok: bool,
        active: Option<bool>,
        message: Option<String>,
    ) -> Vec<Effect> {
        match active {
            Some(true) => {
                debug!("interactive shell active");
                self.flags.shell_active = true;
                self.shell_channel.reset();
            }
            Some(false) => {
                debug!("interactive shell stopped");
                self.flags.shell_active = false;
                self.flags.mask_next_input = false;
            }
            None if !ok => {
                self.flags.shell_active = false;
                self.flags.mask_next_input = false;
            }
            None => {}
        }
        self.flags.shell_toggling = false;

        if let Some(message) = message {
            let text = sanitize_once(&message);
            if !text.is_empty() {
                self.transcript.push_server(text, !ok);
            }
        }
        Vec::new()
    }

    /// Up-arrow: recall the previous history entry.
    pub fn history_prev(&mut self) -> Option<String> {
        self.history.prev().map(str::to_string)
    }

    /// Down-arrow: recall the next history entry; `None` clears the input.
    pub fn history_next(&mut self) -> Option<String> {
        self.history.next().map(str::to_string)
    }

    fn scan_for_password_prompt(&mut self, text: &str) {
        if detect_password_prompt(text) {
            debug!("password prompt detected; masking next input");
            self.flags.mask_next_input = true;
        }
    }

    fn consume_mask(&mut self) -> bool {
        let masked = self.flags.mask_next_input;
        self.flags.mask_next_input = false;
        masked
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
