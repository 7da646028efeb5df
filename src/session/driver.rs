//! Tokio host for the session controller.
//!
//! The controller is a synchronous state machine; this module gives it an
//! async home. A [`Session`] serializes all controller access behind one
//! lock, forwards outbound commands to the transport channel, and runs the
//! connect watchdog as a cancellable timer task.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::controller::{ConnectParams, Effect, SessionController, CONNECT_TIMEOUT};
use super::state::{ConnectionState, SessionFlags};
use super::transcript::Message;
use crate::error::RemoteConsoleError;
use crate::protocol::{ClientCommand, ServerEvent};
use crate::Result;

/// Async handle over one [`SessionController`].
///
/// Events and user actions may be fed from any task; mutation is serialized
/// by the internal lock, preserving the per-session ordering the sanitizers
/// depend on (the transport must still deliver each channel in order).
pub struct Session {
    controller: Arc<Mutex<SessionController>>,
    commands: mpsc::Sender<ClientCommand>,
    watchdog: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session that sends outbound commands on `commands`.
    pub fn new(commands: mpsc::Sender<ClientCommand>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(SessionController::new())),
            commands,
            watchdog: Mutex::new(None),
        }
    }

    /// Request a connection. See [`SessionController::connect`].
    pub async fn connect(&self, params: ConnectParams) -> Result<()> {
        let effects = self.with_controller(|c| c.connect(params))?;
        self.apply(effects).await
    }

    /// Request a disconnect.
    pub async fn disconnect(&self) -> Result<()> {
        let effects = self.with_controller(|c| c.disconnect())?;
        self.apply(effects).await
    }

    /// Submit a line of user input.
    pub async fn submit(&self, input: &str) -> Result<()> {
        let effects = self.with_controller(|c| c.submit(input))?;
        self.apply(effects).await
    }

    /// Toggle the interactive shell.
    pub async fn toggle_shell(&self) -> Result<()> {
        let effects = self.with_controller(|c| c.toggle_shell())?;
        self.apply(effects).await
    }

    /// Feed one inbound transport event.
    pub async fn handle_event(&self, event: ServerEvent) -> Result<()> {
        let effects = self.with_controller(|c| c.handle_event(event))?;
        self.apply(effects).await
    }

    /// Snapshot of the transcript.
    pub fn messages(&self) -> Result<Vec<Message>> {
        self.with_controller(|c| c.messages().to_vec())
    }

    /// Current connection lifecycle state.
    pub fn connection(&self) -> Result<ConnectionState> {
        self.with_controller(|c| c.connection())
    }

    /// Current session flags.
    pub fn flags(&self) -> Result<SessionFlags> {
        self.with_controller(|c| c.flags())
    }

    /// Up-arrow history recall.
    pub fn history_prev(&self) -> Result<Option<String>> {
        self.with_controller(|c| c.history_prev())
    }

    /// Down-arrow history recall; `Ok(None)` clears the input.
    pub fn history_next(&self) -> Result<Option<String>> {
        self.with_controller(|c| c.history_next())
    }

    fn with_controller<T>(&self, f: impl FnOnce(&mut SessionController) -> T) -> Result<T> {
        let mut controller = self
            .controller
            .lock()
            .map_err(|_| RemoteConsoleError::LockPoisoned)?;
        Ok(f(&mut controller))
    }

    async fn apply(&self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Send(command) => self
                    .commands
                    .send(command)
                    .await
                    .map_err(|_| RemoteConsoleError::ChannelClosed)?,
                Effect::StartConnectWatchdog { generation } => {
                    self.start_watchdog(generation)?;
                }
                Effect::CancelConnectWatchdog => {
                    self.cancel_watchdog()?;
                }
            }
        }
        Ok(())
    }

    fn start_watchdog(&self, generation: u64) -> Result<()> {
        self.cancel_watchdog()?;

        let controller = Arc::clone(&self.controller);
        let commands = self.commands.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(CONNECT_TIMEOUT).await;
            // The guard is dropped before any await; a stale generation
            // makes this a no-op inside the controller.
            let effects = match controller.lock() {
                Ok(mut controller) => controller.handle_connect_timeout(generation),
                Err(_) => return,
            };
            for effect in effects {
                if let Effect::Send(command) = effect {
                    if commands.send(command).await.is_err() {
                        debug!("command channel closed while handling connect timeout");
                    }
                }
            }
        });

        let mut slot = self
            .watchdog
            .lock()
            .map_err(|_| RemoteConsoleError::LockPoisoned)?;
        *slot = Some(handle);
        Ok(())
    }

    fn cancel_watchdog(&self) -> Result<()> {
        let mut slot = self
            .watchdog
            .lock()
            .map_err(|_| RemoteConsoleError::LockPoisoned)?;
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Stop the timer task; deliberately no disconnect here. A dropped
        // handle (e.g. a panel switching away) must not kill the logical
        // session.
        let _ = self.cancel_watchdog();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_flow_through_driver() {
        let (tx, mut rx) = mpsc::channel(8);
        let session = Session::new(tx);

        session
            .connect(ConnectParams {
                host: "example.com".into(),
                port: 22,
                username: "deploy".into(),
                password: None,
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            ClientCommand::Connect { host, port, .. } => {
                assert_eq!(host, "example.com");
                assert_eq!(port, 22);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(session.connection().unwrap(), ConnectionState::Connecting);

        session
            .handle_event(ServerEvent::ConnectionResult {
                ok: true,
                message: Some("connected".into()),
            })
            .await
            .unwrap();
        assert_eq!(session.connection().unwrap(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_local_rejection_sends_nothing() {
        let (tx, mut rx) = mpsc::channel(8);
        let session = Session::new(tx);

        session
            .connect(ConnectParams {
                host: String::new(),
                port: 22,
                username: "deploy".into(),
                password: None,
            })
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
        let messages = session.messages().unwrap();
        assert!(messages.last().unwrap().is_error);
    }

    #[tokio::test]
    async fn test_closed_channel_reports_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let session = Session::new(tx);

        let result = session
            .connect(ConnectParams {
                host: "example.com".into(),
                port: 22,
                username: "deploy".into(),
                password: None,
            })
            .await;
        assert!(matches!(result, Err(RemoteConsoleError::ChannelClosed)));
    }
}
