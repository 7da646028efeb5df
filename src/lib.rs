//! # remote-console
//!
//! Remote-session terminal engine.
//!
//! This crate turns the raw, arbitrarily-chunked byte stream produced by a
//! remote shell into clean, display-ready text while tracking the lifecycle
//! of the session (connect, run commands or an interactive shell,
//! disconnect). It does not own a socket: a message-based transport delivers
//! [`ServerEvent`]s and carries away [`ClientCommand`]s.
//!
//! ## Features
//!
//! - **Chunk-safe sanitization**: escape sequences and CR/LF pairs split
//!   across network chunks resolve exactly as if delivered whole
//! - **Line reassembly**: carriage-return overwrites collapse to clean lines
//!   without a full terminal grid
//! - **Session state machine**: one-shot commands, interactive shell,
//!   password-prompt masking, connect watchdog, command history
//! - **Transport-agnostic**: typed serde event/command contracts
//!
//! ## Quick Start
//!
//! ```no_run
//! use remote_console::{ConnectParams, ServerEvent, Session};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> remote_console::Result<()> {
//!     // Initialize logging
//!     remote_console::logging::try_init().ok();
//!
//!     // Outbound commands are consumed by the transport.
//!     let (commands, mut outbound) = mpsc::channel(64);
//!     let session = Session::new(commands);
//!
//!     session
//!         .connect(ConnectParams {
//!             host: "example.com".into(),
//!             port: 22,
//!             username: "deploy".into(),
//!             password: None,
//!         })
//!         .await?;
//!
//!     // The transport forwards `outbound` commands to the remote side and
//!     // feeds its replies back in:
//!     let _next = outbound.recv().await;
//!     session
//!         .handle_event(ServerEvent::ConnectionResult {
//!             ok: true,
//!             message: Some("connected".into()),
//!         })
//!         .await?;
//!
//!     for message in session.messages()? {
//!         println!("[{:?}] {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use error::{RemoteConsoleError, Result};
pub use output::{detect_password_prompt, sanitize_once, StreamSanitizer};
pub use protocol::{ClientCommand, CommandState, ServerEvent};
pub use session::{
    ConnectParams, ConnectionState, Effect, Message, Role, Session, SessionController,
    SessionFlags, CONNECT_TIMEOUT,
};
