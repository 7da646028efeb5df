//! Remote session management.
//!
//! This module tracks the lifecycle of one remote session (connect, run
//! commands or an interactive shell, disconnect) and turns transport events
//! into displayable transcript messages.

mod controller;
mod driver;
mod history;
mod state;
mod transcript;

pub use controller::{
    ConnectParams, Effect, SessionController, CONNECT_TIMEOUT, EMPTY_INPUT_PLACEHOLDER,
    MASKED_INPUT_PLACEHOLDER,
};
pub use driver::Session;
pub use history::CommandHistory;
pub use state::{ConnectionState, SessionFlags};
pub use transcript::{Message, Role, Transcript};
