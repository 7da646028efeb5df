//! Output processing for remote terminal streams.
//!
//! This module turns raw, arbitrarily-chunked terminal output into clean,
//! display-ready text:
//! - ANSI escape and control-code stripping with cross-chunk state
//! - carriage-return line-overwrite reassembly
//! - password-prompt detection on the sanitized text
//!
//! # Example
//!
//! ```
//! use remote_console::output::StreamSanitizer;
//!
//! let mut sanitizer = StreamSanitizer::new();
//! // The escape sequence is split across two chunks.
//! let mut text = sanitizer.sanitize("\x1b[3");
//! text.push_str(&sanitizer.sanitize("1mRed text\x1b[0m"));
//! assert_eq!(text, "Red text");
//! ```

mod prompt;
mod sanitizer;

pub use prompt::detect_password_prompt;
pub use sanitizer::{sanitize_once, StreamSanitizer};
