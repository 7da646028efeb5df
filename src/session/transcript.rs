//! Display transcript of a remote session.

use serde::Serialize;

/// Who a transcript message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text the user submitted (commands, shell input, placeholders).
    User,
    /// Output or status text originating from the remote side.
    Server,
}

/// One displayable transcript record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Monotonically increasing within one transcript.
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub is_error: bool,
}

/// Ordered transcript with server-message coalescing.
///
/// Consecutive server messages with the same error flag are merged into one
/// record to keep the display compact. A newline separator is inserted
/// unless either side already supplies one; byte content is otherwise
/// preserved exactly.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message. User messages never merge.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into(), false);
    }

    /// Append a server message, merging into the previous record when it is
    /// also a server message with the same error flag.
    pub fn push_server(&mut self, content: impl Into<String>, is_error: bool) {
        let content = content.into();
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Server && last.is_error == is_error {
                if !last.content.ends_with('\n') && !content.starts_with('\n') {
                    last.content.push('\n');
                }
                last.content.push_str(&content);
                return;
            }
        }
        self.push(Role::Server, content, is_error);
    }

    fn push(&mut self, role: Role, content: String, is_error: bool) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            is_error,
        });
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of discrete records (after merging).
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut t = Transcript::new();
        t.push_user("ls");
        t.push_server("file.txt\n", false);
        t.push_user("pwd");
        let ids: Vec<u64> = t.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_consecutive_server_messages_merge() {
        let mut t = Transcript::new();
        t.push_server("line one", false);
        t.push_server("line two", false);
        assert_eq!(t.len(), 1);
        assert_eq!(t.messages()[0].content, "line one\nline two");
    }

    #[test]
    fn test_merge_skips_separator_when_newline_present() {
        let mut t = Transcript::new();
        t.push_server("partial", false);
        t.push_server("\nrest\n", false);
        assert_eq!(t.messages()[0].content, "partial\nrest\n");

        let mut t = Transcript::new();
        t.push_server("done\n", false);
        t.push_server("next", false);
        assert_eq!(t.messages()[0].content, "done\nnext");
    }

    #[test]
    fn test_error_flag_blocks_merge() {
        let mut t = Transcript::new();
        t.push_server("output", false);
        t.push_server("failure", true);
        assert_eq!(t.len(), 2);
        assert!(t.messages()[1].is_error);
    }

    #[test]
    fn test_user_message_blocks_merge() {
        let mut t = Transcript::new();
        t.push_server("before", false);
        t.push_user("ls");
        t.push_server("after", false);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_empty() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }
}
