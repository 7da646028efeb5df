//! Command history with cursor navigation.

/// Ordered command history plus the cursor used by up/down navigation.
///
/// Only immediate consecutive repeats are deduplicated; the same command may
/// appear multiple times elsewhere in the history.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission and reset the navigation cursor.
    pub fn push(&mut self, command: &str) {
        if self.entries.last().map(String::as_str) != Some(command) {
            self.entries.push(command.to_string());
        }
        self.cursor = None;
    }

    /// Reset the navigation cursor without recording anything.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Move the cursor toward older entries (up arrow).
    ///
    /// Stays on the oldest entry once reached.
    pub fn prev(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.entries.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    /// Move the cursor toward newer entries (down arrow).
    ///
    /// Past the newest entry the cursor clears and `None` is returned,
    /// meaning the input line should be cleared.
    pub fn next(&mut self) -> Option<&str> {
        match self.cursor {
            None => None,
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                Some(&self.entries[i + 1])
            }
            Some(_) => {
                self.cursor = None;
                None
            }
        }
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
