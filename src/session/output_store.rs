//! Text-keyed store of completed command output

use std::collections::HashMap;

/// Key for output that arrived while no command was running
pub const UNDEFINED_KEY: &str = "undefined";

/// Completed output waiting to be read, keyed by exact command text
///
/// Storing a result overwrites any unread result for the same text. Callers
/// that submit the same text twice before reading it get only the second
/// result.
#[derive(Debug, Default)]
pub struct OutputStore {
    entries: HashMap<String, Vec<String>>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store output, returning any unread output it replaced
    pub fn insert(&mut self, command: &str, lines: Vec<String>) -> Option<Vec<String>> {
        self.entries.insert(command.to_string(), lines)
    }

    /// Remove and return the output for `command`
    pub fn take(&mut self, command: &str) -> Option<Vec<String>> {
        self.entries.remove(command)
    }

    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
