//! Command Record Model
//!
//! A completed command and the lines it produced, kept in a bounded
//! in-memory history for diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One completed request/response exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Command text as written to the engine; `None` for unsolicited output
    pub command: Option<String>,
    /// Lines printed before the next prompt
    pub lines: Vec<String>,
    /// When the command was handed to the session
    pub submitted_at: DateTime<Utc>,
    /// When the prompt following its output was seen
    pub completed_at: DateTime<Utc>,
}

impl CommandRecord {
    pub fn new(command: Option<String>, lines: Vec<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            command,
            lines,
            submitted_at,
            completed_at: Utc::now(),
        }
    }

    /// Wall-clock time between submission and completion
    pub fn elapsed(&self) -> chrono::Duration {
        self.completed_at - self.submitted_at
    }
}

/// Bounded history of completed commands, oldest first
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    records: VecDeque<CommandRecord>,
    limit: usize,
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(1024)),
            limit,
        }
    }

    /// Append a record, evicting the oldest past the limit
    pub fn push(&mut self, record: CommandRecord) {
        if self.limit == 0 {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn last(&self) -> Option<&CommandRecord> {
        self.records.back()
    }

    /// Copy of all records, oldest first
    pub fn snapshot(&self) -> Vec<CommandRecord> {
        self.records.iter().cloned().collect()
    }

    /// Commands written to the engine, oldest first
    pub fn commands(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.command.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
