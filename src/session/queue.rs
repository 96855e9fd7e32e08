//! Command queue
//!
//! Ordered pending commands plus the single command currently in flight.
//! A command leaves `pending` exactly when it becomes running, and leaves
//! running exactly when the prompt that ends its output is seen.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// A command waiting for, or holding, the engine
#[derive(Debug)]
pub struct PendingCommand {
    /// Text written to the engine
    pub text: String,
    /// Where a ticketed command's output goes; `None` means the output store
    pub reply: Option<oneshot::Sender<Vec<String>>>,
    /// When the caller handed the command over
    pub submitted_at: DateTime<Utc>,
}

impl PendingCommand {
    /// Command whose output is stored under its text
    pub fn keyed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: None,
            submitted_at: Utc::now(),
        }
    }

    /// Command whose output is delivered to the returned receiver
    pub fn ticketed(text: impl Into<String>) -> (Self, oneshot::Receiver<Vec<String>>) {
        let (tx, rx) = oneshot::channel();
        let command = Self {
            text: text.into(),
            reply: Some(tx),
            submitted_at: Utc::now(),
        };
        (command, rx)
    }
}

/// FIFO of commands with at most one in flight
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<PendingCommand>,
    running: Option<PendingCommand>,
    /// The engine is sitting at a prompt with nothing to do
    waiting_for_prompt: bool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    ///
    /// Returns the text to write right away when the engine is already idle
    /// at a prompt, so the caller does not wait for another prompt edge.
    pub fn enqueue(&mut self, command: PendingCommand) -> Option<String> {
        self.pending.push_back(command);
        if self.waiting_for_prompt && self.running.is_none() {
            self.dispatch_next()
        } else {
            None
        }
    }

    /// Take the running command once its output is complete
    pub fn complete_running(&mut self) -> Option<PendingCommand> {
        self.running.take()
    }

    /// Promote the next pending command to running
    ///
    /// Returns its text for writing, or marks the queue as waiting for the
    /// next submission when nothing is pending.
    pub fn dispatch_next(&mut self) -> Option<String> {
        match self.pending.pop_front() {
            Some(command) => {
                let text = command.text.clone();
                self.running = Some(command);
                self.waiting_for_prompt = false;
                Some(text)
            }
            None => {
                self.waiting_for_prompt = true;
                None
            }
        }
    }

    /// Nothing pending, nothing running, and the engine has prompted
    pub fn is_idle(&self) -> bool {
        self.waiting_for_prompt && self.running.is_none() && self.pending.is_empty()
    }

    pub fn running_command(&self) -> Option<&str> {
        self.running.as_ref().map(|c| c.text.as_str())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Remove everything, running command first
    pub fn drain(&mut self) -> Vec<PendingCommand> {
        self.waiting_for_prompt = false;
        self.running.take().into_iter().chain(self.pending.drain(..)).collect()
    }
}
