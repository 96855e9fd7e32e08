//! State shared between the session handles and the reader task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch, Notify};

use super::output_store::OutputStore;
use super::queue::PendingCommand;
use crate::models::{CommandHistory, CommandRecord, SessionState};

/// Messages from session handles to the reader task
#[derive(Debug)]
pub(crate) enum Control {
    /// Queue a command
    Submit(PendingCommand),
    /// Resolve once the queue has drained and the engine has prompted
    WhenIdle(oneshot::Sender<()>),
    /// Stop after the current read and shut the engine down
    Close,
}

/// Everything the reader task and the handles both touch
///
/// The output store and history are plain mutexes that are never held
/// across an await.
#[derive(Debug)]
pub(crate) struct Shared {
    outputs: Mutex<OutputStore>,
    output_ready: Notify,
    history: Mutex<CommandHistory>,
    state: watch::Sender<SessionState>,
    stop: AtomicBool,
    terminated: AtomicBool,
}

impl Shared {
    pub(crate) fn new(history_limit: usize) -> Self {
        let (state, _) = watch::channel(SessionState::Starting);
        Self {
            outputs: Mutex::new(OutputStore::new()),
            output_ready: Notify::new(),
            history: Mutex::new(CommandHistory::new(history_limit)),
            state,
            stop: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    pub(crate) fn outputs(&self) -> MutexGuard<'_, OutputStore> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn history(&self) -> MutexGuard<'_, CommandHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn output_ready(&self) -> &Notify {
        &self.output_ready
    }

    /// Store keyed output and wake blocked readers
    pub(crate) fn store_output(&self, key: &str, lines: Vec<String>) {
        if let Some(replaced) = self.outputs().insert(key, lines) {
            warn!(
                "Unread output for '{}' ({} lines) overwritten by a newer result",
                key,
                replaced.len()
            );
        }
        self.output_ready.notify_waiters();
    }

    pub(crate) fn take_output(&self, key: &str) -> Option<Vec<String>> {
        self.outputs().take(key)
    }

    pub(crate) fn record(&self, record: CommandRecord) {
        self.history().push(record);
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Apply a lifecycle transition; terminal states are final
    pub(crate) fn set_state(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|current| match current.transition(next) {
            Some(state) => {
                debug!("Session state {} -> {}", current, state);
                *current = state;
                true
            }
            None => false,
        })
    }

    /// Flip between Running and Ready once the handshake is over
    pub(crate) fn set_busy(&self, busy: bool) {
        if self.state() == SessionState::Starting {
            return;
        }
        let next = if busy {
            SessionState::Running
        } else {
            SessionState::Ready
        };
        self.set_state(next);
    }

    /// Set the stop flag; returns whether it was already set
    pub(crate) fn request_stop(&self) -> bool {
        self.stop.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Mark the engine as gone and wake every blocked reader
    pub(crate) fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.output_ready.notify_waiters();
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}
