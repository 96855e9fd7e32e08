//! Session controller
//!
//! Cheap, cloneable handle through which every public operation reaches the
//! engine. Text-keyed `run`/`read` follow the engine's own request model;
//! `execute` hands out a per-request ticket resolved in submission order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use super::demux::Demultiplexer;
use super::queue::PendingCommand;
use super::shared::{Control, Shared};
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::models::{CommandRecord, SessionState};
use crate::transport::{self, Transport};

/// How `read` behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadMode {
    /// Wait for the output (bounded by the read timeout)
    pub blocking: bool,
    /// Submit the command before reading
    pub also_run: bool,
}

impl ReadMode {
    /// Return whatever is stored right now
    pub const NOW: ReadMode = ReadMode {
        blocking: false,
        also_run: false,
    };

    /// Wait for output of a command submitted earlier
    pub const WAIT: ReadMode = ReadMode {
        blocking: true,
        also_run: false,
    };

    /// Submit and wait
    pub const RUN_AND_WAIT: ReadMode = ReadMode {
        blocking: true,
        also_run: true,
    };
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
    control: mpsc::UnboundedSender<Control>,
    read_timeout: Duration,
    pid: Option<u32>,
}

impl SessionController {
    /// Start the reader task over `transport`
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach(transport: Transport, config: &DriverConfig) -> Self {
        let shared = Arc::new(Shared::new(config.session.history_limit));
        let (control, control_rx) = mpsc::unbounded_channel();
        let pid = transport.pid();

        let demux = Demultiplexer::new(
            transport,
            &config.engine.prompt,
            Arc::clone(&shared),
            control_rx,
        );
        tokio::spawn(demux.run());

        Self {
            shared,
            control,
            read_timeout: config.session.read_timeout(),
            pid,
        }
    }

    /// Queue `command`; its output is stored under its exact text
    ///
    /// Submitting the same text again before reading it replaces the first
    /// result. Does nothing (beyond a warning) once the engine is gone.
    pub fn run(&self, command: &str) {
        if self.is_terminated() {
            warn!("Ignoring '{}': engine has terminated", command);
            return;
        }
        if self
            .control
            .send(Control::Submit(PendingCommand::keyed(command)))
            .is_err()
        {
            warn!("Ignoring '{}': session is shutting down", command);
        }
    }

    /// Fetch the stored output of `command`
    ///
    /// A blocking read waits until the output arrives, the engine terminates
    /// or the read timeout passes; the last two give an empty result.
    pub async fn read(&self, command: &str, mode: ReadMode) -> Vec<String> {
        if mode.also_run {
            self.run(command);
        }
        if !mode.blocking {
            return self.shared.take_output(command).unwrap_or_default();
        }

        let deadline = Instant::now() + self.read_timeout;
        loop {
            let notified = self.shared.output_ready().notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(lines) = self.shared.take_output(command) {
                return lines;
            }
            if self.is_terminated() {
                debug!("Read of '{}' ended by engine termination", command);
                return Vec::new();
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                warn!(
                    "No output for '{}' within {:?}",
                    command, self.read_timeout
                );
                return self.shared.take_output(command).unwrap_or_default();
            }
        }
    }

    /// Submit `command` and wait for exactly its output
    pub async fn execute(&self, command: &str) -> Result<Vec<String>> {
        self.request(command, Some(self.read_timeout)).await
    }

    /// Submit `command` and wait for its output for as long as the engine
    /// is alive
    ///
    /// Not bounded by the read timeout; fails only once the engine is gone.
    pub async fn execute_while_alive(&self, command: &str) -> Result<Vec<String>> {
        self.request(command, None).await
    }

    /// `execute_while_alive`, mapping engine termination to an empty result
    pub async fn try_execute(&self, command: &str) -> Vec<String> {
        match self.execute_while_alive(command).await {
            Ok(lines) => lines,
            Err(e) => {
                debug!("'{}' produced no output: {}", command, e);
                Vec::new()
            }
        }
    }

    /// Ticketed request with an optional bound
    pub(crate) async fn request(
        &self,
        command: &str,
        limit: Option<Duration>,
    ) -> Result<Vec<String>> {
        if self.is_terminated() {
            return Err(Error::SessionClosed);
        }

        let (pending, reply) = PendingCommand::ticketed(command);
        self.control
            .send(Control::Submit(pending))
            .map_err(|_| Error::SessionClosed)?;

        let Some(limit) = limit else {
            return reply.await.map_err(|_| Error::SessionClosed);
        };
        match tokio::time::timeout(limit, reply).await {
            Ok(Ok(lines)) => Ok(lines),
            Ok(Err(_)) => Err(Error::SessionClosed),
            Err(_) => Err(Error::CommandTimeout {
                command: command.to_string(),
                duration: limit,
            }),
        }
    }

    /// Wait until every submitted command has completed
    pub async fn wait_idle(&self) -> Result<()> {
        let (waiter, idle) = oneshot::channel();
        self.control
            .send(Control::WhenIdle(waiter))
            .map_err(|_| Error::SessionClosed)?;
        idle.await.map_err(|_| Error::SessionClosed)
    }

    /// Drop all stored, unread output
    pub fn clear_output(&self) {
        self.shared.outputs().clear();
    }

    /// Stop the session and terminate the engine
    ///
    /// Idempotent and safe from any context, including `Drop` and while
    /// another task is blocked in `read`.
    pub fn close(&self) {
        if self.shared.request_stop() {
            return;
        }
        info!("Closing session");
        self.shared.set_state(SessionState::Stopped);
        self.shared.mark_terminated();
        let _ = self.control.send(Control::Close);
    }

    /// Break a long-running engine command with SIGINT
    pub fn interrupt(&self) -> Result<()> {
        let pid = self.pid.ok_or_else(|| {
            Error::Other("Session does not own an engine process".to_string())
        })?;
        transport::send_interrupt(pid)
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Receiver notified on every lifecycle transition
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.subscribe()
    }

    /// Whether the engine has exited or the session was closed
    pub fn is_terminated(&self) -> bool {
        self.shared.is_terminated()
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Completed commands, oldest first
    pub fn history(&self) -> Vec<CommandRecord> {
        self.shared.history().snapshot()
    }

    pub(crate) fn mark_ready(&self) {
        self.shared.set_state(SessionState::Ready);
    }

    pub(crate) fn mark_errored(&self) {
        self.shared.set_state(SessionState::Errored);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("pid", &self.pid)
            .finish()
    }
}
