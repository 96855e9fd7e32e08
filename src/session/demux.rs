//! Response demultiplexer
//!
//! The one background task of a session. It owns the transport and the
//! command queue, frames engine output at the prompt sentinel, and routes
//! each batch to the command that produced it. Handles talk to it only
//! through [`Control`] messages and the shared output store.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::sync::{mpsc, oneshot};

use super::output_store::UNDEFINED_KEY;
use super::queue::{CommandQueue, PendingCommand};
use super::shared::{Control, Shared};
use crate::models::{CommandRecord, SessionState};
use crate::protocol::LineFramer;
use crate::transport::{BoxedReader, OutputStreams, Transport};

const READ_CHUNK: usize = 4096;

type StderrLines = Lines<BufReader<BoxedReader>>;

/// Why the read loop ended
#[derive(Debug)]
enum Outcome {
    /// The engine closed its output
    EndOfStream,
    /// The session was asked to stop
    Stopped,
    /// Reading or writing the engine's streams failed
    Failed(String),
}

pub(crate) struct Demultiplexer {
    transport: Transport,
    framer: LineFramer,
    queue: CommandQueue,
    shared: Arc<Shared>,
    control: mpsc::UnboundedReceiver<Control>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl Demultiplexer {
    pub(crate) fn new(
        transport: Transport,
        prompt: &str,
        shared: Arc<Shared>,
        control: mpsc::UnboundedReceiver<Control>,
    ) -> Self {
        Self {
            transport,
            framer: LineFramer::new(prompt),
            queue: CommandQueue::new(),
            shared,
            control,
            idle_waiters: Vec::new(),
        }
    }

    /// Run until end of stream or stop, then shut the engine down
    pub(crate) async fn run(mut self) {
        let outcome = match self.transport.take_output() {
            Some(streams) => self.read_loop(streams).await,
            None => Outcome::Failed("engine output already taken".to_string()),
        };
        self.shutdown(outcome).await;
    }

    async fn read_loop(&mut self, streams: OutputStreams) -> Outcome {
        let mut stdout = streams.stdout;
        let mut stderr: Option<StderrLines> = streams.stderr.map(|s| BufReader::new(s).lines());
        let mut buf = vec![0u8; READ_CHUNK];

        'read: loop {
            tokio::select! {
                read = stdout.read(&mut buf) => match read {
                    Ok(0) => break 'read Outcome::EndOfStream,
                    Ok(n) => {
                        for &byte in &buf[..n] {
                            if let Some(batch) = self.framer.push(byte) {
                                if let Some(outcome) = self.on_prompt(batch).await {
                                    break 'read outcome;
                                }
                            }
                        }
                    }
                    Err(e) => break 'read Outcome::Failed(e.to_string()),
                },

                line = next_stderr_line(stderr.as_mut()), if stderr.is_some() => match line {
                    Ok(Some(line)) => warn!("engine: {}", line),
                    Ok(None) => stderr = None,
                    Err(e) => {
                        debug!("Engine stderr unreadable: {}", e);
                        stderr = None;
                    }
                },

                message = self.control.recv() => match message {
                    Some(Control::Submit(command)) => {
                        if let Some(outcome) = self.submit(command).await {
                            break 'read outcome;
                        }
                    }
                    Some(Control::WhenIdle(waiter)) => {
                        if self.queue.is_idle() {
                            let _ = waiter.send(());
                        } else {
                            self.idle_waiters.push(waiter);
                        }
                    }
                    Some(Control::Close) | None => break 'read Outcome::Stopped,
                },
            }
        }
    }

    /// Handle one prompt edge
    async fn on_prompt(&mut self, batch: Vec<String>) -> Option<Outcome> {
        match self.queue.complete_running() {
            Some(command) => self.deliver(command, batch),
            None => {
                if !batch.is_empty() {
                    debug!("Unsolicited output ({} lines)", batch.len());
                }
                self.shared
                    .record(CommandRecord::new(None, batch.clone(), chrono::Utc::now()));
                self.shared.store_output(UNDEFINED_KEY, batch);
            }
        }

        if self.shared.stop_requested() {
            return Some(Outcome::Stopped);
        }

        match self.queue.dispatch_next() {
            Some(text) => self.write_command(&text).await,
            None => {
                self.on_idle();
                None
            }
        }
    }

    fn deliver(&mut self, command: PendingCommand, batch: Vec<String>) {
        debug!("<- '{}' ({} lines)", command.text, batch.len());
        self.shared.record(CommandRecord::new(
            Some(command.text.clone()),
            batch.clone(),
            command.submitted_at,
        ));

        match command.reply {
            Some(reply) => {
                if reply.send(batch).is_err() {
                    debug!("Caller for '{}' stopped waiting", command.text);
                }
            }
            None => self.shared.store_output(&command.text, batch),
        }
    }

    async fn submit(&mut self, command: PendingCommand) -> Option<Outcome> {
        match self.queue.enqueue(command) {
            Some(text) => self.write_command(&text).await,
            None => None,
        }
    }

    async fn write_command(&mut self, text: &str) -> Option<Outcome> {
        debug!("-> '{}'", text);
        self.shared.set_busy(true);
        match self.transport.write_line(text).await {
            Ok(()) => None,
            Err(e) => {
                error!("{}", e);
                Some(Outcome::Failed(e.to_string()))
            }
        }
    }

    fn on_idle(&mut self) {
        self.shared.set_busy(false);
        for waiter in self.idle_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    async fn shutdown(mut self, outcome: Outcome) {
        let final_state = match &outcome {
            Outcome::EndOfStream => {
                info!("Engine closed its output");
                SessionState::Stopped
            }
            Outcome::Stopped => {
                debug!("Session stop requested");
                SessionState::Stopped
            }
            Outcome::Failed(reason) => {
                error!("Engine stream failed: {}", reason);
                SessionState::Errored
            }
        };

        let leftover = self.framer.pending_lines().len();
        if leftover > 0 {
            debug!("Dropping {} unterminated output lines", leftover);
        }

        self.transport.close().await;
        self.shared.set_state(final_state);

        let dropped = self.queue.drain();
        if !dropped.is_empty() {
            warn!("{} commands abandoned by engine shutdown", dropped.len());
        }
        drop(dropped);
        self.idle_waiters.clear();
        self.control.close();
        self.shared.mark_terminated();
        info!("Session closed");
    }
}

async fn next_stderr_line(lines: Option<&mut StderrLines>) -> std::io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => Ok(None),
    }
}
