//! Transport to the engine process
//!
//! Owns the spawned process (if any) and its byte streams. The output side
//! is handed to the demultiplexer; the input side stays here so commands
//! and the final `exit` go through one writer.

pub mod process;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;

use crate::error::{Error, Result};

pub use process::{find_executable, send_interrupt, spawn_engine, split_command_line};

/// Boxed engine output stream
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed engine input stream
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Engine stdout and optional stderr, taken by the reader task
pub struct OutputStreams {
    pub stdout: BoxedReader,
    pub stderr: Option<BoxedReader>,
}

/// Connection to one engine instance
pub struct Transport {
    stdin: Option<BoxedWriter>,
    output: Option<OutputStreams>,
    child: Option<Child>,
    pid: Option<u32>,
    closed: bool,
}

impl Transport {
    /// Spawn the engine from a user command line plus interactive flags
    pub fn spawn(command_line: &str, flags: &[String]) -> Result<Self> {
        let mut child = spawn_engine(command_line, flags)?;
        let missing = |stream: &str| Error::SpawnFailed {
            command: command_line.to_string(),
            reason: format!("{} was not captured", stream),
        };

        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().map(|s| Box::new(s) as BoxedReader);

        Ok(Self {
            stdin: Some(Box::new(stdin)),
            output: Some(OutputStreams {
                stdout: Box::new(stdout),
                stderr,
            }),
            pid: child.id(),
            child: Some(child),
            closed: false,
        })
    }

    /// Wrap already-connected streams, e.g. an in-process engine
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            stdin: Some(Box::new(writer)),
            output: Some(OutputStreams {
                stdout: Box::new(reader),
                stderr: None,
            }),
            child: None,
            pid: None,
            closed: false,
        }
    }

    /// Attach a diagnostic stream that is logged but never framed
    pub fn with_stderr<R>(mut self, stderr: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        if let Some(output) = self.output.as_mut() {
            output.stderr = Some(Box::new(stderr));
        }
        self
    }

    /// OS process id, if this transport owns a process
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Take the output streams; only the first call returns them
    pub fn take_output(&mut self) -> Option<OutputStreams> {
        self.output.take()
    }

    /// Write one command line and flush it
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(Error::SessionClosed)?;
        let failed = |e: std::io::Error| Error::WriteFailed {
            command: line.to_string(),
            reason: e.to_string(),
        };

        stdin.write_all(line.as_bytes()).await.map_err(failed)?;
        stdin.write_all(b"\n").await.map_err(failed)?;
        stdin.flush().await.map_err(failed)?;
        Ok(())
    }

    /// Best-effort `exit`, then terminate and reap the process
    ///
    /// Safe to call repeatedly; only the first call does anything.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.write_all(b"exit\n").await;
            let _ = stdin.shutdown().await;
        }

        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(e) = child.start_kill() {
            debug!("Kill failed (already gone?): {}", e);
        }
        match child.wait().await {
            Ok(status) => info!("Engine terminated with {}", status),
            Err(e) => error!("Failed to reap engine process: {}", e),
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("pid", &self.pid)
            .field("closed", &self.closed)
            .field("owns_process", &self.child.is_some())
            .finish()
    }
}
