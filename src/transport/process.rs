//! Engine process spawning
//!
//! Resolves the user's command line to an executable, appends the flags that
//! put the simulator into its interactive console, and spawns it with piped
//! standard streams.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

use crate::error::{Error, Result};

/// Split a command line shell-style
///
/// Whitespace separates words; single quotes are literal, double quotes
/// allow backslash escapes, and a backslash outside quotes escapes the next
/// character.
pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(Error::Other(format!("Unterminated quote in '{}'", line))),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => word.push(c),
                            None => break,
                        },
                        Some(c) => word.push(c),
                        None => return Err(Error::Other(format!("Unterminated quote in '{}'", line))),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    word.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    Ok(words)
}

/// Whether `path` is a regular file the current user may execute
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Resolve the first token of a command line to an executable path
///
/// Tokens containing a path separator are checked as given; bare names are
/// searched for on `PATH`.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

/// Spawn the engine with piped stdin/stdout/stderr
///
/// The process is killed if the returned handle is dropped.
pub fn spawn_engine(command_line: &str, flags: &[String]) -> Result<Child> {
    let words = split_command_line(command_line)?;
    let (program, args) = words.split_first().ok_or(Error::EmptyCommand)?;

    let executable = find_executable(program).ok_or_else(|| Error::ExecutableNotFound {
        command: program.clone(),
    })?;

    debug!(
        "Spawning {} with args {:?} and flags {:?}",
        executable.display(),
        args,
        flags
    );

    let child = Command::new(&executable)
        .args(args)
        .args(flags)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::SpawnFailed {
            command: command_line.to_string(),
            reason: e.to_string(),
        })?;

    info!(
        "Spawned engine '{}' (pid {:?})",
        executable.display(),
        child.id()
    );
    Ok(child)
}

/// Send SIGINT to the engine to break a long-running command
#[cfg(unix)]
pub fn send_interrupt(pid: u32) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|_| Error::Other(format!("Invalid pid {}", pid)))?;
    kill(Pid::from_raw(pid), Signal::SIGINT)
        .map_err(|e| Error::Other(format!("Failed to interrupt engine: {}", e)))
}

/// Interrupting is not supported off unix
#[cfg(not(unix))]
pub fn send_interrupt(_pid: u32) -> Result<()> {
    Err(Error::Other(
        "Interrupting the engine is only supported on unix".to_string(),
    ))
}
