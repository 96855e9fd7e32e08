//! Prompt-delimited line framing
//!
//! The engine has no message framing of its own. Output arrives as lines,
//! and the only signal that a command has finished is the prompt string
//! appearing on the line currently being assembled (the prompt is never
//! newline-terminated).

/// Accumulates engine output one byte at a time
#[derive(Debug, Clone)]
pub struct LineFramer {
    /// Prompt sentinel bytes
    prompt: Vec<u8>,
    /// Line currently being assembled
    line: Vec<u8>,
    /// Completed lines since the last prompt
    batch: Vec<String>,
    /// Upper bound for a single line before it is force-split
    max_line_len: usize,
}

impl LineFramer {
    /// Create a framer for the given prompt sentinel
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.as_bytes().to_vec(),
            line: Vec::new(),
            batch: Vec::new(),
            max_line_len: 1024 * 1024,
        }
    }

    /// Feed one byte; returns the finished batch when the prompt appears
    pub fn push(&mut self, byte: u8) -> Option<Vec<String>> {
        match byte {
            b'\n' => {
                let line = self.take_line();
                self.batch.push(line);
                return None;
            }
            b'\r' => return None,
            _ => self.line.push(byte),
        }

        // The prompt completes exactly on the byte that finishes it, so it is
        // enough to look at the tail of the line.
        if !self.prompt.is_empty() && self.line.ends_with(&self.prompt) {
            // whatever shares the prompt's line is not part of the response
            let prefix_len = self.line.len() - self.prompt.len();
            if prefix_len > 0 {
                debug!(
                    "Discarding text before prompt: {:?}",
                    String::from_utf8_lossy(&self.line[..prefix_len])
                );
            }
            self.line.clear();
            return Some(std::mem::take(&mut self.batch));
        }

        if self.line.len() >= self.max_line_len {
            let line = self.take_line();
            self.batch.push(line);
        }

        None
    }

    /// Feed a chunk, collecting every batch it completes
    pub fn push_slice(&mut self, data: &[u8]) -> Vec<Vec<String>> {
        data.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Lines completed since the last prompt
    pub fn pending_lines(&self) -> &[String] {
        &self.batch
    }

    /// Drop all buffered state
    pub fn reset(&mut self) {
        self.line.clear();
        self.batch.clear();
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.line).to_string();
        self.line.clear();
        line
    }
}
