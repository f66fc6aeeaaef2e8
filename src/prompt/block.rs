//! Line-buffered terminal prompter
//!
//! Answers are *blocks* of lines: lines arriving within `delay` of each
//! other belong to the same answer, so a JSON document pasted in one go
//! is read as one answer. An empty line ends a block immediately.

use super::types::Prompter;
use crate::error::{Error, Result};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Behaviour switches for [`BlockPrompter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOptions {
    /// Quiet period that ends a block
    pub delay: Duration,
    /// Warnings are shown (interactive) or fatal (non-interactive)
    pub interactive: bool,
    /// Write prompts and questions to the output
    pub prompt_enabled: bool,
    /// Take defaults without asking
    pub yes: bool,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(60),
            interactive: true,
            prompt_enabled: true,
            yes: false,
        }
    }
}

impl BlockOptions {
    /// Options for unattended runs: silent, defaults accepted, warnings fatal
    pub fn unattended() -> Self {
        Self {
            interactive: false,
            prompt_enabled: false,
            yes: true,
            ..Default::default()
        }
    }

    /// Enable/disable auto-accepting defaults
    #[must_use]
    pub fn with_yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }
}

/// Prompter reading answer blocks from a byte stream
pub struct BlockPrompter {
    options: BlockOptions,
    output: Box<dyn Write + Send>,
    input: Option<Box<dyn Read + Send>>,
    lines: Option<Receiver<String>>,
}

impl std::fmt::Debug for BlockPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPrompter")
            .field("options", &self.options)
            .field("started", &self.lines.is_some())
            .finish_non_exhaustive()
    }
}

impl BlockPrompter {
    /// Create a prompter over arbitrary input and output streams
    pub fn new(
        input: impl Read + Send + 'static,
        output: impl Write + Send + 'static,
        options: BlockOptions,
    ) -> Self {
        Self {
            options,
            output: Box::new(output),
            input: Some(Box::new(input)),
            lines: None,
        }
    }

    /// Read answers from stdin, write questions to stderr
    pub fn stdio(options: BlockOptions) -> Self {
        Self::new(io::stdin(), io::stderr(), options)
    }

    /// Start the reader thread on first use
    ///
    /// Input is not touched until an answer is actually needed, so an
    /// unattended run never consumes stdin.
    fn lines(&mut self) -> &Receiver<String> {
        if self.lines.is_none() {
            let (tx, rx) = mpsc::channel();
            if let Some(input) = self.input.take() {
                thread::spawn(move || {
                    for line in BufReader::new(input).lines() {
                        let Ok(line) = line else { break };
                        let line = line.trim_end_matches('\r').to_string();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    debug!("prompt input closed");
                });
            }
            self.lines = Some(rx);
        }
        self.lines.get_or_insert_with(|| mpsc::channel().1)
    }

    /// Collect the next block, `None` at end of input
    fn next_block(&mut self) -> Option<String> {
        let delay = self.options.delay;
        let rx = self.lines();
        let mut block: Vec<String> = Vec::new();
        loop {
            let next = if block.is_empty() {
                match rx.recv() {
                    Ok(line) => line,
                    Err(_) => return None,
                }
            } else {
                match rx.recv_timeout(delay) {
                    Ok(line) => line,
                    Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
                }
            };
            if next.is_empty() {
                break;
            }
            block.push(next);
        }
        Some(block.join("\n"))
    }

    fn write(&mut self, message: &str) {
        // A closed terminal only loses the question text
        let _ = self.output.write_all(message.as_bytes());
        let _ = self.output.flush();
    }
}

impl Prompter for BlockPrompter {
    fn prompt(&mut self, message: &str) {
        if self.options.prompt_enabled {
            self.write(message);
        }
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        if !self.options.interactive {
            return Err(Error::prompt(message));
        }
        if self.options.prompt_enabled {
            self.write(&format!("{message}\n"));
        }
        Ok(())
    }

    fn assume_yes(&self) -> bool {
        self.options.yes
    }

    fn next_answer(&mut self, query: &str) -> Result<String> {
        self.next_block().ok_or_else(|| Error::PromptClosed {
            query: query.trim().to_string(),
        })
    }
}
