//! Console output implementation

use crate::core::{LogLevel, Message, Output, Result, SharedFormatter};
use std::io::{self, Write};

/// Standard stream a console line is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Writes each formatted message as one line on the console.
///
/// By default `Error` and `Warn` go to stderr, everything else to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleOutput {
    split_streams: bool,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self {
            split_streams: true,
        }
    }

    /// Every level on stdout
    pub fn stdout_only() -> Self {
        Self {
            split_streams: false,
        }
    }

    pub fn stream_for(&self, level: LogLevel) -> ConsoleStream {
        match level {
            LogLevel::Error | LogLevel::Warn if self.split_streams => ConsoleStream::Stderr,
            _ => ConsoleStream::Stdout,
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for ConsoleOutput {
    fn emit(&self, message: &Message, formatter: &SharedFormatter) -> Result<()> {
        let line = formatter.format(message)?;

        match self.stream_for(message.level) {
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{}", line)?,
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{}", line)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both since levels are split across them
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
