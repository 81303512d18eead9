// SPDX-License-Identifier: GPL-3.0-or-later

//! Reporters present the messages and the evaluation of a run.

use crate::message::Message;
use crate::stats::Evaluation;
use crate::streams::{self, SharedBuffer, Stream};
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 66;

/// Receives the results of a run.
pub trait Reporter {
    /// Called before the messages of a module are handled.
    fn set_current_module(&mut self, module: &str) -> io::Result<()>;

    fn handle_message(&mut self, message: &Message) -> io::Result<()>;

    /// Called once at the end of the run.
    fn display_reports(&mut self, evaluation: &Evaluation) -> io::Result<()>;
}

/// A reporter which keeps its output in memory.
pub trait BufferedOutput {
    fn output(&self) -> String;
}

/// Prints the messages grouped by module, followed by the score.
pub struct TextReporter<W: Write> {
    out: W,
    module: String,
    header_written: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, module: String::new(), header_written: false }
    }
}

impl TextReporter<Stream> {
    /// The reporter of the command line, writing to the standard output.
    pub fn stdout() -> Self {
        Self::new(streams::stdout())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn set_current_module(&mut self, module: &str) -> io::Result<()> {
        self.module = module.to_string();
        self.header_written = false;
        Ok(())
    }

    fn handle_message(&mut self, message: &Message) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "************* Module {}", self.module)?;
            self.header_written = true;
        }
        writeln!(self.out, "{message}")
    }

    fn display_reports(&mut self, evaluation: &Evaluation) -> io::Result<()> {
        if let Some(score) = evaluation.score {
            write!(self.out, "\n{}\nYour code has been rated at {score:.2}/10", "-".repeat(SEPARATOR_WIDTH))?;
            if let Some(previous) = evaluation.previous {
                write!(self.out, " (previous run: {previous:.2}/10, {:+.2})", score - previous)?;
            }
            write!(self.out, "\n\n")?;
        }
        self.out.flush()
    }
}

impl BufferedOutput for TextReporter<SharedBuffer> {
    fn output(&self) -> String {
        self.out.contents()
    }
}

/// Collects the messages and their formatted lines, without headers or reports.
#[derive(Debug, Default)]
pub struct MinimalReporter {
    messages: Vec<Message>,
    out: String,
}

impl MinimalReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl Reporter for MinimalReporter {
    fn set_current_module(&mut self, _module: &str) -> io::Result<()> {
        Ok(())
    }

    fn handle_message(&mut self, message: &Message) -> io::Result<()> {
        self.out.push_str(&message.to_string());
        self.out.push('\n');
        self.messages.push(message.clone());
        Ok(())
    }

    fn display_reports(&mut self, _evaluation: &Evaluation) -> io::Result<()> {
        Ok(())
    }
}

impl BufferedOutput for MinimalReporter {
    fn output(&self) -> String {
        self.out.clone()
    }
}
