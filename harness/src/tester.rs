// SPDX-License-Identifier: GPL-3.0-or-later

use crate::inject::{InjectedSource, VirtualSource};
use crate::intercept::{Invocation, InterceptError};
use crate::normalize::clean_paths;
use crate::redirect::with_redirect;
use anyhow::{Result, bail};
use lintel::reporter::{BufferedOutput, Reporter};
use lintel::streams::SharedBuffer;
use std::sync::MutexGuard;

/// Runs the linter in-process and checks the results.
///
/// A tester holds the process-wide invocation lock for its whole life, so
/// one test runs the linter at a time. The runs use the configuration file
/// of the harness, unless the arguments name one. Create one per test:
///
/// ```ignore
/// let mut tester = RunTester::new();
/// tester.inject_stdin(VirtualSource::new("mymodule.py", "import os\n"));
/// tester.check_output(
///     &["--from-stdin", "mymodule.py", "--enable=unused-import", "--disable=all"],
///     "mymodule.py:1:0: W0611: Unused import os (unused-import)",
/// )?;
/// tester.injected().context("no stdin source installed")?.assert_called_once()?;
/// ```
pub struct RunTester {
    injected: Option<InjectedSource>,
    _session: MutexGuard<'static, ()>,
}

impl RunTester {
    pub fn new() -> Self {
        Self { injected: None, _session: crate::exclusive() }
    }

    /// Makes the next runs read the given text as standard input.
    pub fn inject_stdin(&mut self, source: VirtualSource) -> &InjectedSource {
        // The previous source resets the hook on drop, so it goes first.
        self.injected = None;
        self.injected.insert(InjectedSource::install(source))
    }

    pub fn injected(&self) -> Option<&InjectedSource> {
        self.injected.as_ref()
    }

    /// Runs the linter with the output captured into the sink. Returns the exit status.
    pub fn run_linter(
        &self,
        arguments: &[&str],
        sink: &SharedBuffer,
        reporter: Option<&mut dyn Reporter>,
    ) -> Result<i32, InterceptError> {
        let invocation = Invocation::new(arguments.iter().copied());
        with_redirect(sink, || invocation.run(reporter))
    }

    /// Runs the linter and checks the exit status.
    pub fn runtest(&self, arguments: &[&str], code: i32) -> Result<()> {
        let sink = SharedBuffer::new();
        let actual = self.run_linter(arguments, &sink, None)?;
        Self::check_status(actual, code, &sink.contents())
    }

    /// Runs the linter with the given reporter and checks the exit status.
    pub fn runtest_with_reporter<R>(&self, arguments: &[&str], reporter: &mut R, code: i32) -> Result<()>
    where
        R: Reporter + BufferedOutput,
    {
        let sink = SharedBuffer::new();
        let actual = self.run_linter(arguments, &sink, Some(&mut *reporter))?;
        Self::check_status(actual, code, &format!("{}{}", sink.contents(), reporter.output()))
    }

    /// Runs the linter and checks that the output contains the expected text.
    pub fn check_output(&self, arguments: &[&str], expected: &str) -> Result<()> {
        let sink = SharedBuffer::new();
        self.run_linter(arguments, &sink, None)?;
        Self::check_contains(&sink.contents(), expected)
    }

    /// Runs the linter and checks that the output of the reporter contains the expected text.
    ///
    /// What the run prints to the streams is not considered.
    pub fn check_output_with_reporter<R>(&self, arguments: &[&str], expected: &str, reporter: &mut R) -> Result<()>
    where
        R: Reporter + BufferedOutput,
    {
        let sink = SharedBuffer::new();
        self.run_linter(arguments, &sink, Some(&mut *reporter))?;
        Self::check_contains(&reporter.output(), expected)
    }

    fn check_status(actual: i32, expected: i32, output: &str) -> Result<()> {
        if actual != expected {
            bail!("expected output status {expected}, got {actual}. Below lintel output: \n{output}");
        }
        Ok(())
    }

    fn check_contains(actual: &str, expected: &str) -> Result<()> {
        let actual = clean_paths(actual);
        let expected = clean_paths(expected);
        if !actual.trim().contains(expected.trim()) {
            bail!("expected output to contain:\n{}\nBelow lintel output: \n{}", expected.trim(), actual);
        }
        Ok(())
    }
}

impl Default for RunTester {
    fn default() -> Self {
        Self::new()
    }
}
