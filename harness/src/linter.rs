// SPDX-License-Identifier: GPL-3.0-or-later

//! A linter set up by the test itself, instead of from the command line.
//!
//! The command line runs of [`crate::RunTester`] exercise the whole program.
//! A [`ConfiguredLinter`] skips the argument parsing and the configuration
//! file: the test chooses an extra checker and the messages to enable or
//! disable, and reads the results from a [`MinimalReporter`].

use crate::inject::{InjectedSource, VirtualSource};
use anyhow::{Context as _, Result};
use lintel::Linter;
use lintel::checkers::{self, Checker};
use lintel::context::Context;
use lintel::message::Control;
use lintel::reporter::MinimalReporter;
use std::collections::HashMap;
use std::env;
use std::sync::MutexGuard;

/// The outcome of one check.
#[derive(Debug)]
pub struct Checked {
    pub status: i32,
    pub reporter: MinimalReporter,
}

/// A linter with the default checkers, an optional extra checker and the given controls.
///
/// It sees no environment variables, reads no configuration file and keeps
/// no statistics. Like [`crate::RunTester`], it holds the invocation lock
/// while it lives.
pub struct ConfiguredLinter {
    linter: Linter,
    _session: MutexGuard<'static, ()>,
}

impl ConfiguredLinter {
    /// Registers the checker after the default ones, then disables and enables the messages.
    pub fn new(checker: Option<Box<dyn Checker>>, enable: &[&str], disable: &[&str]) -> Result<Self> {
        let session = crate::exclusive();
        let current_directory = env::current_dir().context("Failed to get the working directory")?;
        let mut linter = Linter::new(Context { current_directory, environment: HashMap::new() });

        for default in checkers::default_checkers() {
            linter.register_checker(default);
        }
        if let Some(checker) = checker {
            linter.register_checker(checker);
        }
        let disabled = disable.iter().map(|name| Control::Disable(name.to_string()));
        let enabled = enable.iter().map(|name| Control::Enable(name.to_string()));
        linter.apply(&disabled.chain(enabled).collect::<Vec<_>>())?;

        Ok(Self { linter, _session: session })
    }

    pub fn linter(&mut self) -> &mut Linter {
        &mut self.linter
    }

    /// Checks files, package directories or dotted module names.
    pub fn check(&self, modules: &[&str]) -> Result<Checked> {
        let modules: Vec<String> = modules.iter().map(|module| module.to_string()).collect();
        self.run(&modules, false)
    }

    /// Checks the text of the source as if it was piped to the linter for its path.
    ///
    /// Fails when the text was not read exactly once.
    pub fn check_stdin(&self, source: VirtualSource) -> Result<Checked> {
        let modules = vec![source.path().to_string()];
        let injected = InjectedSource::install(source);
        let checked = self.run(&modules, true)?;
        injected.assert_called_once()?;
        Ok(checked)
    }

    fn run(&self, modules: &[String], from_stdin: bool) -> Result<Checked> {
        let mut reporter = MinimalReporter::new();
        let status = self
            .linter
            .check(modules, from_stdin, &mut reporter)
            .with_context(|| format!("Failed to check {modules:?}"))?;
        Ok(Checked { status, reporter })
    }
}
