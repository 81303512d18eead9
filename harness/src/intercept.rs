// SPDX-License-Identifier: GPL-3.0-or-later

//! Running the entry point of the linter and recovering its exit status.
//!
//! A run of the linter never returns: it ends with an unwinding which
//! carries an [`ExitSignal`]. The interceptor catches that and gives back the
//! status code as a value. Anything else is a failure of the harness usage.

use lintel::exit::{self, ExitSignal};
use lintel::reporter::Reporter;
use log::LevelFilter;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Appended to every invocation, so the runs do not share the statistics on disk.
pub const DISABLE_PERSISTENCE: &str = "--persistent=no";

/// The configuration file of the runs, unless the arguments name one.
///
/// With an explicit file the linter ignores `$LINTELRC`, a `lintel.yml` in the
/// working directory and the configuration directories of the user.
pub const ISOLATED_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/isolated.yml");

/// The command line arguments of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    arguments: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        if !arguments.iter().any(|argument| argument.starts_with("--rcfile")) {
            arguments.push(format!("--rcfile={ISOLATED_CONFIG}"));
        }
        arguments.push(String::from(DISABLE_PERSISTENCE));
        Self { arguments }
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Runs the linter with these arguments, and returns its status code.
    pub fn run(&self, reporter: Option<&mut dyn Reporter>) -> Result<i32, InterceptError> {
        log::debug!("Running: {self}");
        let arguments = self.arguments.clone();
        run_entry_point(move || {
            lintel::run(arguments, reporter);
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lintel {}", self.arguments.join(" "))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterceptError {
    #[error("The entry point returned without an exit signal")]
    Returned,
    #[error("The entry point panicked: {0}")]
    Panicked(String),
}

/// Calls the entry point and converts its exit signal into the returned status code.
///
/// Warnings logged during the call are suppressed.
pub fn run_entry_point<F>(entry: F) -> Result<i32, InterceptError>
where
    F: FnOnce(),
{
    let _quiet = QuietLogs::install();
    match panic::catch_unwind(AssertUnwindSafe(entry)) {
        Ok(()) => Err(InterceptError::Returned),
        Err(payload) => match ExitSignal::from_payload(payload) {
            Ok(signal) => Ok(signal.code()),
            Err(payload) => Err(InterceptError::Panicked(exit::describe_payload(payload.as_ref()))),
        },
    }
}

/// Lowers the maximum log level to errors while it lives.
#[derive(Debug)]
pub struct QuietLogs {
    previous: LevelFilter,
}

impl QuietLogs {
    pub fn install() -> Self {
        let previous = log::max_level();
        log::set_max_level(previous.min(LevelFilter::Error));
        Self { previous }
    }
}

impl Drop for QuietLogs {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}
