// SPDX-License-Identifier: GPL-3.0-or-later

//! Termination of a lint run.
//!
//! A run never returns to its caller. It ends by unwinding with an
//! [`ExitSignal`] payload, which carries the status code of the run.
//! The binary turns the signal into the process exit code, while an
//! in-process caller can catch it and keep running.
//!
//! The unwinding is started with `resume_unwind`, so the panic hook is
//! not invoked and nothing is printed when the signal is raised.

use std::any::Any;
use std::fmt;
use std::panic;

/// The run found no problems.
pub const EXIT_OK: i32 = 0;
/// A fatal message was issued.
pub const EXIT_FATAL: i32 = 1;
/// An error message was issued.
pub const EXIT_ERROR: i32 = 2;
/// A warning message was issued.
pub const EXIT_WARNING: i32 = 4;
/// A refactor message was issued.
pub const EXIT_REFACTOR: i32 = 8;
/// A convention message was issued.
pub const EXIT_CONVENTION: i32 = 16;
/// The command line was not usable.
pub const EXIT_USAGE: i32 = 32;

/// The payload of the unwinding that ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignal {
    code: i32,
}

impl ExitSignal {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// The status code of the finished run.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Recovers the signal from a caught unwind payload.
    ///
    /// Payloads of a different kind are handed back untouched, so the caller
    /// can decide to resume the unwinding or report it.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Result<Self, Box<dyn Any + Send>> {
        payload.downcast::<ExitSignal>().map(|signal| *signal)
    }
}

impl fmt::Display for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit with status {}", self.code)
    }
}

/// Ends the current run with the given status code.
pub fn exit(code: i32) -> ! {
    log::debug!("Exit code: {code}");
    panic::resume_unwind(Box::new(ExitSignal::new(code)))
}

/// Extracts a readable message from a panic payload which is not an exit signal.
pub fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}
