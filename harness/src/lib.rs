// SPDX-License-Identifier: GPL-3.0-or-later

//! In-process invocation harness for the `lintel` linter.
//!
//! The harness runs the entry point of the linter inside the test process,
//! captures everything it prints, recovers its exit status, and compares the
//! output with the expectations of the test. The building blocks:
//!
//! - [`redirect`]: scoped redirection of the standard streams into a buffer,
//! - [`intercept`]: turns the exit signal of a run into a return value,
//! - [`inject`]: provides the text read as the standard input,
//! - [`normalize`]: removes machine specific paths from the output,
//! - [`RunTester`]: the assertions the test cases use,
//! - [`ConfiguredLinter`]: a linter with the checkers and controls a test chooses.
//!
//! The streams and the standard input of the linter are process-wide, so the
//! invocations are serialized with [`exclusive`].

pub mod inject;
pub mod intercept;
pub mod linter;
pub mod normalize;
pub mod redirect;
mod tester;

pub use linter::ConfiguredLinter;
pub use tester::RunTester;

use std::sync::{Mutex, MutexGuard, PoisonError};

static SESSION: Mutex<()> = Mutex::new(());

/// Waits until no other invocation is running, and blocks others while the guard lives.
///
/// A test which failed while holding the lock does not block the others.
pub fn exclusive() -> MutexGuard<'static, ()> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}
