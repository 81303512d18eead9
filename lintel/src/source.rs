// SPDX-License-Identifier: GPL-3.0-or-later

//! Reading the source text of a module given on the standard input.
//!
//! When the linter runs with `--from-stdin`, the content of the module is
//! not read from the file system. It is obtained from [`read_stdin`], which
//! asks the installed [`StdinSource`]. By default that is [`ProcessStdin`],
//! the real standard input of the process. Embedders (and tests) can install
//! another source to provide the text from memory.

use std::io::{self, Read};
use std::sync::{Mutex, PoisonError};

/// Provides the text which is read as the standard input.
#[cfg_attr(test, mockall::automock)]
pub trait StdinSource: Send {
    /// Reads the whole input as text.
    fn read(&mut self) -> io::Result<String>;
}

/// The standard input of the current process.
#[derive(Debug, Default)]
pub struct ProcessStdin;

impl StdinSource for ProcessStdin {
    fn read(&mut self) -> io::Result<String> {
        let mut content = String::new();
        io::stdin().lock().read_to_string(&mut content)?;
        Ok(content)
    }
}

/// The installed source. `None` means the process standard input.
static SOURCE: Mutex<Option<Box<dyn StdinSource>>> = Mutex::new(None);

/// Reads the source text given on the standard input.
pub fn read_stdin() -> io::Result<String> {
    let mut slot = SOURCE.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(source) => source.read(),
        None => ProcessStdin.read(),
    }
}

/// Installs a source for the standard input. Returns the previously installed one.
pub fn set_stdin_source(source: Box<dyn StdinSource>) -> Option<Box<dyn StdinSource>> {
    let mut slot = SOURCE.lock().unwrap_or_else(PoisonError::into_inner);
    slot.replace(source)
}

/// Removes the installed source, the process standard input is used again.
pub fn reset_stdin_source() -> Option<Box<dyn StdinSource>> {
    let mut slot = SOURCE.lock().unwrap_or_else(PoisonError::into_inner);
    slot.take()
}
