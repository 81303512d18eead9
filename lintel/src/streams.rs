// SPDX-License-Identifier: GPL-3.0-or-later

//! Standard output and error streams of the application.
//!
//! Everything the linter prints goes through the writers of this module
//! instead of `std::io::stdout` and `std::io::stderr`. The target of these
//! writers is a process-wide slot: by default they write to the real
//! streams, but the slot can point to an in-memory buffer. In that case
//! both streams write into the same buffer, in the order of the writes.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The process-wide redirection target. `None` means the real streams.
static TARGET: Mutex<Option<SharedBuffer>> = Mutex::new(None);

/// An in-memory byte buffer which can be shared between writers.
///
/// Cloning the buffer gives another handle to the same content.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    content: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written content as text. Invalid UTF-8 sequences are replaced.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Checks whether two handles refer to the same buffer.
    pub fn same_as(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.content, &other.content)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.content.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Points both streams to the given buffer, or back to the real streams on `None`.
///
/// Returns the previous target.
pub fn redirect(target: Option<SharedBuffer>) -> Option<SharedBuffer> {
    let mut slot = TARGET.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, target)
}

/// Points both streams back to the real standard output and error.
pub fn restore() {
    if redirect(None).is_some() {
        log::debug!("Standard streams restored");
    }
}

/// Returns the current redirection target, if any.
pub fn current() -> Option<SharedBuffer> {
    TARGET.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// The kind of the stream a writer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Out,
    Err,
}

/// A writer to the standard output or error of the application.
///
/// The target is looked up at every write, so a writer created before a
/// redirection follows the redirection.
#[derive(Debug, Clone, Copy)]
pub struct Stream {
    kind: Kind,
}

/// The standard output of the application.
pub fn stdout() -> Stream {
    Stream { kind: Kind::Out }
}

/// The standard error of the application.
pub fn stderr() -> Stream {
    Stream { kind: Kind::Err }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match (current(), self.kind) {
            (Some(mut buffer), _) => buffer.write(buf),
            (None, Kind::Out) => io::stdout().write(buf),
            (None, Kind::Err) => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match (current(), self.kind) {
            (Some(_), _) => Ok(()),
            (None, Kind::Out) => io::stdout().flush(),
            (None, Kind::Err) => io::stderr().flush(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static GLOBALS: Mutex<()> = Mutex::new(());

    /// Serializes the unit tests which touch process-wide state.
    pub(crate) fn exclusive() -> MutexGuard<'static, ()> {
        GLOBALS.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
