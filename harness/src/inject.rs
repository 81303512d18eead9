// SPDX-License-Identifier: GPL-3.0-or-later

//! Providing the module text which the linter reads from the standard input.
//!
//! With `--from-stdin <path>` the linter takes the name and the location of
//! the module from the path, but reads the content through its standard input
//! hook. Installing an [`InjectedSource`] makes that hook return a fixed text,
//! while the siblings of the path are still looked up on the disk.

use lintel::source::{self, StdinSource};
use mockall::mock;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

// Answers the reads of the standard input with a fixed text.
mock! {
    Source {}

    impl StdinSource for Source {
        fn read(&mut self) -> io::Result<String>;
    }
}

/// A module path and the text which stands for its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualSource {
    path: String,
    text: String,
}

impl VirtualSource {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectionError {
    #[error("The text of '{path}' was read {calls} times instead of once")]
    UnexpectedReads { path: String, calls: usize },
}

/// The installed virtual source. Dropping it gives back the real standard input.
#[derive(Debug)]
pub struct InjectedSource {
    source: VirtualSource,
    calls: Arc<AtomicUsize>,
}

impl InjectedSource {
    pub fn install(source: VirtualSource) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut stub = MockSource::new();
        let text = source.text.clone();
        let counter = Arc::clone(&calls);
        stub.expect_read().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(text.clone())
        });
        if source::set_stdin_source(Box::new(stub)).is_some() {
            log::debug!("Replaced a stale standard input source");
        }
        Self { source, calls }
    }

    pub fn source(&self) -> &VirtualSource {
        &self.source
    }

    /// How many times the linter has read the text so far.
    ///
    /// The stub answers any number of reads, so a run which reads twice
    /// still finishes, and the count shows what happened.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn assert_called_once(&self) -> Result<(), InjectionError> {
        match self.call_count() {
            1 => Ok(()),
            calls => Err(InjectionError::UnexpectedReads { path: self.source.path.clone(), calls }),
        }
    }
}

impl Drop for InjectedSource {
    fn drop(&mut self) {
        source::reset_stdin_source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusive;

    #[test]
    fn test_reads_are_counted() {
        let _guard = exclusive();
        let injected = InjectedSource::install(VirtualSource::new("a/b.py", "import os\n"));

        assert_eq!(
            injected.assert_called_once(),
            Err(InjectionError::UnexpectedReads { path: String::from("a/b.py"), calls: 0 })
        );
        assert_eq!(source::read_stdin().unwrap(), "import os\n");
        assert!(injected.assert_called_once().is_ok());
        assert_eq!(source::read_stdin().unwrap(), "import os\n");
        assert_eq!(injected.call_count(), 2);
        assert!(injected.assert_called_once().is_err());
    }

    #[test]
    fn test_drop_resets_the_hook() {
        let _guard = exclusive();
        {
            let injected = InjectedSource::install(VirtualSource::new("m.py", "pass\n"));
            assert_eq!(injected.source().text(), "pass\n");
        }

        assert!(source::reset_stdin_source().is_none());
    }
}
