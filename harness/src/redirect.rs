// SPDX-License-Identifier: GPL-3.0-or-later

//! Scoped redirection of the standard streams of the linter.

use lintel::streams::{self, SharedBuffer};

/// Points the standard output and error of the linter to a buffer while it lives.
///
/// Dropping the guard points the streams back to the real ones. That happens
/// on every exit of the scope, unwinding included.
#[derive(Debug)]
pub struct StreamRedirect {
    sink: SharedBuffer,
}

impl StreamRedirect {
    pub fn install(sink: &SharedBuffer) -> Self {
        if let Some(previous) = streams::redirect(Some(sink.clone())) {
            log::debug!("Replaced a stale redirection ({} bytes captured)", previous.contents().len());
        }
        Self { sink: sink.clone() }
    }

    pub fn sink(&self) -> &SharedBuffer {
        &self.sink
    }
}

impl Drop for StreamRedirect {
    fn drop(&mut self) {
        streams::restore();
    }
}

/// Runs the region with the streams redirected to the sink.
pub fn with_redirect<T>(sink: &SharedBuffer, region: impl FnOnce() -> T) -> T {
    let _redirect = StreamRedirect::install(sink);
    region()
}
