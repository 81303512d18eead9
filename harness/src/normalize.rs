// SPDX-License-Identifier: GPL-3.0-or-later

//! Removes the machine specific part of the paths from the captured output.
//!
//! The fixtures of the tests live under the directory of this crate. The
//! linter reports them with absolute paths, which differ from machine to
//! machine. Both the expected and the actual text pass the normalizer before
//! they are compared.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Rewrites the paths under a root directory to relative ones.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    prefix: Regex,
}

impl PathNormalizer {
    pub fn new(root: &str) -> Result<Self, regex_lite::Error> {
        let root = root.replace('\\', "/");
        let root = root.trim_end_matches('/');
        let prefix = Regex::new(&format!("(?m){}/", regex_lite::escape(root)))?;
        Ok(Self { prefix })
    }

    /// Converts the separators to slashes, and drops every occurrence of the root prefix.
    ///
    /// Normalizing a normalized text gives the same text.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = text.replace('\\', "/");
        loop {
            let next = self.prefix.replace_all(&current, "");
            if next == current {
                return current;
            }
            current = next.into_owned();
        }
    }
}

static NORMALIZER: LazyLock<PathNormalizer> = LazyLock::new(|| {
    PathNormalizer::new(env!("CARGO_MANIFEST_DIR")).expect("Invalid root directory pattern")
});

/// Normalizes the text with the directory of this crate as root.
pub fn clean_paths(text: &str) -> String {
    NORMALIZER.normalize(text)
}
