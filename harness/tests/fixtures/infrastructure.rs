// SPDX-License-Identifier: GPL-3.0-or-later

//! Test infrastructure for the harness integration tests
//!
//! The linter reads the modules (and the siblings of an injected module)
//! from the disk. These helpers build small module trees in temporary
//! directories, and switch the working directory while a test runs.
//!
//! The working directory and the environment are process-wide. Tests which
//! change them must hold a `RunTester` (which serializes the invocations)
//! for as long as the `WorkingDirectory` or `Variable` guard lives. Declare
//! the tester first, so it is dropped last.

use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The directory of the fixture files checked into the repository.
pub const HERE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests");

/// The absolute path of a fixture file checked into the repository.
pub fn fixture(name: &str) -> String {
    format!("{HERE}/{name}")
}

/// A temporary directory with Python modules and packages in it.
#[derive(Debug)]
pub struct ModuleTree {
    root: TempDir,
}

impl ModuleTree {
    pub fn new() -> Result<Self> {
        let root = TempDir::new().context("Failed to create temp dir for the module tree")?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a package directory with an empty `__init__.py` in it.
    pub fn package(&self, name: &str) -> Result<&Self> {
        self.root.child(name).create_dir_all().with_context(|| format!("Failed to create package: {name}"))?;
        self.root
            .child(format!("{name}/__init__.py"))
            .touch()
            .with_context(|| format!("Failed to create package marker: {name}"))?;
        Ok(self)
    }

    /// Writes a module file, relative to the root of the tree.
    pub fn module(&self, path: &str, content: &str) -> Result<&Self> {
        self.root.child(path).write_str(content).with_context(|| format!("Failed to write module: {path}"))?;
        Ok(self)
    }
}

/// Changes the current working directory while it lives.
#[derive(Debug)]
pub struct WorkingDirectory {
    previous: PathBuf,
}

impl WorkingDirectory {
    pub fn enter(path: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to get the working directory")?;
        env::set_current_dir(path).with_context(|| format!("Failed to change directory to {}", path.display()))?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        if let Err(error) = env::set_current_dir(&self.previous) {
            eprintln!("Failed to restore the working directory {}: {error}", self.previous.display());
        }
    }
}

/// Sets an environment variable while it lives.
#[derive(Debug)]
pub struct Variable {
    key: &'static str,
    previous: Option<OsString>,
}

impl Variable {
    pub fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let previous = env::var_os(key);
        // SAFETY: the caller holds the invocation lock, and the linter reads
        // the environment only inside an invocation.
        unsafe { env::set_var(key, value) };
        Self { key, previous }
    }
}

impl Drop for Variable {
    fn drop(&mut self) {
        // SAFETY: see `Variable::set`.
        match &self.previous {
            Some(value) => unsafe { env::set_var(self.key, value) },
            None => unsafe { env::remove_var(self.key) },
        }
    }
}
