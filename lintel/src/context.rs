// SPDX-License-Identifier: GPL-3.0-or-later

use crate::environment;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// The process state a run depends on.
///
/// Captured once at the start of a run. Configuration discovery and the
/// statistics store look up the working directory and the variables here,
/// instead of querying the process again.
#[derive(Debug, Clone)]
pub struct Context {
    /// The directory relative paths of the command line are resolved against.
    pub current_directory: PathBuf,
    pub environment: HashMap<String, String>,
}

impl Context {
    pub fn capture() -> Result<Self> {
        let current_directory = env::current_dir().context("Failed to get the working directory")?;
        let environment = env::vars().collect();

        Ok(Self { current_directory, environment })
    }

    /// Returns the value of an environment variable, unless it is empty.
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Context:")?;
        writeln!(f, "  working directory: {}", self.current_directory.display())?;
        writeln!(f, "  environment: {} variables", self.environment.len())?;

        let mut relevant: Vec<_> =
            self.environment.iter().filter(|(key, _)| environment::relevant_env(key)).collect();
        relevant.sort();
        for (key, value) in relevant {
            writeln!(f, "    {key}={value}")?;
        }
        Ok(())
    }
}
