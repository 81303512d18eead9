// SPDX-License-Identifier: GPL-3.0-or-later

//! Statistics of a run, the evaluation score, and their persistence.
//!
//! The statistics of a run are stored in the home directory of the linter,
//! so the next run over the same module can report the previous score.

use crate::context::Context;
use crate::environment::KEY_LINTEL__HOME;
use crate::message::{Category, Message};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Message and statement counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub statements: usize,
    pub fatal: usize,
    pub error: usize,
    pub warning: usize,
    pub refactor: usize,
    pub convention: usize,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Statistics {
    pub fn count(&mut self, message: &Message) {
        match message.category() {
            Category::Fatal => self.fatal += 1,
            Category::Error => self.error += 1,
            Category::Warning => self.warning += 1,
            Category::Refactor => self.refactor += 1,
            Category::Convention => self.convention += 1,
        }
    }

    /// The score of the run, out of 10. There is no score without statements.
    pub fn evaluate(&self) -> Option<f64> {
        if self.statements == 0 {
            return None;
        }
        let weighted = (5 * self.error + self.warning + self.refactor + self.convention) as f64;
        let score = 10.0 - weighted / self.statements as f64 * 10.0;
        Some(score.max(0.0))
    }
}

/// The outcome of a run, as shown in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluation {
    pub score: Option<f64>,
    pub previous: Option<f64>,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access statistics file '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse statistics file '{path}': {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The directory where the statistics of the runs are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsStore {
    home: PathBuf,
}

impl StatsStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Locates the home from the `LINTELHOME` variable, or the cache directory of the user.
    pub fn locate(context: &Context) -> Option<Self> {
        if let Some(home) = context.variable(KEY_LINTEL__HOME) {
            return Some(Self::new(context.current_directory.join(home)));
        }
        ProjectDirs::from("", "", "lintel").map(|dirs| Self::new(dirs.cache_dir()))
    }

    /// The file of the statistics for a module.
    pub fn path_for(&self, base: &str) -> PathBuf {
        self.home.join(format!("{base}1.stats"))
    }

    /// Loads the statistics of the previous run. A missing file is not an error.
    pub fn load(&self, base: &str) -> Result<Option<Statistics>, PersistenceError> {
        let path = self.path_for(base);
        if !path.is_file() {
            log::debug!("No previous statistics at {}", path.display());
            return Ok(None);
        }
        let content =
            fs::read(&path).map_err(|source| PersistenceError::FileAccess { path: path.clone(), source })?;
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| PersistenceError::Format { path, source })
    }

    pub fn save(&self, base: &str, statistics: &Statistics) -> Result<(), PersistenceError> {
        let path = self.path_for(base);
        let access = |source| PersistenceError::FileAccess { path: path.clone(), source };
        fs::create_dir_all(&self.home).map_err(access)?;
        let content = serde_json::to_vec_pretty(statistics)
            .map_err(|source| PersistenceError::Format { path: path.clone(), source })?;
        fs::write(&path, content).map_err(access)?;
        log::debug!("Statistics saved to {}", path.display());
        Ok(())
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
