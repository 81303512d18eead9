// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. Command line options are applied
//! on top of it.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `lintel.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The file given with the `--rcfile` option
//! 2. The file named by the `LINTELRC` environment variable
//! 3. The current working directory
//! 4. The local configuration directory of the user
//! 5. The configuration directory of the user
//!
//! ```yaml
//! schema: 1.0
//!
//! disable: [all]
//! enable: [unused-import, import-error]
//!
//! persistent: false
//! score: true
//!
//! known_modules: [numpy, yaml]
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::{ValidationError, Validator};

mod types {
    use crate::message::Control;
    use serde::Deserialize;
    use std::fmt;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        /// Messages to enable, applied after the disabled ones.
        #[serde(default)]
        pub enable: Vec<String>,
        /// Messages to disable.
        #[serde(default)]
        pub disable: Vec<String>,
        /// Compare with and store the statistics of the previous run.
        #[serde(default = "default_true")]
        pub persistent: bool,
        /// Print the evaluation score.
        #[serde(default = "default_true")]
        pub score: bool,
        /// Top-level modules which resolve without being found on the disk.
        #[serde(default)]
        pub known_modules: Vec<String>,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                enable: vec![],
                disable: vec![],
                persistent: true,
                score: true,
                known_modules: vec![],
            }
        }
    }

    impl Main {
        /// The message controls of the configuration, in the order to apply them.
        pub fn controls(&self) -> Vec<Control> {
            let disabled = self.disable.iter().cloned().map(Control::Disable);
            let enabled = self.enable.iter().cloned().map(Control::Enable);
            disabled.chain(enabled).collect()
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            let yaml_string = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            for line in yaml_string.lines() {
                writeln!(f, "{}", line)?;
            }
            Ok(())
        }
    }

    fn default_true() -> bool {
        true
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use crate::message::{Control, MessageFilter};
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error, PartialEq)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: &'static str },
        #[error("Unknown message '{name}' in field '{field}'")]
        UnknownMessage { field: &'static str, name: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            let names = config
                .disable
                .iter()
                .map(|name| ("disable", name))
                .chain(config.enable.iter().map(|name| ("enable", name)));
            for (field, name) in names {
                if MessageFilter::default().apply(&[Control::Enable(name.clone())]).is_err() {
                    collector.add(ValidationError::UnknownMessage { field, name: name.clone() });
                }
            }

            if config.known_modules.iter().any(|module| module.trim().is_empty()) {
                collector.add(ValidationError::EmptyString { field: "known_modules" });
            }

            collector.finish()
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use crate::context::Context;
    use crate::environment::KEY_LINTEL__RCFILE;
    use directories::BaseDirs;
    use log::{debug, info};
    use std::fs;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    const CONFIG_FILE_NAME: &str = "lintel.yml";

    pub struct Loader {}

    impl Loader {
        /// Finds the configuration of the run.
        ///
        /// An explicit `--rcfile` wins over `$LINTELRC`, which wins over the search of the
        /// directories. Relative names are taken from the working directory. Without any
        /// file the built-in defaults apply.
        pub fn load(context: &Context, filename: &Option<String>) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(&context.current_directory.join(path));
            }
            if let Some(path) = context.variable(KEY_LINTEL__RCFILE) {
                debug!("Configuration file from environment: {path}");
                return Self::from_file(&context.current_directory.join(path));
            }
            for location in Self::file_locations(context) {
                debug!("Checking configuration file: {}", location.display());
                if location.is_file() {
                    return Self::from_file(location.as_path());
                }
            }
            debug!("Configuration file not found. Using the default configuration.");
            Ok(Main::default())
        }

        /// The candidate `lintel.yml` files: working directory first, then the user directories.
        fn file_locations(context: &Context) -> Vec<PathBuf> {
            let mut locations = vec![context.current_directory.clone()];
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }
            locations.dedup();
            locations.iter().map(|p| p.join(CONFIG_FILE_NAME)).collect()
        }

        /// Reads a `lintel.yml` file, and checks the message and module names in it.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Using configuration: {}", path.display());

            let text = fs::read_to_string(path)
                .map_err(|source| ConfigError::Unreadable { path: path.to_path_buf(), source })?;
            let content = Self::parse(&text)
                .map_err(|source| ConfigError::Malformed { path: path.to_path_buf(), source })?;
            Main::validate(&content)
                .map_err(|source| ConfigError::Invalid { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        fn parse(text: &str) -> serde_yml::Result<Main> {
            serde_yml::from_str(text)
        }
    }

    /// Why a configuration file could not be used. The run stops with a usage error.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("Can not read the configuration '{path}': {source}")]
        Unreadable {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Not YAML, unknown schema version, or a field of the wrong type.
        #[error("Malformed configuration '{path}': {source}")]
        Malformed {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        #[error("Invalid configuration '{path}': {source}")]
        Invalid {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
