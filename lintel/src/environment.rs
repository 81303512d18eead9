// SPDX-License-Identifier: GPL-3.0-or-later

/// The directory where the statistics of previous runs are kept.
pub const KEY_LINTEL__HOME: &str = "LINTELHOME";
/// The configuration file to use, when not given on the command line.
pub const KEY_LINTEL__RCFILE: &str = "LINTELRC";

// https://docs.rs/env_logger
pub const KEY_LOG__FILTER: &str = "RUST_LOG";

/// Checks whether the environment variable changes the behavior of the application.
pub fn relevant_env(key: &str) -> bool {
    matches!(key, KEY_LINTEL__HOME | KEY_LINTEL__RCFILE | KEY_LOG__FILTER)
}
