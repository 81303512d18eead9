// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration test cases for the harness
//!
//! - `stdin`: Modules given with `--from-stdin`, with their text injected
//! - `exit_codes`: Exit status of the usage errors and the message categories
//! - `reporters`: Runs with a reporter given by the test
//! - `configuration`: Runs are not affected by the configuration of the user
//! - `linter`: A linter set up with the checker and the controls of the test

pub mod configuration;
pub mod exit_codes;
pub mod linter;
pub mod reporters;
pub mod stdin;
