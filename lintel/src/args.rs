// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The module is defining types to represent a structured form of the
//! program invocation. The `Arguments` type is used to represent all
//! possible invocations of the program.

use crate::message::Control;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, ArgMatches, Command, arg, command};
use std::fmt;
use thiserror::Error;

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    /// The path of the configuration file.
    pub config: Option<String>,
    /// The modules to analyse: files, package directories or dotted names.
    pub modules: Vec<String>,
    /// Read the content of the single module from the standard input.
    pub from_stdin: bool,
    /// Message controls, in the order they were given.
    pub controls: Vec<Control>,
    /// Overrides of the configuration values.
    pub persistent: Option<bool>,
    pub score: Option<bool>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ArgumentError {
    #[error("Missing filename required for --from-stdin")]
    MissingStdinFilename,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = ArgumentError;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let modules: Vec<String> =
            matches.get_many::<String>("MODULES").map(|values| values.cloned().collect()).unwrap_or_default();
        let from_stdin = matches.get_flag("from-stdin");
        if from_stdin && modules.len() != 1 {
            return Err(ArgumentError::MissingStdinFilename);
        }

        Ok(Arguments {
            config: matches.get_one::<String>("rcfile").cloned(),
            modules,
            from_stdin,
            controls: controls(&matches),
            persistent: matches.get_one::<bool>("persistent").copied(),
            score: matches.get_one::<bool>("score").copied(),
        })
    }
}

/// Merges the enable and disable options in their command line order.
fn controls(matches: &ArgMatches) -> Vec<Control> {
    fn indexed(matches: &ArgMatches, id: &str, control: fn(String) -> Control) -> Vec<(usize, Control)> {
        match (matches.indices_of(id), matches.get_many::<String>(id)) {
            (Some(indices), Some(values)) => {
                indices.zip(values).map(|(index, value)| (index, control(value.trim().to_string()))).collect()
            }
            _ => Vec::new(),
        }
    }

    let mut result = indexed(matches, "enable", Control::Enable);
    result.extend(indexed(matches, "disable", Control::Disable));
    result.sort_by_key(|(index, _)| *index);
    result.into_iter().map(|(_, control)| control).collect()
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        writeln!(f, "  modules: {:?}", self.modules)?;
        writeln!(f, "  from stdin: {}", self.from_stdin)?;
        writeln!(f, "  controls: {:?}", self.controls)?;
        if let Some(config) = &self.config {
            writeln!(f, "  config: {config}")?;
        }
        Ok(())
    }
}

/// Represents the command line interface of the application.
pub fn cli() -> Command {
    command!("lintel").args(&[
        arg!([MODULES] ... "Files, package directories or dotted module names to analyse")
            .action(ArgAction::Append),
        arg!(--"from-stdin" "Read the content of the module from the standard input")
            .action(ArgAction::SetTrue),
        arg!(--enable <IDS> "Enable the messages, categories or 'all'")
            .action(ArgAction::Append)
            .value_delimiter(','),
        arg!(--disable <IDS> "Disable the messages, categories or 'all'")
            .action(ArgAction::Append)
            .value_delimiter(','),
        arg!(--persistent <YN> "Compare with and store the statistics of the previous run")
            .value_parser(BoolishValueParser::new()),
        arg!(--score <YN> "Print the evaluation score").value_parser(BoolishValueParser::new()),
        arg!(--rcfile <FILE> "Path of the config file"),
    ])
}
