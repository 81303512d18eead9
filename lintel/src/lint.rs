// SPDX-License-Identifier: GPL-3.0-or-later

//! The entry point of a lint run.
//!
//! [`run`] parses the command line, loads the configuration, checks the
//! requested modules and hands the results to a reporter. It never returns:
//! the run ends with [`exit::exit`], carrying the status code.

use crate::args::{self, ArgumentError, Arguments};
use crate::checkers::{self, CheckedModule, Checker};
use crate::config::{self, ConfigError};
use crate::context::Context;
use crate::exit;
use crate::message::{Control, ControlError, FATAL, Message, MessageDefinition, MessageFilter, SYNTAX_ERROR};
use crate::modules::{self, ModuleDescription, ModuleResolver};
use crate::reporter::{Reporter, TextReporter};
use crate::source;
use crate::stats::{Evaluation, Statistics, StatsStore};
use crate::streams;
use crate::syntax;
use clap::error::ErrorKind;
use std::io::{self, Write};
use std::{fs, iter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Context(#[from] anyhow::Error),
    #[error("{}", .0.to_string().trim_end())]
    CommandLine(#[from] clap::Error),
    #[error(transparent)]
    Arguments(#[from] ArgumentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("Failed to write the report: {0}")]
    Output(#[from] io::Error),
}

impl RunError {
    /// The status code a run ends with after this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::CommandLine(_) | RunError::Arguments(_) | RunError::Config(_) | RunError::Control(_) => {
                exit::EXIT_USAGE
            }
            RunError::Context(_) | RunError::Output(_) => exit::EXIT_FATAL,
        }
    }
}

/// Runs the linter with the given command line arguments, without the program name.
///
/// The results go to the given reporter, or to the standard output when none is given.
pub fn run(args: Vec<String>, reporter: Option<&mut dyn Reporter>) -> ! {
    let status = match execute(args, reporter) {
        Ok(status) => status,
        Err(error) => {
            log::debug!("Run failed: {error:?}");
            // Nothing is left to report the failure to, when the stream itself fails.
            let _ = writeln!(streams::stderr(), "{error}");
            error.exit_code()
        }
    };
    exit::exit(status)
}

fn execute(args: Vec<String>, reporter: Option<&mut dyn Reporter>) -> Result<i32, RunError> {
    let context = Context::capture()?;
    log::debug!("{context}");

    if args.is_empty() {
        write!(streams::stdout(), "{}", args::cli().render_help())?;
        return Ok(exit::EXIT_USAGE);
    }
    let matches = match args::cli().try_get_matches_from(iter::once(String::from("lintel")).chain(args)) {
        Ok(matches) => matches,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(streams::stdout(), "{}", error.render())?;
            return Ok(exit::EXIT_OK);
        }
        Err(error) => return Err(error.into()),
    };
    let arguments = Arguments::try_from(matches)?;
    log::info!("{arguments}");

    let configuration = config::Loader::load(&context, &arguments.config)?;
    log::info!("{configuration}");

    let mut linter = Linter::new(context);
    linter.apply(&configuration.controls())?;
    linter.apply(&arguments.controls)?;
    for checker in checkers::default_checkers() {
        linter.register_checker(checker);
    }
    linter.set_known_modules(configuration.known_modules);
    linter.set_persistent(arguments.persistent.unwrap_or(configuration.persistent));
    linter.set_score(arguments.score.unwrap_or(configuration.score));

    match reporter {
        Some(reporter) => linter.check(&arguments.modules, arguments.from_stdin, reporter),
        None => linter.check(&arguments.modules, arguments.from_stdin, &mut TextReporter::stdout()),
    }
}

/// Checks modules with the registered checkers, and reports the enabled messages.
///
/// The command line builds one with the default checkers and the configured
/// controls. Tests build one with the single checker they exercise.
pub struct Linter {
    context: Context,
    filter: MessageFilter,
    checkers: Vec<Box<dyn Checker>>,
    known_modules: Vec<String>,
    persistent: bool,
    score: bool,
}

impl Linter {
    /// A linter without checkers, with every message enabled, which keeps no statistics.
    pub fn new(context: Context) -> Self {
        Self {
            context,
            filter: MessageFilter::default(),
            checkers: Vec::new(),
            known_modules: Vec::new(),
            persistent: false,
            score: true,
        }
    }

    pub fn register_checker(&mut self, checker: Box<dyn Checker>) {
        log::debug!("Registered checker {}", checker.name());
        self.checkers.push(checker);
    }

    /// Enables or disables messages. See [`MessageFilter::apply`] for the order.
    pub fn apply(&mut self, controls: &[Control]) -> Result<(), ControlError> {
        self.filter.apply(controls)
    }

    pub fn is_enabled(&self, definition: &MessageDefinition) -> bool {
        self.filter.is_enabled(definition)
    }

    pub fn set_known_modules(&mut self, known_modules: Vec<String>) {
        self.known_modules = known_modules;
    }

    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    pub fn set_score(&mut self, score: bool) {
        self.score = score;
    }

    /// Checks the modules and reports the results. Returns the status code.
    ///
    /// With `from_stdin` the single module is read through the standard input hook.
    pub fn check(&self, modules: &[String], from_stdin: bool, reporter: &mut dyn Reporter) -> Result<i32, RunError> {
        let cwd = &self.context.current_directory;
        let modules = if from_stdin {
            modules.iter().map(|path| Ok(ModuleDescription::from_path(path, cwd))).collect()
        } else {
            modules::expand_modules(modules, cwd)
        };

        let mut statistics = Statistics::default();
        let mut status = exit::EXIT_OK;
        let mut base_name = None;
        for module in modules {
            let (name, mut messages) = match module {
                Ok(description) => {
                    base_name.get_or_insert_with(|| description.name.clone());
                    let messages = self.check_module(&description, from_stdin, &mut statistics);
                    (description.name, messages)
                }
                Err(error) => {
                    let name = match &error {
                        modules::ResolveError::NotFound(name) => name.clone(),
                        modules::ResolveError::BeyondTopLevel => String::new(),
                    };
                    let message = Message {
                        definition: FATAL,
                        module: name.clone(),
                        path: name.clone(),
                        line: 1,
                        column: 0,
                        text: error.to_string(),
                    };
                    (name, vec![message])
                }
            };
            messages.retain(|message| self.filter.is_enabled(&message.definition));
            messages.sort_by_key(|message| (message.line, message.column));

            reporter.set_current_module(&name)?;
            for message in &messages {
                statistics.count(message);
                status |= message.category().exit_bit();
                reporter.handle_message(message)?;
            }
        }

        let score = statistics.evaluate();
        statistics.score = score;
        let previous = match (&base_name, self.persistent) {
            (Some(base_name), true) => self.persist(base_name, &statistics),
            _ => None,
        };
        let evaluation = Evaluation { score: score.filter(|_| self.score), previous };
        reporter.display_reports(&evaluation)?;

        Ok(status)
    }

    /// Reads, parses and checks one module.
    fn check_module(&self, module: &ModuleDescription, from_stdin: bool, statistics: &mut Statistics) -> Vec<Message> {
        log::debug!("Checking module {} from {}", module.name, module.path);
        let content = if from_stdin { source::read_stdin() } else { fs::read_to_string(&module.file) };
        let content = match content {
            Ok(content) => content,
            Err(error) => {
                return vec![self.message(FATAL, module, 1, 0, format!("Unable to read {}: {error}", module.path))];
            }
        };

        let tree = match syntax::parse(&content) {
            Ok(tree) => tree,
            Err(error) => {
                return vec![self.message(SYNTAX_ERROR, module, error.line, error.offset, error.to_string())];
            }
        };
        statistics.statements += tree.statement_count();

        let resolver = ModuleResolver::new(module, &self.context.current_directory, &self.known_modules);
        let checked = CheckedModule { description: module, tree: &tree, resolver: &resolver };
        self.checkers
            .iter()
            .filter(|checker| checker.messages().iter().any(|definition| self.filter.is_enabled(definition)))
            .flat_map(|checker| {
                log::debug!("Running checker {} on {}", checker.name(), module.name);
                checker.check(&checked)
            })
            .collect()
    }

    /// Stores the statistics of this run, and returns the score of the previous one.
    fn persist(&self, base_name: &str, statistics: &Statistics) -> Option<f64> {
        let store = StatsStore::locate(&self.context)?;
        let previous = store.load(base_name).unwrap_or_else(|error| {
            log::warn!("{error}");
            None
        });
        if let Err(error) = store.save(base_name, statistics) {
            log::warn!("{error}");
        }
        previous.and_then(|previous| previous.score)
    }

    fn message(
        &self,
        definition: MessageDefinition,
        module: &ModuleDescription,
        line: usize,
        column: usize,
        text: String,
    ) -> Message {
        Message { definition, module: module.name.clone(), path: module.path.clone(), line, column, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::ExitSignal;
    use crate::reporter::{BufferedOutput, MinimalReporter};
    use crate::streams::SharedBuffer;
    use crate::streams::testing::exclusive;
    use std::panic::{self, AssertUnwindSafe};
    use std::path::PathBuf;

    /// Runs the linter and returns the status with everything written to the streams.
    fn lint(args: &[&str], reporter: Option<&mut dyn Reporter>) -> (i32, String) {
        let buffer = SharedBuffer::new();
        streams::redirect(Some(buffer.clone()));
        let mut args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        args.push(String::from("--persistent=no"));
        let entry = AssertUnwindSafe(move || run(args, reporter));
        let payload = panic::catch_unwind(entry).expect_err("the run returned");
        streams::restore();
        (ExitSignal::from_payload(payload).unwrap().code(), buffer.contents())
    }

    #[test]
    fn test_missing_stdin_filename() {
        let _guard = exclusive();

        let (status, output) = lint(&["--from-stdin"], None);

        assert_eq!(status, 32);
        assert!(output.contains("Missing filename required for --from-stdin"));
    }

    #[test]
    fn test_unknown_option() {
        let _guard = exclusive();

        let (status, output) = lint(&["--no-such-option"], None);

        assert_eq!(status, 32);
        assert!(output.contains("--no-such-option"));
    }

    #[test]
    fn test_unknown_message_name() {
        let _guard = exclusive();

        let (status, output) = lint(&["--disable=nope", "x.py"], None);

        assert_eq!(status, 32);
        assert!(output.contains("No such message id or symbol 'nope'"));
    }

    #[test]
    fn test_help() {
        let _guard = exclusive();

        let (status, output) = lint(&["--help"], None);

        assert_eq!(status, 0);
        assert!(output.contains("--from-stdin"));
    }

    #[test]
    fn test_missing_module_is_fatal() {
        let _guard = exclusive();

        let (status, output) = lint(&["no_such_module_anywhere"], None);

        assert_eq!(status, 1);
        assert!(output.contains("************* Module no_such_module_anywhere"));
        assert!(output.contains(
            "no_such_module_anywhere:1:0: F0001: No module named no_such_module_anywhere (fatal)"
        ));
    }

    #[test]
    fn test_file_on_disk_with_minimal_reporter() {
        let _guard = exclusive();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("sample.py");
        fs::write(&path, "import os\nimport sys\nprint(sys.argv)\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        let mut reporter = MinimalReporter::new();

        let (status, output) = lint(&[&path, "--disable=all", "--enable=W"], Some(&mut reporter));

        assert_eq!(status, 4);
        assert!(output.is_empty());
        assert_eq!(reporter.messages().len(), 1);
        assert!(reporter.output().ends_with(":1:0: W0611: Unused import os (unused-import)\n"));
    }

    #[test]
    fn test_enable_survives_a_later_disable_all() {
        let _guard = exclusive();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("sample.py");
        fs::write(&path, "import os\nimport no_such_module_anywhere\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        let mut reporter = MinimalReporter::new();

        let (status, _) = lint(&[&path, "--enable=unused-import", "--disable=all"], Some(&mut reporter));

        assert_eq!(status, 4);
        assert!(reporter.messages().iter().all(|message| message.symbol() == "unused-import"));
        assert_eq!(reporter.messages().len(), 2);
    }

    #[test]
    fn test_linter_runs_only_the_registered_checkers() {
        let directory = tempfile::tempdir().unwrap();
        fs::write(directory.path().join("sample.py"), "import os\nimport no_such_module_anywhere\n").unwrap();
        let context = Context { current_directory: directory.path().to_path_buf(), environment: Default::default() };
        let mut linter = Linter::new(context);
        linter.register_checker(Box::new(checkers::ImportsChecker));
        let mut reporter = MinimalReporter::new();

        let status = linter.check(&[String::from("sample.py")], false, &mut reporter).unwrap();

        assert_eq!(status, 2);
        assert_eq!(
            reporter.output(),
            "sample.py:2:0: E0401: Unable to import 'no_such_module_anywhere' (import-error)\n"
        );
    }

    #[test]
    fn test_linter_controls() {
        let context = Context { current_directory: PathBuf::from("/"), environment: Default::default() };
        let mut linter = Linter::new(context);

        linter.apply(&[Control::Enable(String::from("W0611")), Control::Disable(String::from("all"))]).unwrap();

        assert!(linter.is_enabled(&crate::message::UNUSED_IMPORT));
        assert!(!linter.is_enabled(&crate::message::IMPORT_ERROR));
        assert!(linter.apply(&[Control::Disable(String::from("nope"))]).is_err());
    }

    #[test]
    fn test_score_report() {
        let _guard = exclusive();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("scored.py");
        fs::write(&path, "import os\nx = 1\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let (status, output) = lint(&[&path], None);

        assert_eq!(status, 4);
        assert!(output.contains("Your code has been rated at 5.00/10"));
    }

    #[test]
    fn test_score_can_be_disabled() {
        let _guard = exclusive();
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("clean.py");
        fs::write(&path, "import os\nprint(os.sep)\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let (status, output) = lint(&[&path, "--score=n"], None);

        assert_eq!(status, 0);
        assert!(output.is_empty());
    }
}
