// SPDX-License-Identifier: GPL-3.0-or-later

//! The checkers which inspect a parsed module and emit messages.

use crate::message::{
    IMPORT_ERROR, Message, MessageDefinition, RELATIVE_BEYOND_TOP_LEVEL, UNUSED_IMPORT,
};
use crate::modules::{ModuleDescription, ModuleResolver, ResolveError};
use crate::syntax::{self, Statement, StatementKind};

/// A successfully parsed module, with everything a checker needs to inspect it.
pub struct CheckedModule<'a> {
    pub description: &'a ModuleDescription,
    pub tree: &'a syntax::Module,
    pub resolver: &'a ModuleResolver,
}

impl CheckedModule<'_> {
    fn message(&self, definition: MessageDefinition, statement: &Statement, text: String) -> Message {
        Message {
            definition,
            module: self.description.name.clone(),
            path: self.description.path.clone(),
            line: statement.line,
            column: statement.col,
            text,
        }
    }
}

pub trait Checker {
    fn name(&self) -> &'static str;

    /// The messages this checker can emit.
    fn messages(&self) -> &'static [MessageDefinition];

    fn check(&self, module: &CheckedModule<'_>) -> Vec<Message>;
}

/// The checkers run on every module.
pub fn default_checkers() -> Vec<Box<dyn Checker>> {
    vec![Box::new(ImportsChecker), Box::new(VariablesChecker)]
}

/// Verifies that the imported modules can be found.
pub struct ImportsChecker;

impl Checker for ImportsChecker {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn messages(&self) -> &'static [MessageDefinition] {
        &[IMPORT_ERROR, RELATIVE_BEYOND_TOP_LEVEL]
    }

    fn check(&self, module: &CheckedModule<'_>) -> Vec<Message> {
        let mut messages = Vec::new();
        for statement in module.tree.imports() {
            let targets = match &statement.kind {
                StatementKind::Import(aliases) => aliases.iter().map(|alias| alias.name.clone()).collect(),
                StatementKind::ImportFrom { level: 0, module: Some(name), .. } => vec![name.clone()],
                StatementKind::ImportFrom { level, module: target, .. } => {
                    match module.description.absolute_import(*level, target.as_deref()) {
                        Ok(name) => vec![name],
                        Err(error) => {
                            messages.push(module.message(RELATIVE_BEYOND_TOP_LEVEL, statement, error.to_string()));
                            continue;
                        }
                    }
                }
                _ => continue,
            };
            for target in targets {
                if let Err(ResolveError::NotFound(name)) = module.resolver.resolve(&target) {
                    log::debug!("Import of '{name}' in {} not resolved", module.description.name);
                    messages.push(module.message(IMPORT_ERROR, statement, format!("Unable to import '{name}'")));
                }
            }
        }
        messages
    }
}

/// Reports imported names which are never used.
pub struct VariablesChecker;

impl Checker for VariablesChecker {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn messages(&self) -> &'static [MessageDefinition] {
        &[UNUSED_IMPORT]
    }

    fn check(&self, module: &CheckedModule<'_>) -> Vec<Message> {
        if module.description.is_package {
            return Vec::new();
        }
        let used = module.tree.referenced_names();
        let mut messages = Vec::new();
        for statement in module.tree.imports() {
            match &statement.kind {
                StatementKind::Import(aliases) => {
                    for alias in aliases.iter().filter(|alias| !used.contains(alias.bound_name())) {
                        let text = match &alias.asname {
                            Some(asname) => format!("Unused {} imported as {asname}", alias.name),
                            None => format!("Unused import {}", alias.name),
                        };
                        messages.push(module.message(UNUSED_IMPORT, statement, text));
                    }
                }
                StatementKind::ImportFrom { level, module: source, names } => {
                    // The names a star import binds are unknown.
                    if statement.is_star_import() || source.as_deref() == Some("__future__") {
                        continue;
                    }
                    let source = format!("{}{}", ".".repeat(*level), source.as_deref().unwrap_or_default());
                    for alias in names.iter().filter(|alias| !used.contains(alias.bound_name())) {
                        let text = match &alias.asname {
                            Some(asname) => format!("Unused {} imported from {source} as {asname}", alias.name),
                            None => format!("Unused {} imported from {source}", alias.name),
                        };
                        messages.push(module.message(UNUSED_IMPORT, statement, text));
                    }
                }
                _ => {}
            }
        }
        messages
    }
}
