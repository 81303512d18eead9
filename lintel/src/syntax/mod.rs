// SPDX-License-Identifier: GPL-3.0-or-later

//! A minimal parser of Python source text.
//!
//! The parser recognizes the statement structure of a module: compound
//! statements with their indented bodies, imports, and simple statements.
//! Expressions are not parsed into trees. They are validated by a set of
//! token level rules and only the names they reference are kept, which is
//! what the checkers need.

mod parse;
mod tokenize;

pub use parse::parse;
pub use tokenize::{Token, TokenKind, tokenize};

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Why the source text could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    InvalidSyntax,
    UnexpectedIndent,
    ExpectedIndentedBlock,
    UnindentMismatch,
    UnterminatedString,
    UnterminatedTripleQuote,
    UnexpectedEof,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::InvalidSyntax => "invalid syntax",
            Reason::UnexpectedIndent => "unexpected indent",
            Reason::ExpectedIndentedBlock => "expected an indented block",
            Reason::UnindentMismatch => "unindent does not match any outer indentation level",
            Reason::UnterminatedString => "EOL while scanning string literal",
            Reason::UnterminatedTripleQuote => "EOF while scanning triple-quoted string literal",
            Reason::UnexpectedEof => "unexpected EOF while parsing",
        };
        f.write_str(text)
    }
}

/// The source text is not valid Python.
///
/// The line is 1-based, the offset is the 1-based column of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} (<unknown>, line {line})")]
pub struct SyntaxError {
    pub reason: Reason,
    pub line: usize,
    pub offset: usize,
}

impl SyntaxError {
    /// Creates an error at the given 0-based column.
    pub(crate) fn new(reason: Reason, line: usize, col: usize) -> Self {
        Self { reason, line, offset: col + 1 }
    }

    pub(crate) fn at(reason: Reason, token: &Token) -> Self {
        Self::new(reason, token.line, token.col)
    }
}

/// A name bound by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The imported name, dotted for plain imports.
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    /// The name the import binds in the importing module.
    pub fn bound_name(&self) -> &str {
        match &self.asname {
            Some(asname) => asname,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `import a.b as c, d`
    Import(Vec<Alias>),
    /// `from ..a import b as c`, or a star import when `names` is empty.
    ImportFrom { level: usize, module: Option<String>, names: Vec<Alias> },
    /// A statement with a body. The header names are the names referenced before the colon.
    Compound { keyword: String, names: Vec<String>, body: Vec<Statement> },
    /// Any other statement, with the names it references.
    Simple { names: Vec<String> },
}

/// A statement with its position. Lines are 1-based, columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub col: usize,
    pub kind: StatementKind,
}

impl Statement {
    pub fn is_star_import(&self) -> bool {
        matches!(&self.kind, StatementKind::ImportFrom { names, .. } if names.is_empty())
    }
}

/// The parsed content of a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub body: Vec<Statement>,
}

impl Module {
    /// Every statement of the module, including the nested ones, in source order.
    pub fn statements(&self) -> Vec<&Statement> {
        fn walk<'a>(statements: &'a [Statement], into: &mut Vec<&'a Statement>) {
            for statement in statements {
                into.push(statement);
                if let StatementKind::Compound { body, .. } = &statement.kind {
                    walk(body, into);
                }
            }
        }
        let mut result = Vec::new();
        walk(&self.body, &mut result);
        result
    }

    /// The number of statements, which the score is relative to.
    pub fn statement_count(&self) -> usize {
        self.statements().len()
    }

    /// The import statements of the module, including the nested ones.
    pub fn imports(&self) -> Vec<&Statement> {
        self.statements()
            .into_iter()
            .filter(|statement| {
                matches!(statement.kind, StatementKind::Import(_) | StatementKind::ImportFrom { .. })
            })
            .collect()
    }

    /// The names referenced outside of import statements.
    pub fn referenced_names(&self) -> HashSet<&str> {
        self.statements()
            .into_iter()
            .flat_map(|statement| match &statement.kind {
                StatementKind::Compound { names, .. } | StatementKind::Simple { names } => names.as_slice(),
                _ => &[],
            })
            .map(String::as_str)
            .collect()
    }
}
