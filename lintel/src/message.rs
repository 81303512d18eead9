// SPDX-License-Identifier: GPL-3.0-or-later

//! Messages emitted by the checkers, and the control of which are enabled.

use crate::exit;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// The category of a message. Decides the exit status bit and the score weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Convention,
    Refactor,
    Warning,
    Error,
    Fatal,
}

impl Category {
    const ALL: [Category; 5] = [
        Category::Convention,
        Category::Refactor,
        Category::Warning,
        Category::Error,
        Category::Fatal,
    ];

    /// The letter which starts the message ids of this category.
    pub fn letter(&self) -> char {
        match self {
            Category::Convention => 'C',
            Category::Refactor => 'R',
            Category::Warning => 'W',
            Category::Error => 'E',
            Category::Fatal => 'F',
        }
    }

    /// The bit this category contributes to the exit status.
    pub fn exit_bit(&self) -> i32 {
        match self {
            Category::Convention => exit::EXIT_CONVENTION,
            Category::Refactor => exit::EXIT_REFACTOR,
            Category::Warning => exit::EXIT_WARNING,
            Category::Error => exit::EXIT_ERROR,
            Category::Fatal => exit::EXIT_FATAL,
        }
    }

    fn from_letter(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| value.eq_ignore_ascii_case(&category.letter().to_string()))
    }
}

/// The static description of a message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDefinition {
    pub msgid: &'static str,
    pub symbol: &'static str,
    pub category: Category,
}

pub const SYNTAX_ERROR: MessageDefinition =
    MessageDefinition { msgid: "E0001", symbol: "syntax-error", category: Category::Error };
pub const IMPORT_ERROR: MessageDefinition =
    MessageDefinition { msgid: "E0401", symbol: "import-error", category: Category::Error };
pub const RELATIVE_BEYOND_TOP_LEVEL: MessageDefinition = MessageDefinition {
    msgid: "E0402",
    symbol: "relative-beyond-top-level",
    category: Category::Error,
};
pub const UNUSED_IMPORT: MessageDefinition =
    MessageDefinition { msgid: "W0611", symbol: "unused-import", category: Category::Warning };
pub const FATAL: MessageDefinition =
    MessageDefinition { msgid: "F0001", symbol: "fatal", category: Category::Fatal };

/// Every message the linter can emit.
pub const DEFINITIONS: &[MessageDefinition] =
    &[SYNTAX_ERROR, IMPORT_ERROR, RELATIVE_BEYOND_TOP_LEVEL, UNUSED_IMPORT, FATAL];

/// Looks up a message by its id or its symbolic name.
pub fn lookup(name: &str) -> Option<&'static MessageDefinition> {
    DEFINITIONS
        .iter()
        .find(|definition| definition.symbol == name || definition.msgid.eq_ignore_ascii_case(name))
}

/// A message about a location in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub definition: MessageDefinition,
    /// The dotted name of the module.
    pub module: String,
    /// The path of the module, as it was given to the linter.
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl Message {
    pub fn msgid(&self) -> &'static str {
        self.definition.msgid
    }

    pub fn symbol(&self) -> &'static str {
        self.definition.symbol
    }

    pub fn category(&self) -> Category {
        self.definition.category
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} ({})",
            self.path, self.line, self.column, self.definition.msgid, self.text, self.definition.symbol
        )
    }
}

/// A single enable or disable request, as given on the command line or in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Enable(String),
    Disable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("No such message id or symbol '{0}'")]
    UnknownMessage(String),
}

/// The set of enabled messages.
///
/// All messages are enabled initially. Fatal messages can not be disabled.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    enabled: HashSet<&'static str>,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self { enabled: DEFINITIONS.iter().map(|definition| definition.msgid).collect() }
    }
}

impl MessageFilter {
    /// Applies a group of controls.
    ///
    /// Controls naming `all` or a category are applied first, then the ones
    /// naming a single message, each kind in the given order. A message
    /// enabled by its id or symbol stays enabled after `--disable=all`,
    /// wherever that appears in the group.
    pub fn apply<'a>(&mut self, controls: impl IntoIterator<Item = &'a Control>) -> Result<(), ControlError> {
        let mut blanket = Vec::new();
        let mut specific = Vec::new();
        for control in controls {
            let (enable, name) = match control {
                Control::Enable(name) => (true, name),
                Control::Disable(name) => (false, name),
            };
            let (is_blanket, msgids) = Self::select(name)?;
            if is_blanket {
                blanket.push((enable, msgids));
            } else {
                specific.push((enable, msgids));
            }
        }

        for (enable, msgids) in blanket.into_iter().chain(specific) {
            for msgid in msgids {
                if enable {
                    self.enabled.insert(msgid);
                } else {
                    self.enabled.remove(msgid);
                }
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self, definition: &MessageDefinition) -> bool {
        definition.category == Category::Fatal || self.enabled.contains(definition.msgid)
    }

    /// Resolves a name (`all`, a category letter, an id or a symbol) to message ids.
    ///
    /// The flag tells whether the name selects a group of messages.
    fn select(name: &str) -> Result<(bool, Vec<&'static str>), ControlError> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("all") {
            return Ok((true, DEFINITIONS.iter().map(|definition| definition.msgid).collect()));
        }
        if let Some(category) = Category::from_letter(name) {
            let msgids = DEFINITIONS
                .iter()
                .filter(|definition| definition.category == category)
                .map(|definition| definition.msgid)
                .collect();
            return Ok((true, msgids));
        }
        lookup(name)
            .map(|definition| (false, vec![definition.msgid]))
            .ok_or_else(|| ControlError::UnknownMessage(name.to_string()))
    }
}
