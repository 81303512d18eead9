// SPDX-License-Identifier: GPL-3.0-or-later

//! Splits the source text into tokens.
//!
//! The tokenizer follows the lexical rules of Python closely enough to
//! drive the statement parser: line joining inside brackets and after a
//! backslash, indentation tracking with `Indent` and `Dedent` tokens, and
//! string literals with prefixes and triple quotes. Comments and blank
//! lines produce no tokens.

use super::{Reason, SyntaxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Op,
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

/// A token with its position. Lines are 1-based, columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.text == name
    }
}

const OPERATORS_3: [&str; 5] = ["**=", "//=", ">>=", "<<=", "..."];
const OPERATORS_2: [&str; 19] = [
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "->", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=",
    ":=",
];
const OPERATORS_1: &str = "+-*/%<>=&|^~@:,;.()[]{}";

const STRING_PREFIXES: [&str; 10] = ["r", "u", "b", "f", "br", "rb", "fr", "rf", "bu", "ub"];

const TAB_SIZE: usize = 8;

/// Converts the source text into a token stream, which always ends with `EndMarker`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Tokenizer::new(source).run()
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
    indents: Vec<usize>,
    brackets: Vec<char>,
    at_line_start: bool,
}

impl Tokenizer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.strip_prefix('\u{feff}').unwrap_or(source).chars().collect(),
            pos: 0,
            line: 1,
            col: 0,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        loop {
            if self.at_line_start && self.brackets.is_empty() {
                if !self.indentation()? {
                    break;
                }
                continue;
            }
            let Some(c) = self.peek() else { break };
            let (line, col) = (self.line, self.col);
            match c {
                ' ' | '\t' | '\x0c' | '\r' => self.advance(),
                '#' => self.skip_comment(),
                '\n' => {
                    if self.brackets.is_empty() {
                        self.push(TokenKind::Newline, "\n", line, col);
                        self.at_line_start = true;
                    }
                    self.advance();
                }
                '\\' => {
                    self.advance();
                    if self.peek() == Some('\r') {
                        self.advance();
                    }
                    if self.peek() != Some('\n') {
                        return Err(SyntaxError::new(Reason::InvalidSyntax, line, col));
                    }
                    self.advance();
                }
                '"' | '\'' => self.string(String::new(), line, col)?,
                c if c.is_ascii_digit() => self.number(line, col),
                '.' if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) => self.number(line, col),
                c if c == '_' || c.is_alphabetic() => self.name(line, col)?,
                _ => self.operator(line, col)?,
            }
        }
        self.finish()
    }

    /// Measures the indentation of a new logical line and emits `Indent` or `Dedent` tokens.
    ///
    /// Blank and comment-only lines are consumed without tokens. Returns false at the end of input.
    fn indentation(&mut self) -> Result<bool, SyntaxError> {
        let mut width = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => width = 0,
                _ => break,
            }
            self.advance();
        }
        match self.peek() {
            None => return Ok(false),
            Some('#') => {
                self.skip_comment();
                return Ok(true);
            }
            Some('\r') | Some('\n') => {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                self.advance();
                return Ok(true);
            }
            Some(_) => {}
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.push(TokenKind::Indent, "", self.line, self.col);
        } else if width < current {
            while self.indents.last().is_some_and(|&level| width < level) {
                self.indents.pop();
                self.push(TokenKind::Dedent, "", self.line, self.col);
            }
            if self.indents.last().copied().unwrap_or(0) != width {
                return Err(SyntaxError::new(Reason::UnindentMismatch, self.line, self.col));
            }
        }
        self.at_line_start = false;
        Ok(true)
    }

    fn name(&mut self, line: usize, col: usize) -> Result<(), SyntaxError> {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|&c| c == '_' || c.is_alphanumeric()) {
            text.push(c);
            self.advance();
        }
        let is_prefix = STRING_PREFIXES.contains(&text.to_ascii_lowercase().as_str());
        if is_prefix && matches!(self.peek(), Some('"') | Some('\'')) {
            return self.string(text, line, col);
        }
        self.push(TokenKind::Name, &text, line, col);
        Ok(())
    }

    fn number(&mut self, line: usize, col: usize) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && text.ends_with(['e', 'E'])
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, &text, line, col);
    }

    fn string(&mut self, prefix: String, line: usize, col: usize) -> Result<(), SyntaxError> {
        let mut text = prefix;
        let Some(quote) = self.peek() else {
            return Err(SyntaxError::new(Reason::InvalidSyntax, line, col));
        };
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let delimiter = if triple { 3 } else { 1 };
        for _ in 0..delimiter {
            text.push(quote);
            self.advance();
        }

        loop {
            match self.peek() {
                None if triple => {
                    return Err(SyntaxError::new(Reason::UnterminatedTripleQuote, line, col));
                }
                None => {
                    return Err(SyntaxError::new(Reason::UnterminatedString, self.line, self.col));
                }
                Some('\n') if !triple => {
                    return Err(SyntaxError::new(Reason::UnterminatedString, self.line, self.col));
                }
                Some('\\') => {
                    text.push('\\');
                    self.advance();
                    if let Some(escaped) = self.peek() {
                        text.push(escaped);
                        self.advance();
                    }
                }
                Some(c) if c == quote => {
                    let closing = (0..delimiter).all(|offset| self.peek_at(offset) == Some(quote));
                    if closing {
                        for _ in 0..delimiter {
                            text.push(quote);
                            self.advance();
                        }
                        break;
                    }
                    text.push(c);
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        self.push(TokenKind::String, &text, line, col);
        Ok(())
    }

    fn operator(&mut self, line: usize, col: usize) -> Result<(), SyntaxError> {
        let rest: String = self.chars[self.pos..self.chars.len().min(self.pos + 3)].iter().collect();
        let op = OPERATORS_3
            .iter()
            .chain(OPERATORS_2.iter())
            .find(|op| rest.starts_with(**op))
            .map(|op| op.to_string())
            .or_else(|| rest.chars().next().filter(|c| OPERATORS_1.contains(*c)).map(String::from))
            .ok_or_else(|| SyntaxError::new(Reason::InvalidSyntax, line, col))?;

        match op.as_str() {
            "(" | "[" | "{" => self.brackets.push(op.chars().next().unwrap_or('(')),
            ")" | "]" | "}" => {
                let expected = match op.as_str() {
                    ")" => '(',
                    "]" => '[',
                    _ => '{',
                };
                if self.brackets.pop() != Some(expected) {
                    return Err(SyntaxError::new(Reason::InvalidSyntax, line, col));
                }
            }
            _ => {}
        }
        for _ in 0..op.chars().count() {
            self.advance();
        }
        self.push(TokenKind::Op, &op, line, col);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, SyntaxError> {
        if !self.brackets.is_empty() {
            return Err(SyntaxError::new(Reason::UnexpectedEof, self.line, self.col));
        }
        let open_line = self
            .tokens
            .last()
            .is_some_and(|token| !matches!(token.kind, TokenKind::Newline | TokenKind::Dedent));
        if open_line {
            self.push(TokenKind::Newline, "", self.line, self.col);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, "", self.line, 0);
        }
        self.push(TokenKind::EndMarker, "", self.line, 0);
        Ok(self.tokens)
    }

    fn skip_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str, line: usize, col: usize) {
        self.tokens.push(Token { kind, text: text.to_string(), line, col });
    }
}
