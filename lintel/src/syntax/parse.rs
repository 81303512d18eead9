// SPDX-License-Identifier: GPL-3.0-or-later

use super::tokenize::{Token, TokenKind, tokenize};
use super::{Alias, Module, Reason, Statement, StatementKind, SyntaxError};

const KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// Keywords which evaluate to a value.
const CONSTANTS: [&str; 3] = ["False", "None", "True"];

/// Keywords which can start a simple statement.
const STATEMENT_KEYWORDS: [&str; 16] = [
    "False", "None", "True", "assert", "await", "break", "continue", "del", "global", "lambda", "nonlocal", "not",
    "pass", "raise", "return", "yield",
];

/// Keywords which can end a simple statement.
const TERMINAL_KEYWORDS: [&str; 9] = ["False", "None", "True", "break", "continue", "pass", "raise", "return", "yield"];

const COMPOUND_KEYWORDS: [&str; 11] =
    ["if", "elif", "else", "for", "while", "try", "except", "finally", "with", "def", "class"];

/// Operators which can not start an expression.
const INVALID_START: [&str; 33] = [
    "=", ",", ":", ".", "->", "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "|=", "^=", "@=",
    ":=", "==", "!=", "<=", ">=", "<", ">", "|", "&", "^", "/", "//", "%", "<<", ">>",
];

/// Operators which need an operand on their left side.
const BINARY_ONLY: [&str; 30] = [
    "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "|=", "^=", "@=", ":=", "==", "!=", "<=",
    ">=", "<", ">", "|", "&", "^", "/", "//", "%", "<<", ">>", "->",
];

const OPENERS: [&str; 3] = ["(", "[", "{"];
const CLOSERS: [&str; 3] = [")", "]", "}"];

/// Parses the source text of a module.
pub fn parse(source: &str) -> Result<Module, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let body = parser.block()?;
    Ok(Module { body })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// The tokens always end with an end marker, which is returned when looking past the end.
    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndMarker {
            self.pos += 1;
        }
        token
    }

    /// Parses statements until the end of the current indentation level.
    fn block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut body: Vec<Statement> = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::EndMarker => break,
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Indent => return Err(SyntaxError::at(Reason::UnexpectedIndent, self.peek())),
                TokenKind::Newline => {
                    self.advance();
                }
                _ => {
                    let previous = body.last().and_then(|statement| match &statement.kind {
                        StatementKind::Compound { keyword, .. } => Some(keyword.clone()),
                        _ => None,
                    });
                    let statements = self.statement(previous.as_deref())?;
                    body.extend(statements);
                }
            }
        }
        Ok(body)
    }

    fn statement(&mut self, previous: Option<&str>) -> Result<Vec<Statement>, SyntaxError> {
        let first = self.peek();
        let compound = first.kind == TokenKind::Name
            && (COMPOUND_KEYWORDS.contains(&first.text.as_str())
                || (first.text == "async" && ["def", "for", "with"].iter().any(|k| self.peek_at(1).is_name(k)))
                || ((first.text == "match" || first.text == "case") && self.soft_keyword_header()));
        if compound {
            Ok(vec![self.compound(previous)?])
        } else {
            self.simple_line()
        }
    }

    /// Decides whether a line starting with `match` or `case` is a compound statement.
    fn soft_keyword_header(&self) -> bool {
        let next = self.peek_at(1);
        let starts_operand = match next.kind {
            TokenKind::Op => ["(", "[", "{", "-", "~", "*"].contains(&next.text.as_str()),
            TokenKind::Newline | TokenKind::EndMarker => false,
            _ => true,
        };
        if !starts_operand {
            return false;
        }
        let mut depth = 0_usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::Newline | TokenKind::EndMarker => break,
                TokenKind::Op if OPENERS.contains(&token.text.as_str()) => depth += 1,
                TokenKind::Op if CLOSERS.contains(&token.text.as_str()) => depth = depth.saturating_sub(1),
                TokenKind::Op if token.text == ":" && depth == 0 => return true,
                _ => {}
            }
        }
        false
    }

    fn compound(&mut self, previous: Option<&str>) -> Result<Statement, SyntaxError> {
        let keyword_token = self.advance();
        let keyword = if keyword_token.text == "async" { self.advance().text } else { keyword_token.text.clone() };

        let follows = match keyword.as_str() {
            "elif" => Some(&["if", "elif"][..]),
            "else" => Some(&["if", "elif", "for", "while", "try", "except"][..]),
            "except" => Some(&["try", "except"][..]),
            "finally" => Some(&["try", "except", "else"][..]),
            _ => None,
        };
        if let Some(allowed) = follows {
            if !previous.is_some_and(|previous| allowed.contains(&previous)) {
                return Err(SyntaxError::at(Reason::InvalidSyntax, &keyword_token));
            }
        }

        let start = self.pos;
        let mut depth = 0_usize;
        let mut lambdas = 0_usize;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Newline | TokenKind::EndMarker => {
                    return Err(SyntaxError::at(Reason::InvalidSyntax, token));
                }
                TokenKind::Op if OPENERS.contains(&token.text.as_str()) => depth += 1,
                TokenKind::Op if CLOSERS.contains(&token.text.as_str()) => depth = depth.saturating_sub(1),
                TokenKind::Name if token.text == "lambda" && depth == 0 => lambdas += 1,
                TokenKind::Op if token.text == ":" && depth == 0 => {
                    if lambdas == 0 {
                        break;
                    }
                    lambdas -= 1;
                }
                _ => {}
            }
            self.advance();
        }
        let header = self.tokens[start..self.pos].to_vec();
        let colon = self.advance();
        let names = header_names(&keyword, &header, &colon)?;

        let body = if self.peek().kind == TokenKind::Newline {
            self.advance();
            if self.peek().kind != TokenKind::Indent {
                return Err(SyntaxError::at(Reason::ExpectedIndentedBlock, self.peek()));
            }
            self.advance();
            self.block()?
        } else {
            self.simple_line()?
        };

        Ok(Statement {
            line: keyword_token.line,
            col: keyword_token.col,
            kind: StatementKind::Compound { keyword, names, body },
        })
    }

    /// Parses a logical line of simple statements separated by semicolons.
    fn simple_line(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        let mut line = Vec::new();
        while !matches!(self.peek().kind, TokenKind::Newline | TokenKind::EndMarker) {
            line.push(self.advance());
        }
        let end = self.advance();

        let mut segments: Vec<(&[Token], &Token)> = Vec::new();
        let mut start = 0;
        for (index, token) in line.iter().enumerate() {
            if token.is_op(";") {
                segments.push((&line[start..index], token));
                start = index + 1;
            }
        }
        segments.push((&line[start..], &end));

        let count = segments.len();
        let mut statements = Vec::new();
        for (index, (segment, terminator)) in segments.into_iter().enumerate() {
            if segment.is_empty() {
                if index > 0 && index == count - 1 {
                    continue;
                }
                return Err(SyntaxError::at(Reason::InvalidSyntax, terminator));
            }
            statements.push(simple_statement(segment, terminator)?);
        }
        Ok(statements)
    }
}

fn simple_statement(segment: &[Token], end: &Token) -> Result<Statement, SyntaxError> {
    let first = &segment[0];
    let kind = if first.is_name("import") {
        import(segment, end)?
    } else if first.is_name("from") {
        import_from(segment, end)?
    } else if first.is_op("@") {
        StatementKind::Simple { names: expression(&segment[1..], end)? }
    } else if first.kind == TokenKind::Name
        && is_keyword(&first.text)
        && !STATEMENT_KEYWORDS.contains(&first.text.as_str())
    {
        return Err(SyntaxError::at(Reason::InvalidSyntax, first));
    } else {
        StatementKind::Simple { names: expression(segment, end)? }
    };
    Ok(Statement { line: first.line, col: first.col, kind })
}

/// Validates the header of a compound statement, and returns the names it references.
fn header_names(keyword: &str, header: &[Token], colon: &Token) -> Result<Vec<String>, SyntaxError> {
    match keyword {
        "else" | "try" | "finally" => match header.first() {
            Some(token) => Err(SyntaxError::at(Reason::InvalidSyntax, token)),
            None => Ok(Vec::new()),
        },
        "for" => {
            let split = header
                .iter()
                .position(|token| token.is_name("in"))
                .ok_or_else(|| SyntaxError::at(Reason::InvalidSyntax, colon))?;
            expression(&header[..split], &header[split])?;
            expression(&header[split + 1..], colon)
        }
        "except" => {
            let Some(split) = header.iter().position(|token| token.is_name("as")) else {
                return if header.is_empty() { Ok(Vec::new()) } else { expression(header, colon) };
            };
            let (_, next) = identifier(header, split + 1, colon)?;
            if let Some(token) = header.get(next) {
                return Err(SyntaxError::at(Reason::InvalidSyntax, token));
            }
            expression(&header[..split], &header[split])
        }
        "def" => {
            let (_, next) = identifier(header, 0, colon)?;
            let parameters = header.get(next).ok_or_else(|| SyntaxError::at(Reason::InvalidSyntax, colon))?;
            if !parameters.is_op("(") {
                return Err(SyntaxError::at(Reason::InvalidSyntax, parameters));
            }
            let close = matching_close(header, next).ok_or_else(|| SyntaxError::at(Reason::InvalidSyntax, colon))?;
            let mut referenced = names(&header[next..=close]);
            match header.get(close + 1) {
                None => {}
                Some(arrow) if arrow.is_op("->") => referenced.extend(expression(&header[close + 2..], colon)?),
                Some(token) => return Err(SyntaxError::at(Reason::InvalidSyntax, token)),
            }
            Ok(referenced)
        }
        "class" => {
            let (_, next) = identifier(header, 0, colon)?;
            match header.get(next) {
                None => Ok(Vec::new()),
                Some(bases) if bases.is_op("(") => {
                    if matching_close(header, next) != Some(header.len() - 1) {
                        return Err(SyntaxError::at(Reason::InvalidSyntax, colon));
                    }
                    expression(&header[next..], colon)
                }
                Some(token) => Err(SyntaxError::at(Reason::InvalidSyntax, token)),
            }
        }
        _ => expression(header, colon),
    }
}

/// Finds the index of the bracket closing the one at `open`.
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Op {
            continue;
        }
        if OPENERS.contains(&token.text.as_str()) {
            depth += 1;
        } else if CLOSERS.contains(&token.text.as_str()) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Validates an expression with token level rules, and returns the names it references.
///
/// `end` is the token following the expression, where a missing operand is reported.
fn expression(tokens: &[Token], end: &Token) -> Result<Vec<String>, SyntaxError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(SyntaxError::at(Reason::InvalidSyntax, end));
    };
    if first.kind == TokenKind::Op && INVALID_START.contains(&first.text.as_str()) {
        return Err(SyntaxError::at(Reason::InvalidSyntax, first));
    }
    for pair in tokens.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let adjacent_operands = is_operand(right)
            && (is_operand(left) || (left.kind == TokenKind::Op && CLOSERS.contains(&left.text.as_str())))
            && !(left.kind == TokenKind::String && right.kind == TokenKind::String);
        let missing_operand = right.kind == TokenKind::Op
            && BINARY_ONLY.contains(&right.text.as_str())
            && ((left.kind == TokenKind::Op && !CLOSERS.contains(&left.text.as_str()) && left.text != "...")
                || (left.kind == TokenKind::Name && is_keyword(&left.text) && !CONSTANTS.contains(&left.text.as_str())));
        if adjacent_operands || missing_operand {
            return Err(SyntaxError::at(Reason::InvalidSyntax, right));
        }
    }
    let unfinished = match last.kind {
        TokenKind::Op => ![")", "]", "}", "...", ","].contains(&last.text.as_str()),
        TokenKind::Name => is_keyword(&last.text) && !TERMINAL_KEYWORDS.contains(&last.text.as_str()),
        _ => false,
    };
    if unfinished {
        return Err(SyntaxError::at(Reason::InvalidSyntax, end));
    }
    Ok(names(tokens))
}

/// Collects the referenced names. Attribute names are not references.
///
/// Assignments to `__all__` also reference the names listed in the strings.
fn names(tokens: &[Token]) -> Vec<String> {
    let exports = tokens.first().is_some_and(|token| token.is_name("__all__"));
    tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| match token.kind {
            TokenKind::Name if !is_keyword(&token.text) => {
                let attribute = index > 0 && tokens[index - 1].is_op(".");
                (!attribute).then(|| token.text.clone())
            }
            TokenKind::String if exports => Some(token.text.trim_matches(['"', '\'']).to_string()),
            _ => None,
        })
        .collect()
}

fn import(segment: &[Token], end: &Token) -> Result<StatementKind, SyntaxError> {
    let mut aliases = Vec::new();
    let mut index = 1;
    loop {
        let (name, next) = dotted_name(segment, index, end)?;
        let (asname, next) = alias(segment, next, end)?;
        aliases.push(Alias { name, asname });
        index = next;
        match segment.get(index) {
            None => break,
            Some(token) if token.is_op(",") => index += 1,
            Some(token) => return Err(SyntaxError::at(Reason::InvalidSyntax, token)),
        }
    }
    Ok(StatementKind::Import(aliases))
}

fn import_from(segment: &[Token], end: &Token) -> Result<StatementKind, SyntaxError> {
    let error_at = |index: usize| SyntaxError::at(Reason::InvalidSyntax, segment.get(index).unwrap_or(end));

    let mut index = 1;
    let mut level = 0;
    while let Some(token) = segment.get(index) {
        match token.text.as_str() {
            "." if token.kind == TokenKind::Op => level += 1,
            "..." if token.kind == TokenKind::Op => level += 3,
            _ => break,
        }
        index += 1;
    }
    let module = match segment.get(index) {
        Some(token) if token.kind == TokenKind::Name && !token.is_name("import") => {
            let (name, next) = dotted_name(segment, index, end)?;
            index = next;
            Some(name)
        }
        _ => None,
    };
    if level == 0 && module.is_none() {
        return Err(error_at(index));
    }
    if !segment.get(index).is_some_and(|token| token.is_name("import")) {
        return Err(error_at(index));
    }
    index += 1;

    if segment.get(index).is_some_and(|token| token.is_op("*")) {
        if segment.get(index + 1).is_some() {
            return Err(error_at(index + 1));
        }
        return Ok(StatementKind::ImportFrom { level, module, names: Vec::new() });
    }

    let parenthesized = segment.get(index).is_some_and(|token| token.is_op("("));
    if parenthesized {
        index += 1;
    }
    let mut names = Vec::new();
    loop {
        if parenthesized && !names.is_empty() && segment.get(index).is_some_and(|token| token.is_op(")")) {
            index += 1;
            break;
        }
        let (name, next) = identifier(segment, index, end)?;
        let (asname, next) = alias(segment, next, end)?;
        names.push(Alias { name, asname });
        index = next;
        match segment.get(index) {
            Some(token) if token.is_op(",") => index += 1,
            Some(token) if parenthesized && token.is_op(")") => {
                index += 1;
                break;
            }
            None if !parenthesized => break,
            _ => return Err(error_at(index)),
        }
    }
    if segment.get(index).is_some() {
        return Err(error_at(index));
    }
    Ok(StatementKind::ImportFrom { level, module, names })
}

/// Parses an optional `as NAME` clause.
fn alias(segment: &[Token], index: usize, end: &Token) -> Result<(Option<String>, usize), SyntaxError> {
    if segment.get(index).is_some_and(|token| token.is_name("as")) {
        let (name, next) = identifier(segment, index + 1, end)?;
        Ok((Some(name), next))
    } else {
        Ok((None, index))
    }
}

fn dotted_name(segment: &[Token], index: usize, end: &Token) -> Result<(String, usize), SyntaxError> {
    let (mut name, mut index) = identifier(segment, index, end)?;
    while segment.get(index).is_some_and(|token| token.is_op(".")) {
        let (part, next) = identifier(segment, index + 1, end)?;
        name.push('.');
        name.push_str(&part);
        index = next;
    }
    Ok((name, index))
}

fn identifier(segment: &[Token], index: usize, end: &Token) -> Result<(String, usize), SyntaxError> {
    match segment.get(index) {
        Some(token) if token.kind == TokenKind::Name && !is_keyword(&token.text) => {
            Ok((token.text.clone(), index + 1))
        }
        Some(token) => Err(SyntaxError::at(Reason::InvalidSyntax, token)),
        None => Err(SyntaxError::at(Reason::InvalidSyntax, end)),
    }
}

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

fn is_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Number | TokenKind::String => true,
        TokenKind::Name => !is_keyword(&token.text) || CONSTANTS.contains(&token.text.as_str()),
        _ => false,
    }
}
