//! Selector grammar: `selector := compound (combinator compound)*`,
//! `compound := (type | universal)? (class | id | attribute | pseudo)*`.
//!
//! Hand-written recursive descent over the selector text. Parse then
//! serialize round-trips to a selector with identical matching
//! semantics; whitespace around combinators is normalized away.

use std::fmt;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Universal,
    Type(String),
    Class(String),
    Id(String),
    Attribute {
        name: String,
        op: Option<AttrOp>,
        value: Option<String>,
    },
    Pseudo {
        name: String,
        args: Option<String>,
        /// True for `::element` syntax.
        element: bool,
    },
    Combinator(Combinator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
}

impl AttrOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::PrefixMatch => "^=",
            Self::SuffixMatch => "$=",
            Self::SubstringMatch => "*=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// Parse a selector string that must hold exactly one selector.
///
/// Rules are comma-split upstream, so more or fewer than one result
/// here is an invariant violation, not a recoverable condition.
pub fn parse_selector(input: &str) -> Result<Selector, ParseError> {
    let mut list = parse_selector_list(input)?;
    if list.len() != 1 {
        return Err(ParseError::SelectorCount {
            selector: input.to_string(),
            found: list.len(),
        });
    }
    Ok(list.remove(0))
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(input: &str) -> Result<Vec<Selector>, ParseError> {
    let mut parser = Parser::new(input);
    let mut selectors = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            break;
        }
        selectors.push(parser.parse_selector()?);
        parser.skip_whitespace();
        match parser.peek() {
            Some(',') => {
                parser.bump();
            }
            Some(ch) => {
                return Err(ParseError::invalid_selector(
                    input,
                    format!("unexpected character '{ch}'"),
                ));
            }
            None => break,
        }
    }

    if selectors.is_empty() {
        return Err(ParseError::invalid_selector(input, "empty selector"));
    }
    Ok(selectors)
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Skip whitespace; report whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::invalid_selector(self.input, message)
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = Vec::new();
        let mut in_compound = false;

        loop {
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some(ch @ ('>' | '+' | '~')) => {
                    if !in_compound {
                        return Err(self.err(format!("combinator '{ch}' has no left-hand side")));
                    }
                    self.bump();
                    let combinator = match ch {
                        '>' => Combinator::Child,
                        '+' => Combinator::NextSibling,
                        _ => Combinator::SubsequentSibling,
                    };
                    parts.push(SelectorPart::Combinator(combinator));
                    in_compound = false;
                    continue;
                }
                _ => {}
            }

            if in_compound && had_whitespace {
                parts.push(SelectorPart::Combinator(Combinator::Descendant));
                in_compound = false;
            }

            parts.push(self.parse_simple()?);
            in_compound = true;
        }

        if parts.is_empty() {
            return Err(self.err("empty selector"));
        }
        if matches!(parts.last(), Some(SelectorPart::Combinator(_))) {
            return Err(self.err("selector ends with a combinator"));
        }
        Ok(Selector { parts })
    }

    fn parse_simple(&mut self) -> Result<SelectorPart, ParseError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(SelectorPart::Universal)
            }
            Some('.') => {
                self.bump();
                let name = self.ident()?;
                Ok(SelectorPart::Class(name))
            }
            Some('#') => {
                self.bump();
                let name = self.ident()?;
                Ok(SelectorPart::Id(name))
            }
            Some('[') => self.parse_attribute(),
            Some(':') => self.parse_pseudo(),
            Some(ch) if is_ident_start(ch) => {
                let name = self.ident()?;
                Ok(SelectorPart::Type(name))
            }
            Some(ch) => Err(self.err(format!("unexpected character '{ch}'"))),
            None => Err(self.err("unexpected end of selector")),
        }
    }

    fn parse_attribute(&mut self) -> Result<SelectorPart, ParseError> {
        self.bump(); // '['
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let op = match self.peek() {
            Some('=') => {
                self.bump();
                Some(AttrOp::Equals)
            }
            Some(ch @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                if self.peek() != Some('=') {
                    return Err(self.err(format!("expected '=' after '{ch}' in attribute selector")));
                }
                self.bump();
                Some(match ch {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::PrefixMatch,
                    '$' => AttrOp::SuffixMatch,
                    _ => AttrOp::SubstringMatch,
                })
            }
            _ => None,
        };

        let value = if op.is_some() {
            self.skip_whitespace();
            match self.peek() {
                Some(quote @ ('"' | '\'')) => Some(self.quoted_string(quote)?),
                Some(ch) if is_ident_start(ch) => Some(self.ident()?),
                _ => return Err(self.err("expected attribute value")),
            }
        } else {
            None
        };

        self.skip_whitespace();
        if self.bump() != Some(']') {
            return Err(self.err("unterminated attribute selector"));
        }
        Ok(SelectorPart::Attribute { name, op, value })
    }

    fn parse_pseudo(&mut self) -> Result<SelectorPart, ParseError> {
        self.bump(); // ':'
        let element = if self.peek() == Some(':') {
            self.bump();
            true
        } else {
            false
        };
        let name = self.ident()?;
        let args = if self.peek() == Some('(') {
            Some(self.balanced_args()?)
        } else {
            None
        };
        Ok(SelectorPart::Pseudo { name, args, element })
    }

    /// Capture `(...)` argument text with balanced parens, delimiters
    /// excluded. The contents stay opaque; `:is(...)` arguments are not
    /// rewritten.
    fn balanced_args(&mut self) -> Result<String, ParseError> {
        self.bump(); // '('
        let mut depth = 1usize;
        let mut args = String::new();
        loop {
            match self.bump() {
                Some('(') => {
                    depth += 1;
                    args.push('(');
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    args.push(')');
                }
                Some(ch) => args.push(ch),
                None => return Err(self.err("unterminated pseudo-class arguments")),
            }
        }
        Ok(args.trim().to_string())
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        if !self.peek().is_some_and(is_ident_start) {
            return Err(self.err("expected identifier"));
        }
        while self.peek().is_some_and(is_ident_char) {
            if let Some(ch) = self.bump() {
                name.push(ch);
            }
        }
        Ok(name)
    }

    /// Lex a quoted string; `\` escapes the next character. The
    /// returned value is unescaped.
    fn quoted_string(&mut self, quote: char) -> Result<String, ParseError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.err("unterminated string")),
                },
                Some(ch) if ch == quote => break,
                Some(ch) => value.push(ch),
                None => return Err(self.err("unterminated string")),
            }
        }
        Ok(value)
    }
}

/// Escape an attribute value for re-serialization inside `"` quotes.
fn escape_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Type(name) => f.write_str(name),
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Attribute { name, op, value } => match (op, value) {
                (Some(op), Some(value)) => {
                    write!(f, "[{name}{}\"{}\"]", op.as_str(), escape_attr_value(value))
                }
                _ => write!(f, "[{name}]"),
            },
            Self::Pseudo { name, args, element } => {
                f.write_str(if *element { "::" } else { ":" })?;
                f.write_str(name)?;
                if let Some(args) = args {
                    write!(f, "({args})")?;
                }
                Ok(())
            }
            Self::Combinator(Combinator::Descendant) => f.write_str(" "),
            Self::Combinator(Combinator::Child) => f.write_str(">"),
            Self::Combinator(Combinator::NextSibling) => f.write_str("+"),
            Self::Combinator(Combinator::SubsequentSibling) => f.write_str("~"),
        }
    }
}
