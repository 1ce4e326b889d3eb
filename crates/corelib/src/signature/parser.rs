//! Signature text parser.
//!
//! # Grammar
//!
//! ```text
//! signature   := name "::" return-spec "(" type-code* ")"
//! return-spec := type-code | "(" type-code* ")" | ε
//! type-code   := "b" | "i" | "l" | "f" | "d" | "s" | "o" | "m"
//!              | "[" type-code "]" | "{" type-code type-code "}"
//!              | "(" type-code* ")"
//! ```
//!
//! The parameter list is the last top-level parenthesized group. Anything
//! between `::` and it is the return spec; an empty return spec (or `v`)
//! means no return values.

use super::{Param, Signature};
use crate::error::{Error, Result};
use crate::tag::TypeTag;

const SEPARATOR: &str = "::";

/// Parse signature text into a [`Signature`].
pub fn parse(text: &str) -> Result<Signature> {
    let split = text
        .find(SEPARATOR)
        .ok_or_else(|| Error::parse(text, 0, "missing '::' after member name"))?;

    let name = &text[..split];
    if name.is_empty() {
        return Err(Error::parse(text, 0, "empty member name"));
    }
    if let Some(bad) = name.find(|c: char| c.is_whitespace() || "()[]{}:".contains(c)) {
        return Err(Error::parse(text, bad, "invalid character in member name"));
    }

    let mut parser = Parser {
        input: text,
        pos: split + SEPARATOR.len(),
    };
    let mut elements = Vec::new();
    while parser.pos < text.len() {
        let start = parser.pos;
        let grouped = parser.peek() == Some(b'(');
        let tag = parser.parse_type(true)?;
        elements.push((tag, start, grouped));
    }

    let params = match elements.pop() {
        Some((TypeTag::Tuple(tags), _, true)) => tags,
        Some((_, start, _)) => {
            return Err(Error::parse(text, start, "parameter list must be parenthesized"))
        }
        None => return Err(Error::parse(text, text.len(), "missing parameter list")),
    };

    let returns = match elements.as_slice() {
        [] => Vec::new(),
        [(TypeTag::Void, _, _)] => Vec::new(),
        [(TypeTag::Tuple(tags), _, true)] => tags.clone(),
        [(tag, _, _)] => vec![tag.clone()],
        [_, (_, start, _), ..] => {
            return Err(Error::parse(
                text,
                *start,
                "return spec must be one type code or one parenthesized group",
            ))
        }
    };

    Ok(Signature {
        name: name.to_string(),
        params: params.into_iter().map(Param::unnamed).collect(),
        returns,
    })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::parse(self.input, self.pos, reason)
    }

    fn parse_type(&mut self, allow_void: bool) -> Result<TypeTag> {
        let code = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of signature"))?;
        let tag = match code {
            b'b' => TypeTag::Bool,
            b'i' => TypeTag::Int32,
            b'l' => TypeTag::Int64,
            b'f' => TypeTag::Float32,
            b'd' => TypeTag::Float64,
            b's' => TypeTag::String,
            b'o' => TypeTag::ObjectRef,
            b'm' => TypeTag::map(TypeTag::String, TypeTag::String),
            b'v' if allow_void => TypeTag::Void,
            b'v' => return Err(self.error("'v' is only valid as a whole return spec")),
            b'[' => {
                self.pos += 1;
                let element = self.parse_type(false)?;
                self.expect(b']')?;
                return Ok(TypeTag::list(element));
            }
            b'{' => {
                self.pos += 1;
                let key = self.parse_type(false)?;
                let value = self.parse_type(false)?;
                self.expect(b'}')?;
                return Ok(TypeTag::map(key, value));
            }
            b'(' => {
                self.pos += 1;
                return self.parse_group();
            }
            b')' | b']' | b'}' => return Err(self.error(format!("unbalanced '{}'", code as char))),
            _ => {
                let found = self.input[self.pos..].chars().next().unwrap_or('?');
                return Err(self.error(format!("unknown type code '{}'", found)));
            }
        };
        self.pos += 1;
        Ok(tag)
    }

    /// Members of a group whose opening '(' was already consumed.
    fn parse_group(&mut self) -> Result<TypeTag> {
        let mut members = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unbalanced '('")),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(TypeTag::Tuple(members));
                }
                Some(_) => members.push(self.parse_type(false)?),
            }
        }
    }

    fn expect(&mut self, close: u8) -> Result<()> {
        match self.peek() {
            Some(found) if found == close => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(self.error(format!(
                "expected '{}', found '{}'",
                close as char, found as char
            ))),
            None => Err(self.error(format!("expected '{}' before end of signature", close as char))),
        }
    }
}
