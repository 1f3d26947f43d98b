//! Parser for the printable descriptor grammar:
//!
//! ```text
//! type := name ( '<' type ( ',' type )* '>' )? '?'?
//! name := ident ( '.' ident )*
//! ```
//!
//! Whitespace between tokens is ignored.

use crate::descriptor::{BaseType, TypeDescriptor};
use crate::error::CodecError;

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &'static str) -> CodecError {
        CodecError::Descriptor {
            text: self.text.to_owned(),
            position: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, CodecError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.text[start..self.pos])
    }

    fn name(&mut self) -> Result<&'a str, CodecError> {
        self.skip_whitespace();
        let start = self.pos;
        self.ident()?;
        while self.peek() == Some('.') {
            self.pos += 1;
            self.ident()?;
        }
        Ok(&self.text[start..self.pos])
    }

    fn descriptor(&mut self) -> Result<TypeDescriptor, CodecError> {
        let name = self.name()?;
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.descriptor()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }
        let descriptor = TypeDescriptor::new(BaseType::named(name), args);
        Ok(descriptor.with_nullable(self.eat('?')))
    }
}

pub(crate) fn parse_descriptor(text: &str) -> Result<TypeDescriptor, CodecError> {
    let mut parser = Parser { text, pos: 0 };
    let descriptor = parser.descriptor()?;
    parser.skip_whitespace();
    if parser.pos != text.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(descriptor)
}
