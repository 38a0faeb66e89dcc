//! Builds objects from the token stream.
//!
//! Two entry points: [`parse_object`] for standalone text, where an `n g R`
//! sequence is an error because there is no table to resolve it against, and
//! [`crate::document::Document::parse_object`], which turns `n g R` into
//! reference edges and stamps every created object with the document as its
//! owner. Container nesting is depth-limited; errors carry byte offsets.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::lexer::{self, Token};
use crate::object::dictionary::Dictionary;
use crate::object::obj_gen::ObjGen;
use crate::object::Object;

/// Maximum container nesting the parser accepts.
pub const MAX_DEPTH: usize = 512;

/// Parse one object from `input`. The whole input must be consumed, up to
/// trailing whitespace and comments.
pub fn parse_object(input: &[u8]) -> Result<Object> {
    Parser::new(input, None).run()
}

pub(crate) fn parse_with_document(input: &[u8], doc: &Document) -> Result<Object> {
    Parser::new(input, Some(doc)).run()
}

struct Parser<'a> {
    full: &'a [u8],
    rest: &'a [u8],
    doc: Option<&'a Document>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], doc: Option<&'a Document>) -> Self {
        Parser {
            full: input,
            rest: input,
            doc,
        }
    }

    fn offset(&self) -> usize {
        self.full.len() - self.rest.len()
    }

    fn run(mut self) -> Result<Object> {
        let obj = self.parse_value(0)?;
        self.rest = lexer::skip_ws(self.rest);
        if !self.rest.is_empty() {
            return Err(Error::Parse {
                offset: self.offset(),
                reason: "trailing data after object".to_string(),
            });
        }
        Ok(obj)
    }

    fn next(&mut self) -> Result<Token<'a>> {
        self.rest = lexer::skip_ws(self.rest);
        if self.rest.is_empty() {
            return Err(Error::UnexpectedEof);
        }
        match lexer::token(self.rest) {
            Ok((rest, tok)) => {
                self.rest = rest;
                Ok(tok)
            }
            Err(_) => Err(Error::Parse {
                offset: self.offset(),
                reason: "unrecognized token".to_string(),
            }),
        }
    }

    /// Lex ahead without error reporting; the caller restores `rest` when
    /// the speculation fails.
    fn lookahead(&mut self) -> Option<Token<'a>> {
        match lexer::token(self.rest) {
            Ok((rest, tok)) => {
                self.rest = rest;
                Some(tok)
            }
            Err(_) => None,
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Object> {
        if depth > MAX_DEPTH {
            return Err(Error::RecursionLimitExceeded(MAX_DEPTH));
        }
        self.rest = lexer::skip_ws(self.rest);
        let start = self.offset();
        let tok = self.next()?;
        let obj = match tok {
            Token::Integer(n) => self.integer_or_reference(n, start)?,
            Token::Real(text) => {
                Object::real_from_literal(String::from_utf8_lossy(text).into_owned())
            }
            Token::LiteralString(raw) => Object::string(decode_literal_string(raw)),
            Token::HexString(raw) => Object::string(decode_hex_string(raw)),
            Token::Name(n) => Object::name(n),
            Token::True => Object::boolean(true),
            Token::False => Object::boolean(false),
            Token::Null => Object::null(),
            Token::ArrayOpen => self.parse_array(depth + 1)?,
            Token::DictOpen => self.parse_dictionary(depth + 1)?,
            Token::ArrayClose | Token::DictClose | Token::Ref => {
                return Err(Error::Parse {
                    offset: start,
                    reason: format!("unexpected token {:?}", tok),
                });
            }
        };
        obj.set_parsed_offset(start as i64);
        if let Some(doc) = self.doc {
            if obj.document().is_none() {
                obj.set_owner(doc.downgrade(), ObjGen::default());
            }
        }
        Ok(obj)
    }

    /// An integer starts either a plain integer or an `n g R` reference;
    /// two tokens of lookahead decide which.
    fn integer_or_reference(&mut self, id: i64, start: usize) -> Result<Object> {
        let save = self.rest;
        if (0..=u32::MAX as i64).contains(&id) {
            if let Some(Token::Integer(gen)) = self.lookahead() {
                if (0..=u32::MAX as i64).contains(&gen)
                    && matches!(self.lookahead(), Some(Token::Ref))
                {
                    let Some(doc) = self.doc else {
                        return Err(Error::Parse {
                            offset: start,
                            reason: "indirect reference without an owning document".to_string(),
                        });
                    };
                    return Ok(doc.reference(ObjGen::new(id as u32, gen as u32)));
                }
            }
        }
        self.rest = save;
        Ok(Object::integer(id))
    }

    fn parse_array(&mut self, depth: usize) -> Result<Object> {
        let mut items = Vec::new();
        loop {
            let save = self.rest;
            match self.next() {
                Ok(Token::ArrayClose) => break,
                Ok(_) => {
                    self.rest = save;
                    items.push(self.parse_value(depth)?);
                }
                Err(Error::UnexpectedEof) => {
                    return Err(Error::Parse {
                        offset: self.offset(),
                        reason: "unterminated array".to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Object::array(items))
    }

    fn parse_dictionary(&mut self, depth: usize) -> Result<Object> {
        let mut dict = Dictionary::new();
        loop {
            self.rest = lexer::skip_ws(self.rest);
            let key_offset = self.offset();
            match self.next() {
                Ok(Token::DictClose) => break,
                Ok(Token::Name(key)) => {
                    let value = self.parse_value(depth)?;
                    dict.insert_raw(key, value);
                }
                Ok(tok) => {
                    return Err(Error::Parse {
                        offset: key_offset,
                        reason: format!("expected name key, found {:?}", tok),
                    });
                }
                Err(Error::UnexpectedEof) => {
                    return Err(Error::Parse {
                        offset: self.offset(),
                        reason: "unterminated dictionary".to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Object::from_dictionary(dict))
    }
}

/// Decode the escape sequences of a literal string body: the named escapes,
/// 1–3 digit octal codes, line continuations, and end-of-line normalization
/// to LF. A backslash before any other byte drops the backslash.
pub(crate) fn decode_literal_string(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let byte = raw[i];
        if byte == b'\\' {
            i += 1;
            let Some(&next) = raw.get(i) else { break };
            match next {
                b'n' => {
                    out.push(b'\n');
                    i += 1;
                }
                b'r' => {
                    out.push(b'\r');
                    i += 1;
                }
                b't' => {
                    out.push(b'\t');
                    i += 1;
                }
                b'b' => {
                    out.push(0x08);
                    i += 1;
                }
                b'f' => {
                    out.push(0x0C);
                    i += 1;
                }
                b'(' | b')' | b'\\' => {
                    out.push(next);
                    i += 1;
                }
                b'\r' => {
                    i += 1;
                    if raw.get(i) == Some(&b'\n') {
                        i += 1;
                    }
                }
                b'\n' => {
                    i += 1;
                }
                b'0'..=b'7' => {
                    let mut value = 0u32;
                    let mut digits = 0;
                    while digits < 3 {
                        match raw.get(i) {
                            Some(&d @ b'0'..=b'7') => {
                                value = value * 8 + u32::from(d - b'0');
                                i += 1;
                                digits += 1;
                            }
                            _ => break,
                        }
                    }
                    out.push((value & 0xFF) as u8);
                }
                other => {
                    out.push(other);
                    i += 1;
                }
            }
        } else if byte == b'\r' {
            out.push(b'\n');
            i += 1;
            if raw.get(i) == Some(&b'\n') {
                i += 1;
            }
        } else {
            out.push(byte);
            i += 1;
        }
    }
    out
}

/// Decode hex string digits, ignoring whitespace; an odd trailing digit is
/// padded with zero.
pub(crate) fn decode_hex_string(raw: &[u8]) -> Vec<u8> {
    let mut digits = raw.iter().filter(|b| b.is_ascii_hexdigit());
    let mut out = Vec::with_capacity(raw.len() / 2);
    while let Some(&hi) = digits.next() {
        let lo = digits.next().copied().unwrap_or(b'0');
        out.push(hex_digit(hi) * 16 + hex_digit(lo));
    }
    out
}

fn hex_digit(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        _ => byte - b'A' + 10,
    }
}
