//! Tokenizer for the object grammar.
//!
//! Produces the token stream consumed by [`crate::parser`]. Whitespace
//! (space, tab, CR, LF, NUL, form feed) and `%` comments are skipped before
//! every token. Escape decoding for literal and hex strings is deferred to
//! the parser; names decode their `#xx` escapes here, as the name grammar
//! requires.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{map, opt, recognize, value};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

/// A single token of the object grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Integer number (e.g. 42, -123)
    Integer(i64),
    /// Real number, kept as its source text (e.g. `3.14`, `-.5`, `5.`)
    Real(&'a [u8]),
    /// Literal string body with escape sequences not yet decoded
    LiteralString(&'a [u8]),
    /// Hex string body with embedded whitespace still present
    HexString(&'a [u8]),
    /// Name with `#xx` escapes decoded, without the leading slash
    Name(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// `<<`
    DictOpen,
    /// `>>`
    DictClose,
    /// The `R` keyword of an indirect reference
    Ref,
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}'
    )
}

/// Skip whitespace and `%` comments (comments run to end of line).
pub(crate) fn skip_ws(input: &[u8]) -> &[u8] {
    let mut rest = input;
    loop {
        while let Some(&byte) = rest.first() {
            if is_whitespace(byte) {
                rest = &rest[1..];
            } else {
                break;
            }
        }
        if rest.first() == Some(&b'%') {
            while let Some(&byte) = rest.first() {
                if byte == b'\r' || byte == b'\n' {
                    break;
                }
                rest = &rest[1..];
            }
        } else {
            return rest;
        }
    }
}

/// Integer or real. Signs and bare leading/trailing decimal points are
/// allowed (`+17`, `-.002`, `5.`). Integers too large for `i64` fall back to
/// the real form, keeping their text.
fn number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, text) = recognize(tuple((
        opt(alt((char('+'), char('-')))),
        alt((
            recognize(pair(
                take_while1(|b: u8| b.is_ascii_digit()),
                opt(pair(char('.'), take_while(|b: u8| b.is_ascii_digit()))),
            )),
            recognize(pair(char('.'), take_while1(|b: u8| b.is_ascii_digit()))),
        )),
    )))(input)?;

    if text.contains(&b'.') {
        return Ok((rest, Token::Real(text)));
    }
    match std::str::from_utf8(text).ok().and_then(|s| s.parse::<i64>().ok()) {
        Some(n) => Ok((rest, Token::Integer(n))),
        None => Ok((rest, Token::Real(text))),
    }
}

/// Literal string delimited by balanced parentheses. The scanner tracks
/// nesting depth and treats any backslash as protecting the next byte,
/// which is all the depth tracking needs; full escape decoding happens in
/// the parser.
fn literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.first() != Some(&b'(') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }
    let body = &input[1..];
    let mut depth = 1usize;
    let mut pos = 0usize;
    while pos < body.len() {
        match body[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&body[pos + 1..], Token::LiteralString(&body[..pos])));
                }
                pos += 1;
            }
            _ => pos += 1,
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}

/// Hex string delimited by angle brackets; `<<` is a dictionary, not a
/// string.
fn hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    delimited(
        char('<'),
        map(
            take_while(|b: u8| b.is_ascii_hexdigit() || is_whitespace(b)),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode `#xx` escape sequences in a name. Invalid sequences (a `#` not
/// followed by two hex digits) are kept literally.
pub fn decode_name_escapes(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Name: a slash followed by regular characters.
fn name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(
        char('/'),
        map(
            take_while(|b: u8| !is_whitespace(b) && !is_delimiter(b)),
            |bytes: &[u8]| {
                let raw = std::str::from_utf8(bytes).unwrap_or_default();
                Token::Name(decode_name_escapes(raw))
            },
        ),
    )(input)
}

/// Keywords and structural delimiters. `<<` and `>>` must be tried before
/// the single-character hex-string delimiters.
fn keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictOpen, tag(b"<<")),
        value(Token::DictClose, tag(b">>")),
        value(Token::ArrayOpen, tag(b"[")),
        value(Token::ArrayClose, tag(b"]")),
        value(Token::True, tag(b"true")),
        value(Token::False, tag(b"false")),
        value(Token::Null, tag(b"null")),
        value(Token::Ref, tag(b"R")),
    ))(input)
}

/// Lex one token, skipping leading whitespace and comments.
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let input = skip_ws(input);
    alt((keyword, name, number, literal_string, hex_string))(input)
}

/// Lex as many tokens as the input holds.
pub fn tokens(mut input: &[u8]) -> (Vec<Token<'_>>, &[u8]) {
    let mut out = Vec::new();
    while let Ok((rest, tok)) = token(input) {
        out.push(tok);
        input = rest;
    }
    (out, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(input: &[u8]) -> Token<'_> {
        let (rest, tok) = token(input).expect("token");
        assert!(skip_ws(rest).is_empty(), "trailing input: {:?}", rest);
        tok
    }

    #[test]
    fn test_integers() {
        assert_eq!(one(b"42"), Token::Integer(42));
        assert_eq!(one(b"-123"), Token::Integer(-123));
        assert_eq!(one(b"+17"), Token::Integer(17));
        assert_eq!(one(b"0"), Token::Integer(0));
    }

    #[test]
    fn test_reals_keep_source_text() {
        assert_eq!(one(b"3.14"), Token::Real(b"3.14"));
        assert_eq!(one(b"-.002"), Token::Real(b"-.002"));
        assert_eq!(one(b".5"), Token::Real(b".5"));
        assert_eq!(one(b"5."), Token::Real(b"5."));
    }

    #[test]
    fn test_integer_overflow_becomes_real() {
        assert_eq!(one(b"99999999999999999999"), Token::Real(b"99999999999999999999"));
    }

    #[test]
    fn test_literal_strings() {
        assert_eq!(one(b"(Hello)"), Token::LiteralString(b"Hello"));
        assert_eq!(one(b"(a (nested) b)"), Token::LiteralString(b"a (nested) b"));
        assert_eq!(one(b"(esc \\) paren)"), Token::LiteralString(b"esc \\) paren"));
        assert_eq!(one(b"()"), Token::LiteralString(b""));
    }

    #[test]
    fn test_unterminated_literal_string_fails() {
        assert!(token(b"(oops").is_err());
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(one(b"<48656C6C6F>"), Token::HexString(b"48656C6C6F"));
        assert_eq!(one(b"<48 65 6C>"), Token::HexString(b"48 65 6C"));
        assert_eq!(one(b"<>"), Token::HexString(b""));
    }

    #[test]
    fn test_names() {
        assert_eq!(one(b"/Type"), Token::Name("Type".to_string()));
        assert_eq!(one(b"/A#20B"), Token::Name("A B".to_string()));
        assert_eq!(one(b"/A#ZZ"), Token::Name("A#ZZ".to_string()));
        let (rest, tok) = token(b"/ x").unwrap();
        assert_eq!(tok, Token::Name(String::new()));
        assert_eq!(rest, b" x");
    }

    #[test]
    fn test_keywords_and_delimiters() {
        assert_eq!(one(b"true"), Token::True);
        assert_eq!(one(b"false"), Token::False);
        assert_eq!(one(b"null"), Token::Null);
        assert_eq!(one(b"["), Token::ArrayOpen);
        assert_eq!(one(b"]"), Token::ArrayClose);
        assert_eq!(one(b"<<"), Token::DictOpen);
        assert_eq!(one(b">>"), Token::DictClose);
        assert_eq!(one(b"R"), Token::Ref);
    }

    #[test]
    fn test_whitespace_and_comments_skipped() {
        assert_eq!(one(b"  \n\t42"), Token::Integer(42));
        assert_eq!(one(b"% comment\n42"), Token::Integer(42));
        assert_eq!(one(b"% one\n  % two\n42"), Token::Integer(42));
    }

    #[test]
    fn test_token_stream() {
        let (toks, rest) = tokens(b"1 0 R /Key (v) ]");
        assert!(rest.is_empty());
        assert_eq!(
            toks,
            vec![
                Token::Integer(1),
                Token::Integer(0),
                Token::Ref,
                Token::Name("Key".to_string()),
                Token::LiteralString(b"v"),
                Token::ArrayClose,
            ]
        );
    }

    #[test]
    fn test_dict_open_beats_hex_string() {
        assert_eq!(one(b"<<"), Token::DictOpen);
        assert_eq!(one(b"<AB>"), Token::HexString(b"AB"));
    }
}
