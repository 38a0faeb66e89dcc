//! PDF name values.
//!
//! Names are stored decoded, without the leading slash. Serialization
//! re-applies `#xx` escapes for every byte the name grammar cannot carry
//! literally. A stored NUL byte encodes an invalid `#` sequence seen by the
//! tokenizer and round-trips back to a bare `#`.

use serde_json::Value as Json;

/// Serialize a name with the leading slash and `#xx` escapes.
pub(crate) fn unparse(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    out.push('/');
    for byte in name.bytes() {
        match byte {
            0x00 => out.push('#'),
            b'#' | b'/' | b'(' | b')' | b'{' | b'}' | b'<' | b'>' | b'[' | b']' | b'%' => {
                out.push_str(&format!("#{:02X}", byte));
            }
            33..=126 => out.push(byte as char),
            _ => out.push_str(&format!("#{:02X}", byte)),
        }
    }
    out
}

/// JSON form of a name. Version 1 applies the same normalization as
/// [`unparse`]; version 2 and up preserve the raw name bytes.
pub(crate) fn to_json(name: &str, version: i32) -> Json {
    if version == 1 {
        Json::String(unparse(name))
    } else {
        Json::String(format!("/{}", name))
    }
}
