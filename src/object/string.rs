//! PDF string values.
//!
//! Strings are byte arrays and may contain arbitrary binary data, including
//! embedded NULs. Serialization picks literal `(...)` form when every byte is
//! printable and hex `<...>` form otherwise.

use serde_json::Value as Json;

/// Serialize string bytes in literal or hex form.
pub(crate) fn unparse(data: &[u8]) -> String {
    let printable = data
        .iter()
        .all(|&b| b == b'\n' || b == b'\r' || b == b'\t' || (0x20..=0x7E).contains(&b));

    if printable {
        let mut out = String::with_capacity(data.len() + 2);
        out.push('(');
        for &byte in data {
            match byte {
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                b'\\' => out.push_str("\\\\"),
                b'\n' => out.push_str("\\n"),
                b'\r' => out.push_str("\\r"),
                b'\t' => out.push_str("\\t"),
                _ => out.push(byte as char),
            }
        }
        out.push(')');
        out
    } else {
        let mut out = String::with_capacity(data.len() * 2 + 2);
        out.push('<');
        for byte in data {
            out.push_str(&format!("{:02X}", byte));
        }
        out.push('>');
        out
    }
}

/// Decode string bytes to UTF-8 text.
///
/// A leading UTF-16BE byte-order mark selects UTF-16 decoding per the PDF
/// text-string rules; everything else is taken as-is with invalid sequences
/// replaced.
pub(crate) fn utf8_value(data: &[u8]) -> String {
    if data.len() >= 2 && data[0] == 0xFE && data[1] == 0xFF {
        let units = data[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}

/// Byte-preserving text form: every byte maps to the code point of the same
/// value, so no byte is lost to replacement characters.
pub(crate) fn raw_value(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

/// JSON form of a string. Version 1 decodes to UTF-8 text; version 2 and up
/// preserve the raw bytes.
pub(crate) fn to_json(data: &[u8], version: i32) -> Json {
    if version == 1 {
        Json::String(utf8_value(data))
    } else {
        Json::String(raw_value(data))
    }
}
