//! Debug pretty-printer for CBOR cursors.
//!
//! Produces a JSON-like rendering for inspection/logging. Errors
//! encountered partway through a container are reported inline rather
//! than aborting the whole dump, mirroring the original's best-effort
//! debug dumper.

use crate::cbor::cursor::{Cursor, Type};
use alloc::string::String;
use core::fmt::Write as _;

fn dump_into(cursor: Cursor<'_>, out: &mut String) {
    match cursor.get_type() {
        Type::Number => match cursor.get_value() {
            Ok(v) => {
                let _ = write!(out, "{v}");
            }
            Err(_) => out.push_str("<ERROR>"),
        },
        Type::Boolean => match cursor.get_value() {
            Ok(v) => out.push_str(if v != 0 { "true" } else { "false" }),
            Err(_) => out.push_str("<ERROR>"),
        },
        Type::Null => out.push_str("null"),
        Type::String => match cursor.get_str() {
            Ok(s) => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '\n' => out.push_str("\\n"),
                        '"' => out.push_str("\\\""),
                        c if (c as u32) < 32 || (c as u32) >= 127 => {
                            let _ = write!(out, "\\x{:02x}", c as u32);
                        }
                        c => out.push(c),
                    }
                }
                out.push('"');
            }
            Err(_) => out.push_str("<ERROR>"),
        },
        Type::Data => match cursor.get_data() {
            Ok(bytes) => {
                out.push_str("0x");
                for b in bytes {
                    let _ = write!(out, "{b:02x}");
                }
            }
            Err(_) => out.push_str("<ERROR>"),
        },
        Type::Array => {
            out.push_str("[ ");
            let mut first = true;
            let mut iter = cursor.iterate();
            let mut err = None;
            while let Some(child) = iter.next_child() {
                match child {
                    Ok(child) => {
                        if !first {
                            out.push_str(", ");
                        }
                        first = false;
                        dump_into(child, out);
                    }
                    Err(e) => {
                        err = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = err.or(iter.error()) {
                let _ = write!(out, "<ERROR status={e:?}>");
                return;
            }
            if !first {
                out.push(' ');
            }
            out.push(']');
        }
        Type::Map => {
            out.push_str("{ ");
            let mut first = true;
            let mut iter = cursor.iterate();
            let mut err = None;
            while let Some(child) = iter.next_child() {
                match child {
                    Ok(child) => {
                        if !first {
                            out.push_str(", ");
                        }
                        first = false;
                        if let Ok(key) = iter.key() {
                            dump_into(key, out);
                        }
                        out.push_str(": ");
                        dump_into(child, out);
                    }
                    Err(e) => {
                        err = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = err.or(iter.error()) {
                let _ = write!(out, "<ERROR status={e:?}>");
                return;
            }
            if !first {
                out.push(' ');
            }
            out.push('}');
        }
        Type::Error => out.push_str("<ERROR>"),
    }
}

/// Renders `cursor` as a JSON-like debug string.
pub fn dump(cursor: Cursor<'_>) -> String {
    let mut out = String::new();
    dump_into(cursor, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_map() {
        let bytes = hex_literal::hex!("a2 61 61 01 61 62 83 f5 f6 62 68 69");
        let cursor = Cursor::walk(&bytes);
        assert_eq!(dump(cursor), r#"{ "a": 1, "b": [ true, null, "hi" ] }"#);
    }
}
