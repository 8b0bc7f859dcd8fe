//! Visual escaping of command names and arguments.
//!
//! Process names come straight from the kernel and may contain tabs,
//! newlines, or arbitrary bytes. Everything is converted to a printable form
//! before it is measured or written:
//!
//! - ASCII control bytes become `^X` (`^I` for tab, `^J` for newline, `^?`
//!   for DEL)
//! - bytes that do not decode as UTF-8 become `M-` forms of their low seven
//!   bits (`0xff` is `M-^?`)
//! - C1 control characters are escaped byte by byte like undecodable bytes
//! - everything else, including space and backslash, passes through
//!
//! Widths are terminal columns of the escaped form: East Asian wide
//! characters take two, combining marks none.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Escape `bytes` into a printable string.
pub fn visual(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());

    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c.is_ascii() {
                push_ascii(&mut out, c as u8);
            } else if c.is_control() {
                let mut buf = [0u8; 4];
                for &b in c.encode_utf8(&mut buf).as_bytes() {
                    push_meta(&mut out, b);
                }
            } else {
                out.push(c);
            }
        }
        for &b in chunk.invalid() {
            push_meta(&mut out, b);
        }
    }

    out
}

/// Display width of already-escaped text, in columns.
pub fn width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `columns`, and its width.
///
/// A wide character that would straddle the limit is left out whole.
pub fn take_columns(text: &str, columns: usize) -> (&str, usize) {
    let mut used = 0;
    for (index, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > columns {
            return (&text[..index], used);
        }
        used += w;
    }
    (text, used)
}

fn push_ascii(out: &mut String, b: u8) {
    match b {
        0x7f => out.push_str("^?"),
        0..=0x1f => {
            out.push('^');
            out.push((b + b'@') as char);
        }
        _ => out.push(b as char),
    }
}

fn push_meta(out: &mut String, b: u8) {
    if b & 0x80 != 0 {
        out.push_str("M-");
    }
    push_ascii(out, b & 0x7f);
}
