//! The string escape codec.
//!
//! Decoding is a single-pass state machine over the raw text:
//!
//! ```text
//! NORMAL --'\'--> ESCAPE --0..7--> OCT_1 --0..7--> OCT_2
//!                    |
//!                    +--'x'--> HEX --hexdigit--> HEX_MORE
//! ```
//!
//! Copying is deferred: as long as no escape has been seen the decoder tracks
//! a borrowed run of the source, and a string with no escapes decodes to a
//! borrowed slice with no allocation. Octal and hex runs terminate on the
//! first non-matching character, which is then reprocessed in NORMAL state.
//!
//! Escaped bytes become chars U+0000..=U+00FF: blk-core works in `String`,
//! so `\xFF` decodes to the single char U+00FF, and [`encode_escapes`] maps
//! it straight back. Hex runs accumulate with wrapping arithmetic and
//! truncate to one byte at emit, so an absurdly long digit run cannot
//! overflow.

use std::borrow::Cow;

use tracing::warn;

use crate::error::{Diagnostic, FallbackPolicy};

/// The 12 named escapes, decoded char by escape letter.
const NAMED_ESCAPES: [(char, char); 12] = [
    ('a', '\x07'),
    ('b', '\x08'),
    ('e', '\x1B'),
    ('f', '\x0C'),
    ('n', '\n'),
    ('r', '\r'),
    ('t', '\t'),
    ('v', '\x0B'),
    ('\'', '\''),
    ('"', '"'),
    ('\\', '\\'),
    ('?', '?'),
];

fn decode_named(c: char) -> Option<char> {
    NAMED_ESCAPES
        .iter()
        .find(|&&(name, _)| name == c)
        .map(|&(_, code)| code)
}

fn encode_named(c: char) -> Option<char> {
    NAMED_ESCAPES
        .iter()
        .find(|&&(_, code)| code == c)
        .map(|&(name, _)| name)
}

#[derive(Clone, Copy, PartialEq)]
enum State {
    Normal,
    Escape,
    Oct1,
    Oct2,
    Hex,
    HexMore,
}

/// Result of scanning a (possibly quoted) escaped region.
pub(crate) struct Scan<'a> {
    /// The decoded text. Borrowed when the region contained no escape.
    pub text: Cow<'a, str>,
    /// Byte offset of the terminating `"` (or the end of input).
    pub end: usize,
    /// Whether an unescaped closing `"` was found.
    pub terminated: bool,
}

/// One byte's worth of an accumulated octal/hex code, as a char.
fn code_char(code: u32) -> char {
    // code & 0xFF is always a valid scalar value
    char::from_u32(code & 0xFF).unwrap_or('\u{0}')
}

/// Runs the decode state machine over `src[start..]`.
///
/// With `stop_at_quote`, an unescaped `"` terminates the scan (quoted string
/// payloads); otherwise the machine runs to the end of input (whole-slice
/// decoding). `line` is attached to any diagnostics produced.
fn run_decoder<'a>(
    src: &'a str,
    start: usize,
    stop_at_quote: bool,
    line: usize,
    diags: &mut Vec<Diagnostic>,
) -> Scan<'a> {
    let bytes = src.as_bytes();
    let mut out = String::new();
    let mut had_escape = false;
    let mut run_start = start;
    let mut terminated = false;
    let mut state = State::Normal;
    let mut code: u32 = 0;

    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Normal => {
                if stop_at_quote && b == b'"' {
                    terminated = true;
                    break;
                }
                if b == b'\\' {
                    out.push_str(&src[run_start..i]);
                    had_escape = true;
                    code = 0;
                    state = State::Escape;
                    i += 1;
                } else {
                    i += 1;
                }
            }
            State::Escape => match b {
                b'x' => {
                    state = State::Hex;
                    i += 1;
                }
                b'0'..=b'7' => {
                    code = u32::from(b - b'0');
                    state = State::Oct1;
                    i += 1;
                }
                _ => {
                    // Named escape, or an unknown one kept verbatim. Advance
                    // by the whole char so multi-byte input stays intact.
                    let c = src[i..].chars().next().unwrap_or('\u{0}');
                    match decode_named(c) {
                        Some(decoded) => out.push(decoded),
                        None => {
                            out.push(c);
                            warn!(line, "unknown escape sequence \\{c}");
                            diags.push(Diagnostic::new(
                                line,
                                FallbackPolicy::RawCharKept,
                                format!("unknown escape sequence \\{c}"),
                            ));
                        }
                    }
                    i += c.len_utf8();
                    state = State::Normal;
                    run_start = i;
                }
            },
            State::Oct1 => {
                if (b'0'..=b'7').contains(&b) {
                    code = code * 8 + u32::from(b - b'0');
                    state = State::Oct2;
                    i += 1;
                } else {
                    out.push(code_char(code));
                    state = State::Normal;
                    run_start = i;
                }
            }
            State::Oct2 => {
                if (b'0'..=b'7').contains(&b) {
                    code = code * 8 + u32::from(b - b'0');
                    out.push(code_char(code));
                    state = State::Normal;
                    i += 1;
                    run_start = i;
                } else {
                    out.push(code_char(code));
                    state = State::Normal;
                    run_start = i;
                }
            }
            State::Hex => match hex_digit(b) {
                Some(d) => {
                    code = code * 16 + d;
                    state = State::HexMore;
                    i += 1;
                }
                None => {
                    warn!(line, "broken hex escape sequence");
                    diags.push(Diagnostic::new(
                        line,
                        FallbackPolicy::LiteralHexKept,
                        "broken hex escape sequence",
                    ));
                    out.push('\\');
                    out.push('x');
                    state = State::Normal;
                    run_start = i;
                }
            },
            State::HexMore => match hex_digit(b) {
                Some(d) => {
                    code = code.wrapping_mul(16).wrapping_add(d);
                    i += 1;
                }
                None => {
                    out.push(code_char(code));
                    state = State::Normal;
                    run_start = i;
                }
            },
        }
    }

    if !had_escape {
        return Scan {
            text: Cow::Borrowed(&src[start..i]),
            end: i,
            terminated,
        };
    }

    // Flush whatever the final state left pending: end of input terminates an
    // octal/hex run the same way a non-matching character would.
    match state {
        State::Normal => out.push_str(&src[run_start..i]),
        State::Oct1 | State::Oct2 | State::HexMore => out.push(code_char(code)),
        State::Hex => {
            warn!(line, "broken hex escape sequence");
            diags.push(Diagnostic::new(
                line,
                FallbackPolicy::LiteralHexKept,
                "broken hex escape sequence",
            ));
            out.push('\\');
            out.push('x');
        }
        // A trailing lone backslash decodes to nothing.
        State::Escape => {}
    }

    Scan {
        text: Cow::Owned(out),
        end: i,
        terminated,
    }
}

fn hex_digit(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
        _ => None,
    }
}

/// Scans a quoted string payload starting right after the opening `"`.
/// `scan.end` points at the closing quote when `scan.terminated`.
pub(crate) fn scan_quoted<'a>(
    src: &'a str,
    start: usize,
    line: usize,
    diags: &mut Vec<Diagnostic>,
) -> Scan<'a> {
    run_decoder(src, start, true, line, diags)
}

/// Decodes escape sequences in a whole slice (no quote handling).
///
/// Returns a borrowed slice when `raw` contains no backslash. Anomalies
/// (unknown escapes, broken hex runs) follow the parser's fallback policies
/// but are only logged here, not collected.
pub fn decode_escapes(raw: &str) -> Cow<'_, str> {
    let mut diags = Vec::new();
    run_decoder(raw, 0, false, 0, &mut diags).text
}

/// Encodes a string for emission inside `"` quotes: the 12 named escapes
/// become two-character sequences, any other char below 0x20 becomes `\xHH`
/// (uppercase hex), everything else passes through unchanged.
pub fn encode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if let Some(name) = encode_named(c) {
            out.push('\\');
            out.push(name);
        } else if (c as u32) < 0x20 {
            out.push_str(&format!("\\x{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
