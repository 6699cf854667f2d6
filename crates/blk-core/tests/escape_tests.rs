//! Escape codec tests: the named escape table, octal and hex runs, and the
//! malformed-sequence tolerances.

use blk_core::{decode_escapes, encode_escapes};

// ============================================================================
// decode
// ============================================================================

#[test]
fn plain_text_decodes_borrowed() {
    assert!(matches!(
        decode_escapes("no escapes here"),
        std::borrow::Cow::Borrowed("no escapes here")
    ));
}

#[test]
fn named_escapes_decode() {
    assert_eq!(decode_escapes("a\\nb"), "a\nb");
    assert_eq!(decode_escapes("\\t\\r\\v\\f"), "\t\r\x0B\x0C");
    assert_eq!(decode_escapes("\\a\\b\\e"), "\x07\x08\x1B");
    assert_eq!(decode_escapes("\\'\\\"\\\\\\?"), "'\"\\?");
}

#[test]
fn hex_escapes_decode() {
    assert_eq!(decode_escapes("\\x41"), "A");
    assert_eq!(decode_escapes("\\x41BC"), "\u{BC}");
    assert_eq!(decode_escapes("\\x7 end"), "\x07 end");
}

#[test]
fn long_hex_run_truncates_to_one_byte() {
    // Arbitrarily many digits accumulate, only the low byte survives.
    assert_eq!(decode_escapes("\\x1234567890ABCDEF1"), "\u{F1}");
}

#[test]
fn broken_hex_keeps_literal_backslash_x() {
    assert_eq!(decode_escapes("\\xg"), "\\xg");
    assert_eq!(decode_escapes("tail\\x"), "tail\\x");
}

#[test]
fn octal_escapes_decode() {
    assert_eq!(decode_escapes("\\101"), "A");
    assert_eq!(decode_escapes("\\0"), "\0");
    assert_eq!(decode_escapes("\\78"), "\x078");
}

#[test]
fn octal_stops_after_three_digits() {
    // Fourth digit is ordinary text.
    assert_eq!(decode_escapes("\\1017"), "A7");
}

#[test]
fn unknown_escape_keeps_raw_char() {
    assert_eq!(decode_escapes("\\q"), "q");
    assert_eq!(decode_escapes("\\\u{00e9}"), "\u{00e9}");
}

#[test]
fn trailing_lone_backslash_decodes_to_nothing() {
    assert_eq!(decode_escapes("abc\\"), "abc");
}

// ============================================================================
// encode
// ============================================================================

#[test]
fn named_escapes_encode() {
    assert_eq!(encode_escapes("a\nb"), "a\\nb");
    assert_eq!(encode_escapes("quote\" back\\"), "quote\\\" back\\\\");
    assert_eq!(encode_escapes("?"), "\\?");
}

#[test]
fn unnamed_controls_encode_as_uppercase_hex() {
    assert_eq!(encode_escapes("\u{01}\u{1F}"), "\\x01\\x1F");
}

#[test]
fn printable_text_passes_through() {
    assert_eq!(encode_escapes("plain text 123"), "plain text 123");
    assert_eq!(encode_escapes("caf\u{00e9}"), "caf\u{00e9}");
}

#[test]
fn encode_decode_is_identity_for_control_bytes() {
    let s: String = (0u8..32).map(|b| b as char).collect();
    assert_eq!(decode_escapes(&encode_escapes(&s)), s);
}
