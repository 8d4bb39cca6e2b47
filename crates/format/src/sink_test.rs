//! Tests for the ASCII-escaping sink

use std::io::Write;

use super::*;

/// Decode `\uXXXX` escapes back into UTF-16 code units and rebuild the
/// original string; everything else must be plain ASCII.
fn unescape(text: &str) -> String {
    let mut units = Vec::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            assert_eq!(chars.next(), Some('u'));
            let hex: String = (0..4).filter_map(|_| chars.next()).collect();
            assert_eq!(hex.len(), 4);
            assert_eq!(hex.to_lowercase(), hex, "escape digits must be lowercase");
            units.push(u16::from_str_radix(&hex, 16).unwrap());
        } else {
            assert!(ch.is_ascii(), "unescaped non-ascii {ch:?}");
            units.push(ch as u16);
        }
    }
    String::from_utf16(&units).unwrap()
}

#[test]
fn test_ascii_passes_through_verbatim() {
    let mut sink = EscapingSink::with_capacity(64);
    sink.write_str("{\"a\":1,\"b\":[true,null]}");
    assert_eq!(sink.as_str(), "{\"a\":1,\"b\":[true,null]}");
}

#[test]
fn test_non_ascii_char_escapes_lowercase() {
    let mut sink = EscapingSink::default();
    sink.write_char('\u{e9}');
    assert_eq!(sink.as_str(), "\\u00e9");

    sink.clear();
    sink.write_char('\u{20ac}');
    assert_eq!(sink.as_str(), "\\u20ac");
}

#[test]
fn test_astral_char_escapes_as_surrogate_pair() {
    let mut sink = EscapingSink::default();
    sink.write_char('\u{1d11e}');
    assert_eq!(sink.as_str(), "\\ud834\\udd1e");

    sink.clear();
    sink.write_str("\u{1f600}");
    assert_eq!(sink.as_str(), "\\ud83d\\ude00");
}

#[test]
fn test_mixed_string() {
    let mut sink = EscapingSink::default();
    sink.write_str("caf\u{e9} au lait");
    assert_eq!(sink.as_str(), "caf\\u00e9 au lait");
}

#[test]
fn test_escape_round_trip() {
    for input in ["h\u{e9}llo", "\u{1d11e} clef", "\u{65e5}\u{672c}\u{8a9e}", "plain"] {
        let mut sink = EscapingSink::default();
        sink.write_str(input);
        let out = sink.into_string();
        assert!(out.is_ascii(), "non-ascii output for {input:?}");
        assert_eq!(unescape(&out), input);
    }
}

#[test]
fn test_write_chars() {
    let mut sink = EscapingSink::default();
    sink.write_chars(['o', 'k', '\u{e9}']);
    assert_eq!(sink.as_str(), "ok\\u00e9");
}

#[test]
fn test_io_write_reports_full_length() {
    let mut sink = EscapingSink::default();
    let written = sink.write(b"abc").unwrap();
    assert_eq!(written, 3);
    assert_eq!(sink.as_str(), "abc");
}

#[test]
fn test_io_write_split_two_byte_sequence() {
    let mut sink = EscapingSink::default();
    let bytes = "\u{e9}".as_bytes();
    sink.write_all(&bytes[..1]).unwrap();
    assert!(sink.is_empty(), "half a code point must not be emitted");
    sink.write_all(&bytes[1..]).unwrap();
    assert_eq!(sink.as_str(), "\\u00e9");
}

#[test]
fn test_io_write_split_four_byte_sequence() {
    let mut sink = EscapingSink::default();
    let bytes = "\u{1d11e}".as_bytes();
    assert_eq!(bytes.len(), 4);
    sink.write_all(&bytes[..1]).unwrap();
    sink.write_all(&bytes[1..3]).unwrap();
    sink.write_all(&bytes[3..]).unwrap();
    assert_eq!(sink.as_str(), "\\ud834\\udd1e");
}

#[test]
fn test_io_write_mixed_chunk_with_trailing_partial() {
    let mut sink = EscapingSink::default();
    let text = "a\u{e9}b";
    let bytes = text.as_bytes();
    // Split inside the two-byte é
    sink.write_all(&bytes[..2]).unwrap();
    sink.write_all(&bytes[2..]).unwrap();
    assert_eq!(sink.as_str(), "a\\u00e9b");
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let mut sink = EscapingSink::default();
    let err = sink.write(&[0xff, 0xfe]).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    // Lone continuation byte
    let mut sink = EscapingSink::default();
    assert!(sink.write(&[0x80]).is_err());
}

#[test]
fn test_capacity_hint_and_growth() {
    let mut sink = EscapingSink::with_capacity(128);
    assert!(sink.capacity() >= 128);
    assert!(sink.is_empty());

    sink.write_str(&"x".repeat(1024));
    assert_eq!(sink.len(), 1024);
    assert!(sink.capacity() >= 1024);
}

#[test]
fn test_clear_retains_capacity_and_carry() {
    let mut sink = EscapingSink::with_capacity(64);
    sink.write_str(&"y".repeat(500));
    sink.clear();
    assert!(sink.is_empty());
    assert!(sink.capacity() >= 64);

    // A pending partial sequence is discarded by clear
    sink.write_all(&"\u{e9}".as_bytes()[..1]).unwrap();
    sink.clear();
    sink.write_str("ok");
    assert_eq!(sink.as_str(), "ok");
}

#[test]
fn test_flush_is_idempotent() {
    let mut sink = EscapingSink::default();
    sink.flush().unwrap();
    sink.flush().unwrap();
}

#[test]
fn test_empty_writes_are_noops() {
    let mut sink = EscapingSink::default();
    assert_eq!(sink.write(b"").unwrap(), 0);
    sink.write_str("");
    assert!(sink.is_empty());
}

#[test]
fn test_fmt_write_integration() {
    let mut sink = EscapingSink::default();
    std::fmt::Write::write_str(&mut sink, "n=7 s=").unwrap();
    std::fmt::Write::write_char(&mut sink, '\u{fe}').unwrap();
    assert_eq!(sink.as_str(), "n=7 s=\\u00fe");
}
