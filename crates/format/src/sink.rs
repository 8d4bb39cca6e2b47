//! ASCII-escaping text sink
//!
//! Accumulates JSON text while transcoding every non-ASCII character
//! into `\uXXXX` escapes during the single write pass, so the finished
//! string is 7-bit clean without a second scan. Characters above
//! U+FFFF are emitted as two escapes, one per UTF-16 code unit,
//! matching encoders that work in 16-bit units.

use std::fmt;
use std::io;

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Growable text sink producing 7-bit-clean, JSON-compatible output
///
/// Not thread-safe: create one per format call, or reuse a single
/// instance under exclusive ownership via [`clear`](Self::clear).
///
/// Implements [`std::io::Write`] so a `serde_json::Serializer` can
/// drive it directly; incoming UTF-8 is decoded incrementally, so a
/// multi-byte sequence split across two `write` calls is handled.
#[derive(Debug, Default)]
pub struct EscapingSink {
    buf: String,

    /// Capacity re-ensured by `clear`
    hint: usize,

    /// Undecoded tail of a UTF-8 sequence split across writes
    carry: [u8; 4],
    carry_len: usize,
}

impl EscapingSink {
    /// Create a sink with `hint` bytes preallocated
    ///
    /// The hint avoids early reallocation; the buffer still grows past
    /// it transparently when more is written.
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            buf: String::with_capacity(hint),
            hint,
            carry: [0; 4],
            carry_len: 0,
        }
    }

    /// Append a string, escaping where needed
    pub fn write_str(&mut self, text: &str) {
        if text.is_ascii() {
            self.buf.push_str(text);
            return;
        }
        for ch in text.chars() {
            self.write_char(ch);
        }
    }

    /// Append a sequence of characters, escaping where needed
    pub fn write_chars<I>(&mut self, chars: I)
    where
        I: IntoIterator<Item = char>,
    {
        for ch in chars {
            self.write_char(ch);
        }
    }

    /// Append one character, escaped unless it is 7-bit ASCII
    pub fn write_char(&mut self, ch: char) {
        if ch.is_ascii() {
            self.buf.push(ch);
        } else {
            let mut units = [0u16; 2];
            for &unit in ch.encode_utf16(&mut units).iter() {
                self.push_escape(unit);
            }
        }
    }

    /// Allocated capacity of the underlying buffer, not its length
    ///
    /// Read after an encode pass, this reports how large the buffer
    /// actually had to grow; the adaptive formatter feeds it back into
    /// its size estimator.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Length in bytes of the accumulated text
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the accumulated text
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the sink, returning the accumulated text
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Drop the accumulated text, keeping at least the construction
    /// hint allocated so the instance can be reused without
    /// reallocating
    pub fn clear(&mut self) {
        self.buf.clear();
        self.carry_len = 0;
        if self.buf.capacity() < self.hint {
            self.buf.reserve(self.hint);
        }
    }

    fn push_escape(&mut self, unit: u16) {
        self.buf.push_str("\\u");
        for shift in [12u32, 8, 4, 0] {
            self.buf.push(HEX[((unit >> shift) & 0xf) as usize] as char);
        }
    }

    fn push_bytes(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        // Finish a code point left incomplete by the previous write
        while self.carry_len > 0 {
            let Some((&next, rest)) = bytes.split_first() else {
                return Ok(());
            };
            self.carry[self.carry_len] = next;
            self.carry_len += 1;
            bytes = rest;

            match std::str::from_utf8(&self.carry[..self.carry_len]) {
                Ok(done) => {
                    if let Some(ch) = done.chars().next() {
                        self.write_char(ch);
                    }
                    self.carry_len = 0;
                }
                // Still incomplete: a carry never exceeds 4 bytes, at
                // which point from_utf8 decides one way or the other
                Err(err) if err.error_len().is_none() => {}
                Err(_) => return Err(invalid_utf8()),
            }
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => {
                self.write_str(text);
                Ok(())
            }
            Err(err) => {
                let (head, tail) = bytes.split_at(err.valid_up_to());
                let text = std::str::from_utf8(head).map_err(|_| invalid_utf8())?;
                self.write_str(text);

                match err.error_len() {
                    // Incomplete trailing sequence: at most 3 bytes,
                    // carried into the next write
                    None => {
                        self.carry[..tail.len()].copy_from_slice(tail);
                        self.carry_len = tail.len();
                        Ok(())
                    }
                    Some(_) => Err(invalid_utf8()),
                }
            }
        }
    }
}

impl io::Write for EscapingSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.push_bytes(bytes)?;
        Ok(bytes.len())
    }

    /// Nothing to flush; safe to call any number of times
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for EscapingSink {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        EscapingSink::write_str(self, text);
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> fmt::Result {
        EscapingSink::write_char(self, ch);
        Ok(())
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "sink received invalid utf-8")
}
