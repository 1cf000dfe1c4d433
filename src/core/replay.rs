//! Multi-byte character replay
//!
//! The byte source is forward-only: once the key decoder has consumed a lead
//! byte to rule out a special-key sequence, that byte is gone. The replay
//! decoder puts it back in front of a bounded view of the real source, reads
//! exactly one character's worth of bytes and decodes them.
//!
//! The bound matters more than the replay. A decoder that reads ahead would
//! swallow the first bytes of the *next* keystroke, so [`ReplayStream`]
//! reports its own remaining count and never the source's.

use std::io::{self, Read};

use thiserror::Error;

/// Code returned for a malformed or truncated character body.
pub const REPLACEMENT: u32 = char::REPLACEMENT_CHARACTER as u32;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid UTF-8 first byte: 0x{0:02X}")]
    InvalidLeadByte(u8),

    #[error("Failed to read character body: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Input text encoding, fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16,
    Utf32,
    SingleByte,
}

impl Encoding {
    /// Map an encoding name (case-insensitive). Unknown names are treated
    /// as single-byte code pages.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Encoding::Utf8,
            "UTF-16" | "UTF16" => Encoding::Utf16,
            "UTF-32" | "UTF32" => Encoding::Utf32,
            _ => Encoding::SingleByte,
        }
    }

    /// Total byte length of the character starting with `first`.
    pub fn char_len(self, first: u8) -> Result<usize> {
        match self {
            Encoding::Utf8 => utf8_len(first),
            Encoding::Utf16 => Ok(2),
            Encoding::Utf32 => Ok(4),
            Encoding::SingleByte => Ok(1),
        }
    }

    fn decode_bytes(self, bytes: &[u8]) -> u32 {
        match (self, bytes) {
            (Encoding::SingleByte, [b]) => u32::from(*b),
            (Encoding::Utf8, _) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.chars().next())
                .map_or(REPLACEMENT, u32::from),
            (Encoding::Utf16, [hi, lo]) => {
                let unit = u16::from_be_bytes([*hi, *lo]);
                char::from_u32(u32::from(unit)).map_or(REPLACEMENT, u32::from)
            }
            (Encoding::Utf32, [a, b, c, d]) => {
                char::from_u32(u32::from_be_bytes([*a, *b, *c, *d]))
                    .map_or(REPLACEMENT, u32::from)
            }
            _ => REPLACEMENT,
        }
    }
}

fn utf8_len(first: u8) -> Result<usize> {
    if first & 0xE0 == 0xC0 {
        // 110yyyyy 10zzzzzz
        Ok(2)
    } else if first & 0xF0 == 0xE0 {
        // 1110xxxx 10yyyyyy 10zzzzzz
        Ok(3)
    } else if first & 0xF8 == 0xF0 {
        // 11110www 10xxxxxx 10yyyyyy 10zzzzzz
        Ok(4)
    } else {
        Err(DecodeError::InvalidLeadByte(first))
    }
}

/// Synthetic stream: the recorded lead byte, then at most `expected - 1`
/// bytes of the real source.
pub struct ReplayStream<'a, R: Read + ?Sized> {
    first: u8,
    expected: usize,
    delivered: usize,
    source: &'a mut R,
}

impl<'a, R: Read + ?Sized> ReplayStream<'a, R> {
    pub fn new(encoding: Encoding, first: u8, source: &'a mut R) -> Result<Self> {
        Ok(Self {
            first,
            expected: encoding.char_len(first)?,
            delivered: 0,
            source,
        })
    }

    /// Bytes this stream will still deliver.
    pub fn remaining(&self) -> usize {
        self.expected - self.delivered
    }

    pub fn expected_len(&self) -> usize {
        self.expected
    }

    /// Next byte, or `None` once the character is complete or the real
    /// source hit end of data.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        if self.delivered == 0 {
            self.delivered = 1;
            return Ok(Some(self.first));
        }

        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => {
                    // Source ended mid-character; nothing more to replay
                    self.delivered = self.expected;
                    return Ok(None);
                }
                Ok(_) => {
                    self.delivered += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read + ?Sized> Read for ReplayStream<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte()? {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// Reassembles one character from a consumed lead byte and the live source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayDecoder {
    encoding: Encoding,
}

impl ReplayDecoder {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decode the character whose first byte was `first`.
    ///
    /// Reads exactly `char_len(first) - 1` further bytes from `source`.
    /// Returns the character's code point, or U+FFFD if the body is
    /// malformed or the source ends early.
    pub fn decode<R: Read + ?Sized>(&self, first: u8, source: &mut R) -> Result<u32> {
        let mut stream = ReplayStream::new(self.encoding, first, source)?;

        let mut bytes = [0u8; 4];
        let mut len = 0;
        while let Some(b) = stream.read_byte()? {
            bytes[len] = b;
            len += 1;
        }

        let code = self.encoding.decode_bytes(&bytes[..len]);
        tracing::trace!(
            "Replayed {:?} character {:02X?} -> U+{:04X}",
            self.encoding,
            &bytes[..len],
            code
        );
        Ok(code)
    }
}
