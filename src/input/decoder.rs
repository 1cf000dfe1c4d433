//! Keystroke decoder
//!
//! Reads one logical event at a time from a forward-only byte source:
//!
//! - `224 x` / `0 x`: special key, translated through [`KeyMapping`]
//! - `> 128`: lead byte of a multi-byte character, handed to the replay
//!   decoder together with the source
//! - anything else: returned as-is
//!
//! The indicator bytes are never treated as text lead bytes, so `224` is
//! always a special key even though it is also a valid UTF-8 lead.

use std::io::{self, Read};

use thiserror::Error;
use tracing::trace;

use super::keymap::{KeyMapping, NO_EVENT};
use crate::core::console::ConsoleError;
use crate::core::replay::{DecodeError, Encoding, ReplayDecoder};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to decode input: {0}")]
    Decode(#[source] DecodeError),

    #[error("Failed to read input: {0}")]
    Io(#[source] io::Error),

    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl From<io::Error> for InputError {
    fn from(e: io::Error) -> Self {
        // Driver failures surface as ConsoleError whichever read path hit them
        if !e.get_ref().is_some_and(|inner| inner.is::<ConsoleError>()) {
            return InputError::Io(e);
        }
        match e.into_inner().map(|inner| inner.downcast::<ConsoleError>()) {
            Some(Ok(console)) => InputError::Console(*console),
            _ => InputError::Io(io::Error::new(
                io::ErrorKind::Other,
                "console error lost in conversion",
            )),
        }
    }
}

impl From<DecodeError> for InputError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Io(e) => InputError::from(e),
            e => InputError::Decode(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Turns raw console bytes into logical codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDecoder {
    replay: ReplayDecoder,
}

impl KeyDecoder {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            replay: ReplayDecoder::new(encoding),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.replay.encoding()
    }

    /// Read the next logical event.
    ///
    /// Returns `Ok(None)` when the source is exhausted before an event
    /// starts. A special-key indicator at the very end of the source yields
    /// [`NO_EVENT`].
    pub fn next_event<R: Read + ?Sized>(&self, source: &mut R) -> Result<Option<u32>> {
        let Some(indicator) = read_one(source)? else {
            return Ok(None);
        };

        if KeyMapping::is_indicator(indicator) {
            let code = match read_one(source)? {
                Some(follow) => {
                    trace!("Special key {} {}", indicator, follow);
                    KeyMapping::lookup(indicator, follow)
                }
                None => NO_EVENT,
            };
            return Ok(Some(code));
        }

        if indicator > 128 {
            return Ok(Some(self.replay.decode(indicator, source)?));
        }

        Ok(Some(u32::from(indicator)))
    }
}

/// One byte from the source, `None` at end of data.
pub(crate) fn read_one<R: Read + ?Sized>(source: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keymap::ctrl;
    use std::io::Cursor;

    fn events(encoding: Encoding, bytes: &[u8]) -> Vec<u32> {
        let decoder = KeyDecoder::new(encoding);
        let mut src = Cursor::new(bytes.to_vec());
        let mut out = Vec::new();
        while let Some(code) = decoder.next_event(&mut src).unwrap() {
            out.push(code);
        }
        out
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(events(Encoding::Utf8, &[224, 72]), vec![ctrl::CTRL_P]);
        assert_eq!(events(Encoding::Utf8, &[0, 80]), vec![ctrl::CTRL_N]);
        assert_eq!(events(Encoding::Utf8, &[224, 200]), vec![NO_EVENT]);
    }

    #[test]
    fn test_plain_bytes() {
        assert_eq!(events(Encoding::Utf8, &[65]), vec![65]);
        assert_eq!(events(Encoding::Utf8, b"\r\x03"), vec![0x0D, 0x03]);
        // 128 is not above the threshold
        assert_eq!(events(Encoding::Utf8, &[128]), vec![128]);
    }

    #[test]
    fn test_multibyte_between_keys() {
        // "a", "é", up arrow, "€", "b"
        let bytes = [b'a', 0xC3, 0xA9, 224, 72, 0xE2, 0x82, 0xAC, b'b'];
        assert_eq!(
            events(Encoding::Utf8, &bytes),
            vec![0x61, 0xE9, ctrl::CTRL_P, 0x20AC, 0x62]
        );
    }

    #[test]
    fn test_single_byte_encoding() {
        assert_eq!(events(Encoding::SingleByte, &[0xE9, b'x']), vec![0xE9, 0x78]);
    }

    #[test]
    fn test_invalid_lead_byte() {
        let decoder = KeyDecoder::new(Encoding::Utf8);
        let mut src = Cursor::new(vec![0x85, b'a']);

        assert!(matches!(
            decoder.next_event(&mut src),
            Err(InputError::Decode(DecodeError::InvalidLeadByte(0x85)))
        ));
        // The next event is unaffected
        assert_eq!(decoder.next_event(&mut src).unwrap(), Some(0x61));
    }

    #[test]
    fn test_indicator_at_end() {
        assert_eq!(events(Encoding::Utf8, &[224]), vec![NO_EVENT]);
    }

    #[test]
    fn test_empty_source() {
        assert!(events(Encoding::Utf8, &[]).is_empty());
    }

    #[test]
    fn test_io_error_is_not_decode_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let decoder = KeyDecoder::new(Encoding::Utf8);
        let mut src = Cursor::new(vec![0xC3]).chain(Broken);
        assert!(matches!(
            decoder.next_event(&mut src),
            Err(InputError::Io(_))
        ));
    }

    #[test]
    fn test_wrapped_console_error_is_recovered() {
        struct Unplugged;
        impl Read for Unplugged {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(
                    io::ErrorKind::Other,
                    ConsoleError::InvalidHandle,
                ))
            }
        }

        let decoder = KeyDecoder::new(Encoding::Utf8);
        assert!(matches!(
            decoder.next_event(&mut Unplugged),
            Err(InputError::Console(ConsoleError::InvalidHandle))
        ));

        // Also when the failure hits the body of a multi-byte character
        let mut src = Cursor::new(vec![0xC3]).chain(Unplugged);
        assert!(matches!(
            decoder.next_event(&mut src),
            Err(InputError::Console(ConsoleError::InvalidHandle))
        ));
    }
}
