//! Native console capability
//!
//! The core never talks to the OS directly. Everything it needs from the
//! console driver goes through [`ConsoleDriver`], so the Win32 driver and the
//! in-memory test fake are interchangeable.

use std::io;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Console input mode bits (values from wincon.h).
    ///
    /// The native mode is an opaque integer; bits without a name here are
    /// carried through unchanged.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ModeFlags: u32 {
        /// Ctrl+C and other control keys are handled by the system.
        const PROCESSED_INPUT = 0x0001;
        /// Reads return only after a carriage return.
        const LINE_INPUT      = 0x0002;
        /// Typed characters are written to the screen buffer.
        const ECHO_INPUT      = 0x0004;
        /// Buffer size changes are reported as input records.
        const WINDOW_INPUT    = 0x0008;
        /// Mouse events are placed in the input buffer.
        const MOUSE_INPUT     = 0x0010;

        const _ = !0;
    }
}

impl ModeFlags {
    /// Bits cleared for raw mode and toggled together by echo control.
    ///
    /// Toggling ECHO_INPUT alone leaves some consoles in a state where
    /// neither echo nor line input works, so these always move as one.
    pub const COOKED: Self = Self::LINE_INPUT
        .union(Self::ECHO_INPUT)
        .union(Self::PROCESSED_INPUT)
        .union(Self::WINDOW_INPUT);

    /// The raw-mode value derived from a cooked mode.
    pub fn raw(self) -> Self {
        self.difference(Self::COOKED)
    }
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to get console mode: {0}")]
    GetMode(#[source] io::Error),

    #[error("Failed to set console mode: {0}")]
    SetMode(#[source] io::Error),

    #[error("Failed to read from console: {0}")]
    Read(#[source] io::Error),

    #[error("Invalid handle")]
    InvalidHandle,
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Capabilities consumed from the platform console driver.
///
/// Implementations must be shareable with the exit-time cleanup thread.
pub trait ConsoleDriver: Send + Sync {
    /// Current native input mode.
    fn get_mode(&self) -> Result<ModeFlags>;

    /// Replace the native input mode.
    fn set_mode(&self, mode: ModeFlags) -> Result<()>;

    /// Block until one raw byte is available.
    fn read_raw_byte(&self) -> Result<u8>;

    /// Visible width in columns, 0 if unknown.
    fn query_width(&self) -> u16;

    /// Visible height in rows, 0 if unknown.
    fn query_height(&self) -> u16;
}
