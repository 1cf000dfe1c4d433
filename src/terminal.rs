//! Console terminal
//!
//! The surface the line editor talks to. Combines mode control, key decoding
//! and the choice between reading the native console directly and reading a
//! caller-supplied stream.
//!
//! Reading the native console directly is what makes the arrow keys visible
//! at all: the plain stdin stream never sees the `224 x` sequences.

use std::io::{self, Read};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::core::console::ConsoleDriver;
use crate::core::exit::ExitHooks;
use crate::core::mode::{self, ModeController};
use crate::core::replay::Encoding;
use crate::input::decoder::{self, read_one, KeyDecoder};

/// Fallback size when neither the driver nor crossterm knows.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// Where a read comes from.
pub enum Input<'a> {
    /// The process console (standard input).
    Console,
    /// Any other byte stream.
    Stream(&'a mut dyn Read),
}

/// [`Read`] over the driver's blocking raw byte read.
struct DirectConsole<'a> {
    driver: &'a dyn ConsoleDriver,
}

impl Read for DirectConsole<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self
            .driver
            .read_raw_byte()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(1)
    }
}

/// Raw console terminal for a line editor.
pub struct ConsoleTerminal {
    driver: Arc<dyn ConsoleDriver>,
    mode: ModeController,
    decoder: KeyDecoder,
    direct_console: Option<bool>,
}

impl ConsoleTerminal {
    pub fn new(driver: Arc<dyn ConsoleDriver>, config: &Config, hooks: ExitHooks) -> Self {
        let encoding = config.encoding();
        debug!(
            "Console terminal: encoding {:?} ({}), direct console {:?}",
            encoding, config.input_encoding, config.direct_console
        );
        Self {
            mode: ModeController::new(Arc::clone(&driver), hooks),
            driver,
            decoder: KeyDecoder::new(encoding),
            direct_console: config.direct_console,
        }
    }

    /// Enter raw mode and register the exit-time restore.
    pub fn initialize(&self) -> mode::Result<()> {
        self.mode.initialize()?;
        info!("Console initialized in raw mode");
        Ok(())
    }

    /// Put the original console mode back. Safe to call more than once.
    pub fn restore(&self) -> mode::Result<()> {
        self.mode.restore()
    }

    pub fn enable_echo(&self) -> mode::Result<()> {
        self.mode.enable_echo()
    }

    pub fn disable_echo(&self) -> mode::Result<()> {
        self.mode.disable_echo()
    }

    pub fn is_echo_enabled(&self) -> bool {
        self.mode.is_echo_enabled()
    }

    pub fn encoding(&self) -> Encoding {
        self.decoder.encoding()
    }

    /// Read one raw byte, `None` at end of input.
    pub fn read_character(&self, input: Input<'_>) -> decoder::Result<Option<u32>> {
        if self.reads_direct(&input) {
            return Ok(Some(u32::from(self.driver.read_raw_byte()?)));
        }

        let byte = match input {
            Input::Console => read_one(&mut io::stdin().lock())?,
            Input::Stream(stream) => read_one(stream)?,
        };
        Ok(byte.map(u32::from))
    }

    /// Read one logical key: a control code for special keys, otherwise the
    /// decoded character. `None` at end of input.
    pub fn read_virtual_key(&self, input: Input<'_>) -> decoder::Result<Option<u32>> {
        if self.reads_direct(&input) {
            let mut direct = DirectConsole {
                driver: self.driver.as_ref(),
            };
            return self.decoder.next_event(&mut direct);
        }

        match input {
            Input::Console => self.decoder.next_event(&mut io::stdin().lock()),
            Input::Stream(stream) => self.decoder.next_event(stream),
        }
    }

    fn reads_direct(&self, input: &Input<'_>) -> bool {
        match self.direct_console {
            Some(direct) => direct,
            None => matches!(input, Input::Console),
        }
    }

    /// Override direct console reads (None = auto-detect).
    pub fn set_direct_console(&mut self, direct_console: Option<bool>) {
        self.direct_console = direct_console;
    }

    pub fn direct_console(&self) -> Option<bool> {
        self.direct_console
    }

    pub fn terminal_width(&self) -> u16 {
        match self.driver.query_width() {
            0 => fallback_size().0,
            width => width,
        }
    }

    pub fn terminal_height(&self) -> u16 {
        match self.driver.query_height() {
            0 => fallback_size().1,
            height => height,
        }
    }

    pub fn is_supported(&self) -> bool {
        true
    }

    /// Windows consoles are not assumed to understand ANSI sequences.
    pub fn is_ansi_supported(&self) -> bool {
        false
    }

    /// The console never echoes by itself in raw mode; the line editor must.
    pub fn echoes_input(&self) -> bool {
        false
    }
}

fn fallback_size() -> (u16, u16) {
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => (cols, rows),
        _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
    }
}
