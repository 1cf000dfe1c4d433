//! In-memory console driver for tests.

use std::collections::VecDeque;
use std::io;

use parking_lot::Mutex;

use super::console::{ConsoleDriver, ConsoleError, ModeFlags, Result};

/// Typical cooked-mode value of a fresh Windows console (0x1F7).
pub const COOKED_MODE: u32 = 0x01F7;

#[derive(Default)]
struct FakeState {
    mode: u32,
    set_calls: Vec<u32>,
    input: VecDeque<u8>,
    fail_get: bool,
    fail_set: bool,
}

pub struct FakeConsole {
    state: Mutex<FakeState>,
    width: u16,
    height: u16,
}

impl FakeConsole {
    pub fn new() -> Self {
        Self::with_mode(COOKED_MODE)
    }

    pub fn with_mode(mode: u32) -> Self {
        Self {
            state: Mutex::new(FakeState {
                mode,
                ..FakeState::default()
            }),
            width: 120,
            height: 40,
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_input(self, bytes: &[u8]) -> Self {
        self.state.lock().input.extend(bytes.iter().copied());
        self
    }

    pub fn mode(&self) -> u32 {
        self.state.lock().mode
    }

    /// Every value passed to `set_mode`, in order.
    pub fn set_calls(&self) -> Vec<u32> {
        self.state.lock().set_calls.clone()
    }

    pub fn set_count(&self) -> usize {
        self.state.lock().set_calls.len()
    }

    pub fn fail_get(&self, fail: bool) {
        self.state.lock().fail_get = fail;
    }

    pub fn fail_set(&self, fail: bool) {
        self.state.lock().fail_set = fail;
    }
}

impl ConsoleDriver for FakeConsole {
    fn get_mode(&self) -> Result<ModeFlags> {
        let state = self.state.lock();
        if state.fail_get {
            return Err(ConsoleError::GetMode(io::Error::new(
                io::ErrorKind::Other,
                "fake get failure",
            )));
        }
        Ok(ModeFlags::from_bits_retain(state.mode))
    }

    fn set_mode(&self, mode: ModeFlags) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_set {
            return Err(ConsoleError::SetMode(io::Error::new(
                io::ErrorKind::Other,
                "fake set failure",
            )));
        }
        state.mode = mode.bits();
        state.set_calls.push(mode.bits());
        Ok(())
    }

    fn read_raw_byte(&self) -> Result<u8> {
        self.state.lock().input.pop_front().ok_or_else(|| {
            ConsoleError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "fake console input exhausted",
            ))
        })
    }

    fn query_width(&self) -> u16 {
        self.width
    }

    fn query_height(&self) -> u16 {
        self.height
    }
}
