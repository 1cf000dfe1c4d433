//! Win32 console driver
//!
//! Mode calls go to the standard input handle, size queries to the standard
//! output handle. Raw bytes come from the CRT's `_getch`, which is what
//! reports special keys as `0`/`224` followed by a scan code.

use std::io;

use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Console::{
    GetConsoleMode, GetConsoleScreenBufferInfo, GetStdHandle, SetConsoleMode, CONSOLE_MODE,
    CONSOLE_SCREEN_BUFFER_INFO, STD_HANDLE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

use super::console::{ConsoleDriver, ConsoleError, ModeFlags, Result};

extern "C" {
    fn _getch() -> i32;
}

fn os_error(e: windows::core::Error) -> io::Error {
    io::Error::from_raw_os_error(e.code().0)
}

fn std_handle(which: STD_HANDLE) -> Result<HANDLE> {
    // Handles are looked up per call, so the driver holds no raw pointers
    let handle = unsafe { GetStdHandle(which) }.map_err(|_| ConsoleError::InvalidHandle)?;
    if handle.is_invalid() {
        return Err(ConsoleError::InvalidHandle);
    }
    Ok(handle)
}

/// Console driver for the process's own Win32 console.
#[derive(Debug)]
pub struct WindowsConsole {
    _private: (),
}

impl WindowsConsole {
    /// Fails with `InvalidHandle` when the process has no console input.
    pub fn new() -> Result<Self> {
        std_handle(STD_INPUT_HANDLE)?;
        Ok(Self { _private: () })
    }

    fn screen_info(&self) -> Option<CONSOLE_SCREEN_BUFFER_INFO> {
        let handle = std_handle(STD_OUTPUT_HANDLE).ok()?;
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe { GetConsoleScreenBufferInfo(handle, &mut info) }.ok()?;
        Some(info)
    }
}

impl ConsoleDriver for WindowsConsole {
    fn get_mode(&self) -> Result<ModeFlags> {
        let handle = std_handle(STD_INPUT_HANDLE)?;
        let mut mode = CONSOLE_MODE(0);
        unsafe { GetConsoleMode(handle, &mut mode) }
            .map_err(|e| ConsoleError::GetMode(os_error(e)))?;
        Ok(ModeFlags::from_bits_retain(mode.0))
    }

    fn set_mode(&self, mode: ModeFlags) -> Result<()> {
        let handle = std_handle(STD_INPUT_HANDLE)?;
        unsafe { SetConsoleMode(handle, CONSOLE_MODE(mode.bits())) }
            .map_err(|e| ConsoleError::SetMode(os_error(e)))
    }

    fn read_raw_byte(&self) -> Result<u8> {
        let ch = unsafe { _getch() };
        u8::try_from(ch).map_err(|_| {
            ConsoleError::Read(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("_getch returned {}", ch),
            ))
        })
    }

    fn query_width(&self) -> u16 {
        self.screen_info()
            .map(|info| info.srWindow.Right - info.srWindow.Left + 1)
            .and_then(|w| u16::try_from(w).ok())
            .unwrap_or(0)
    }

    fn query_height(&self) -> u16 {
        self.screen_info()
            .map(|info| info.srWindow.Bottom - info.srWindow.Top + 1)
            .and_then(|h| u16::try_from(h).ok())
            .unwrap_or(0)
    }
}
