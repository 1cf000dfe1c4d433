//! Core console components.
//!
//! This module contains the low-level pieces that do not know about keys:
//!
//! - **console**: `ConsoleDriver` capability trait and `ModeFlags`
//! - **mode**: raw/cooked mode control with exactly-once restore
//! - **exit**: process-exit cleanup registry
//! - **replay**: multi-byte character reassembly behind a consumed lead byte
//! - **win32**: native Win32 driver (Windows only)
//!
//! # Architecture
//!
//! ```text
//! ModeController
//! ├── ConsoleDriver (get_mode / set_mode)
//! └── ExitHooks (restore action at process exit)
//!
//! ReplayDecoder
//! └── ReplayStream (lead byte + bounded reads from the real source)
//! ```

pub mod console;
pub mod exit;
pub mod mode;
pub mod replay;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;
