//! rawline - raw console input core for line editors
//!
//! rawline sits between a platform console driver and a line editor. It
//! puts the console into raw mode (and always puts it back), and turns the
//! driver's byte-at-a-time keystroke stream into logical input codes.
//!
//! # Features
//!
//! - **Mode control**: raw mode on initialize, atomic echo toggling,
//!   exactly-once restore from either an explicit call or process exit
//! - **Special keys**: Windows `224`/`0` two-byte sequences mapped to the
//!   emacs-style control codes a line editor binds
//! - **Multi-byte text**: UTF-8/UTF-16/UTF-32 characters reassembled after
//!   their lead byte was consumed for key classification
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use rawline::{Config, ConsoleTerminal, ExitHooks, Input, WindowsConsole};
//!
//! let hooks = ExitHooks::new();
//! hooks.install_panic_hook();
//! let _guard = hooks.guard();
//!
//! let driver = Arc::new(WindowsConsole::new()?);
//! let terminal = ConsoleTerminal::new(driver, &Config::load(), hooks);
//! terminal.initialize()?;
//! while let Some(code) = terminal.read_virtual_key(Input::Console)? {
//!     if code == u32::from(b'\r') {
//!         break;
//!     }
//! }
//! terminal.restore()?;
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

pub mod config;
pub mod core;
pub mod input;
pub mod logging;
pub mod terminal;

pub use crate::config::{Config, ConfigError};
pub use crate::core::console::{ConsoleDriver, ConsoleError, ModeFlags};
pub use crate::core::exit::{ExitGuard, ExitHooks, HookId};
pub use crate::core::mode::{ModeController, ModeError};
pub use crate::core::replay::{DecodeError, Encoding, ReplayDecoder};
#[cfg(windows)]
pub use crate::core::win32::WindowsConsole;
pub use crate::input::{ctrl, InputError, KeyDecoder, KeyMapping};
pub use crate::terminal::{ConsoleTerminal, Input};
