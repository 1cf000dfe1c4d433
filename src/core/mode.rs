//! Console mode control
//!
//! Puts the console into raw mode for the lifetime of a session and puts the
//! original mode back exactly once, whether the session ends through
//! [`ModeController::restore`] or through the process-exit hook.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::console::{ConsoleDriver, ConsoleError, ModeFlags};
use super::exit::{ExitHooks, HookId};

#[derive(Error, Debug)]
pub enum ModeError {
    #[error("Native console mode call failed: {0}")]
    NativeMode(#[from] ConsoleError),

    #[error("Console mode already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, ModeError>;

/// How long the exit-time restore waits for a concurrent mode change.
const EXIT_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct ModeState {
    /// Mode captured by `initialize`, the only restore target
    original: Option<ModeFlags>,
    raw: bool,
    echo_enabled: bool,
    /// Pending exit-time restore; whoever takes it does the final write
    hook: Option<HookId>,
}

/// Raw/cooked mode controller for one console session.
pub struct ModeController {
    driver: Arc<dyn ConsoleDriver>,
    hooks: ExitHooks,
    state: Arc<Mutex<ModeState>>,
}

impl ModeController {
    pub fn new(driver: Arc<dyn ConsoleDriver>, hooks: ExitHooks) -> Self {
        Self {
            driver,
            hooks,
            state: Arc::new(Mutex::new(ModeState::default())),
        }
    }

    /// Capture the current mode, switch to raw mode and register the
    /// exit-time restore.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.original.is_some() {
            return Err(ModeError::AlreadyInitialized);
        }

        let original = self.driver.get_mode()?;
        let raw = original.raw();
        self.driver.set_mode(raw)?;
        debug!(
            "Console mode 0x{:08X} -> raw 0x{:08X}",
            original.bits(),
            raw.bits()
        );

        state.original = Some(original);
        state.raw = true;
        state.echo_enabled = false;

        let driver = Arc::clone(&self.driver);
        let shared = Arc::clone(&self.state);
        state.hook = Some(self.hooks.register(move || {
            restore_at_exit(driver.as_ref(), &shared);
        }));

        Ok(())
    }

    /// Write the original mode back and drop the exit-time restore.
    ///
    /// Only the first successful call writes; later calls, and the exit hook
    /// after a successful call, do nothing.
    pub fn restore(&self) -> Result<()> {
        let mut state = self.state.lock();
        let (Some(hook), Some(original)) = (state.hook, state.original) else {
            return Ok(());
        };

        // On failure the hook stays registered so exit can retry
        self.driver.set_mode(original)?;
        state.hook = None;
        state.raw = false;
        self.hooks.deregister(hook);
        debug!("Console mode restored to 0x{:08X}", original.bits());
        Ok(())
    }

    /// Turn echo, line input, processed input and window input back on.
    pub fn enable_echo(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mode = self.driver.get_mode()?;
        self.driver.set_mode(mode | ModeFlags::COOKED)?;
        state.echo_enabled = true;
        state.raw = false;
        Ok(())
    }

    /// Turn echo, line input, processed input and window input off.
    pub fn disable_echo(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mode = self.driver.get_mode()?;
        self.driver.set_mode(mode.raw())?;
        state.echo_enabled = false;
        state.raw = true;
        Ok(())
    }

    /// Last known echo state; does not query the console.
    pub fn is_echo_enabled(&self) -> bool {
        self.state.lock().echo_enabled
    }

    /// Whether the console is currently in raw mode as far as we know.
    pub fn is_raw(&self) -> bool {
        self.state.lock().raw
    }

    /// Mode captured by `initialize`, if any.
    pub fn original_mode(&self) -> Option<ModeFlags> {
        self.state.lock().original
    }
}

fn restore_at_exit(driver: &dyn ConsoleDriver, state: &Mutex<ModeState>) {
    // The lock may be held by the thread that is panicking into this hook
    let Some(mut state) = state.try_lock_for(EXIT_LOCK_TIMEOUT) else {
        warn!("Console mode state is locked; skipping restore at exit");
        return;
    };
    if state.hook.take().is_none() {
        return;
    }
    state.raw = false;
    if let Some(original) = state.original {
        // Nobody is left to report to
        match driver.set_mode(original) {
            Ok(()) => debug!("Console mode restored at exit"),
            Err(e) => warn!("Failed to restore console mode at exit: {}", e),
        }
    }
}
