//! Process-exit cleanup registry
//!
//! Rust has no runtime shutdown hooks, so the process-lifetime owner (usually
//! `main`) holds an [`ExitHooks`] and runs it on the way out, through an
//! [`ExitGuard`], the panic hook, or an explicit [`ExitHooks::run`].
//!
//! Actions run at most once. The registry lock is never held while an action
//! runs, so an action may take other locks freely.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type Action = Box<dyn FnOnce() + Send + 'static>;

/// Handle returned by [`ExitHooks::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(u64);

#[derive(Default)]
struct HooksInner {
    next_id: u64,
    actions: BTreeMap<HookId, Action>,
}

/// Shared registry of cleanup actions to run at process exit.
#[derive(Clone, Default)]
pub struct ExitHooks {
    inner: Arc<Mutex<HooksInner>>,
}

impl ExitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action to run at exit.
    pub fn register<F: FnOnce() + Send + 'static>(&self, action: F) -> HookId {
        let mut inner = self.inner.lock();
        let id = HookId(inner.next_id);
        inner.next_id += 1;
        inner.actions.insert(id, Box::new(action));
        id
    }

    /// Remove a registered action without running it.
    ///
    /// Returns false if the action already ran or was already removed.
    pub fn deregister(&self, id: HookId) -> bool {
        self.inner.lock().actions.remove(&id).is_some()
    }

    /// Number of actions still pending.
    pub fn len(&self) -> usize {
        self.inner.lock().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every pending action, most recently registered first.
    pub fn run(&self) {
        let actions = std::mem::take(&mut self.inner.lock().actions);
        if !actions.is_empty() {
            tracing::debug!("Running {} exit hook(s)", actions.len());
        }
        for (_, action) in actions.into_iter().rev() {
            action();
        }
    }

    /// Run pending actions before the default panic report.
    pub fn install_panic_hook(&self) {
        let hooks = self.clone();
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            hooks.run();
            default_hook(info);
        }));
    }

    /// Guard that runs pending actions when dropped.
    pub fn guard(&self) -> ExitGuard {
        ExitGuard {
            hooks: self.clone(),
        }
    }
}

impl fmt::Debug for ExitHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitHooks")
            .field("pending", &self.len())
            .finish()
    }
}

/// Runs the registry's pending actions on drop.
#[derive(Debug)]
#[must_use = "exit hooks run when the guard is dropped"]
pub struct ExitGuard {
    hooks: ExitHooks,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.hooks.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_run_once() {
        let hooks = ExitHooks::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        hooks.register(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        hooks.run();
        hooks.run();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_deregister() {
        let hooks = ExitHooks::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let id = hooks.register(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(hooks.deregister(id));
        assert!(!hooks.deregister(id));
        hooks.run();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reverse_order() {
        let hooks = ExitHooks::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let order = order.clone();
            hooks.register(move || order.lock().push(n));
        }

        hooks.run();
        assert_eq!(*order.lock(), vec![2, 1, 0]);
    }

    #[test]
    fn test_guard_runs_on_drop() {
        let hooks = ExitHooks::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        hooks.register(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        {
            let _guard = hooks.guard();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_may_register() {
        // The registry lock is released before actions run
        let hooks = ExitHooks::new();
        let inner = hooks.clone();
        hooks.register(move || {
            inner.register(|| {});
        });

        hooks.run();
        assert_eq!(hooks.len(), 1);
    }
}
