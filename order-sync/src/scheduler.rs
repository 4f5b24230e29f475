//! Coalescing refresh timer
//!
//! Single slot: the first request arms a timer for the window, requests
//! arriving while it is armed fold into it. The callback therefore runs at
//! most once per window and never later than one window after the first
//! request.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

type RefreshFn = Arc<dyn Fn() + Send + Sync>;

pub struct RefreshScheduler {
    window: Duration,
    on_fire: RefreshFn,
    armed: Arc<AtomicBool>,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("window", &self.window)
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl RefreshScheduler {
    pub fn new(window: Duration, on_fire: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            window,
            on_fire: Arc::new(on_fire),
            armed: Arc::new(AtomicBool::new(false)),
            slot: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Request a refresh; returns `false` when folded into a pending one
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) -> bool {
        if self
            .armed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let window = self.window;
        let armed = self.armed.clone();
        let on_fire = self.on_fire.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Disarm first so a request made by the callback arms a new timer
            armed.store(false, Ordering::SeqCst);
            on_fire();
        });
        if let Some(previous) = self.slot.lock().replace(handle) {
            previous.abort();
        }
        true
    }

    /// Drop a pending refresh, if any
    pub fn cancel(&self) {
        if let Some(handle) = self.slot.lock().take() {
            handle.abort();
        }
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.get_mut().take() {
            handle.abort();
        }
    }
}
