//! Stale-result guard for page views.
//!
//! Every page view takes a [`ViewTicket`] before it starts fetching from the
//! backend. Opening another page in the same session bumps that session's
//! generation, so when the first fetch finally resolves its ticket is no
//! longer current and the result is dropped instead of rendered. Pending
//! requests are not aborted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct ViewTracker {
    next_generation: AtomicU64,
    current: Mutex<HashMap<String, u64>>,
}

/// Proof that a view was the most recent one for its session when it started.
#[derive(Debug, Clone)]
pub struct ViewTicket {
    tracker: Arc<ViewTracker>,
    key: String,
    generation: u64,
    view: &'static str,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `view` as the active view for the session identified by `key`.
    pub fn enter(self: &Arc<Self>, key: &str, view: &'static str) -> ViewTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), generation);

        ViewTicket {
            tracker: Arc::clone(self),
            key: key.to_string(),
            generation,
            view,
        }
    }

    /// Drop all bookkeeping for a session (on logout).
    pub fn forget(&self, key: &str) {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    fn generation_of(&self, key: &str) -> Option<u64> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }

    pub fn session_count(&self) -> usize {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ViewTicket {
    pub fn is_current(&self) -> bool {
        self.tracker.generation_of(&self.key) == Some(self.generation)
    }

    pub fn view(&self) -> &'static str {
        self.view
    }
}
