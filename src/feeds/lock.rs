//! Per-feed single-flight locks.
//!
//! Guards the create path: at most one operation per feed identity may be in
//! flight, and a competing call fails immediately instead of queueing.
//! Release is tied to guard drop so every exit path, success or failure,
//! frees the slot.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which feed identities currently have an operation in flight.
#[derive(Clone, Default)]
pub struct SingleFlight {
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to claim the slot for `key`.
    ///
    /// Returns `None` when an operation for the same key is already running.
    pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
        let mut inflight = self.inflight.lock().ok()?;
        if !inflight.insert(key.to_string()) {
            return None;
        }
        Some(FlightGuard {
            inflight: Arc::clone(&self.inflight),
            key: key.to_string(),
        })
    }

    /// Number of operations currently in flight.
    pub fn len(&self) -> usize {
        self.inflight.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its slot on drop.
pub struct FlightGuard {
    inflight: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if let Ok(mut inflight) = self.inflight.lock() {
            inflight.remove(&self.key);
        }
    }
}
