//! Session persistence: the narrow seam between the core and whatever
//! key/value store the host provides.
//!
//! The core never touches a process-wide store directly. It reads and
//! writes opaque serialized snapshots through [`SessionStore`], injected at
//! construction. Values are plain strings; durability beyond the browsing
//! session is explicitly not assumed, and a missing or malformed entry is
//! never fatal.

use std::collections::HashMap;
use std::sync::Mutex;

/// Keys the workflow machine persists under. Kept in one place so a host
/// embedding the core can mirror or migrate them.
pub mod keys {
    pub const STEP: &str = "printcorner.step";
    pub const HIGHEST_STEP: &str = "printcorner.step.highest";
    pub const CONFIG: &str = "printcorner.config";
    pub const FILES: &str = "printcorner.files";
    pub const SHOP: &str = "printcorner.shop";
}

/// A key/value store scoped to the browsing session.
///
/// Implementations must be cheap to call from the single UI-thread
/// timeline; both methods are synchronous and infallible. A store that
/// can fail should swallow and log, mirroring the best-effort semantics
/// of `sessionStorage`.
pub trait SessionStore: Send + Sync {
    /// Fetch the value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: String);
}

/// In-memory store: the default for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        // A poisoned lock only means a writer panicked mid-insert; the map
        // itself is still usable for best-effort session state.
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }
}
