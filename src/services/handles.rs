//! Revocable display handles for encoded image bytes.
//!
//! A [`DisplayHandle`] plays the role a browser object URL plays: it lets a
//! blob be referenced without copying and must be revoked explicitly when
//! the owner is done with it. The store tracks live handles so leaks are
//! observable in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identifier of a registered blob. Cheap to copy, useless after revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(u64);

impl DisplayHandle {
    /// URI-style rendering of the handle, usable as an image source key.
    pub fn uri(&self) -> String {
        format!("blob:imgshift/{}", self.0)
    }
}

/// Registry of live blobs keyed by handle.
pub struct HandleStore {
    blobs: Mutex<HashMap<u64, Arc<Vec<u8>>>>,
    next_id: AtomicU64,
}

impl HandleStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a blob and get a handle for it.
    pub fn install(&self, blob: Arc<Vec<u8>>) -> DisplayHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.blobs
            .lock()
            .expect("handle store lock poisoned")
            .insert(id, blob);
        DisplayHandle(id)
    }

    /// Look up a handle's bytes. `None` after revocation.
    pub fn resolve(&self, handle: DisplayHandle) -> Option<Arc<Vec<u8>>> {
        self.blobs
            .lock()
            .expect("handle store lock poisoned")
            .get(&handle.0)
            .cloned()
    }

    /// Release a handle. Revoking twice is a no-op.
    pub fn revoke(&self, handle: DisplayHandle) {
        self.blobs
            .lock()
            .expect("handle store lock poisoned")
            .remove(&handle.0);
    }

    /// Number of handles currently live.
    pub fn active_handles(&self) -> usize {
        self.blobs.lock().expect("handle store lock poisoned").len()
    }
}

impl Default for HandleStore {
    fn default() -> Self {
        Self::new()
    }
}
