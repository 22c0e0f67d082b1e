//! Process-wide table of live native session handles
//!
//! Controllers register the native address of their session here and expose
//! only the resulting [`NativeHandle`]. Lower-level components resolve a handle
//! back to the engine address; nobody outside the owning controller gets a
//! mutable path to the session.

use crate::types::NativeHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct HandleEntry {
    address: usize,
    identifying_context: String,
}

lazy_static::lazy_static! {
    static ref HANDLE_TABLE: RwLock<HashMap<NativeHandle, HandleEntry>> = RwLock::new(HashMap::new());
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Register a live session and allocate a fresh handle for it
pub fn register(address: usize, identifying_context: &str) -> NativeHandle {
    let handle = NativeHandle::from_raw(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
    let mut table = HANDLE_TABLE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.insert(
        handle,
        HandleEntry {
            address,
            identifying_context: identifying_context.to_string(),
        },
    );
    log::debug!(
        "Registered native handle {} for context '{}' ({} live)",
        handle,
        identifying_context,
        table.len()
    );
    handle
}

/// Native engine address behind a live handle
pub fn resolve(handle: NativeHandle) -> Option<usize> {
    HANDLE_TABLE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&handle)
        .map(|entry| entry.address)
}

pub fn context_of(handle: NativeHandle) -> Option<String> {
    HANDLE_TABLE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&handle)
        .map(|entry| entry.identifying_context.clone())
}

/// Drop a handle from the table. Returns false if it was not live.
pub fn unregister(handle: NativeHandle) -> bool {
    let removed = HANDLE_TABLE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(&handle)
        .is_some();
    if removed {
        log::debug!("Unregistered native handle {}", handle);
    }
    removed
}

pub fn live_count() -> usize {
    HANDLE_TABLE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .len()
}
