//! Context handle management
//!
//! Hosts never see a pointer to a [`SatchelContext`]. They hold a registry
//! id disguised as a pointer, so a freed or forged handle is a failed lookup
//! instead of a dangling dereference.

use crate::context::SatchelContext;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::ffi::c_void;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle passed across the C boundary
pub type SatchelHandle = *mut c_void;

/// Global context registry
static REGISTRY: OnceCell<ContextRegistry> = OnceCell::new();

/// Maps handle ids to live contexts
pub struct ContextRegistry {
    contexts: DashMap<u64, Arc<SatchelContext>>,
    next_id: AtomicU64,
}

impl ContextRegistry {
    /// Create an empty registry; ids start at 1 so 0 is never valid
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the global registry
    pub fn global() -> &'static ContextRegistry {
        REGISTRY.get_or_init(ContextRegistry::new)
    }

    /// Register a context and return its id
    pub fn register(&self, context: SatchelContext) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.contexts.insert(id, Arc::new(context));
        id
    }

    /// Get a context by id
    ///
    /// The returned `Arc` keeps the context alive even if it is removed
    /// while the caller still uses it.
    pub fn get(&self, id: u64) -> Option<Arc<SatchelContext>> {
        self.contexts.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Remove a context; it is dropped once the last in-flight call finishes
    pub fn remove(&self, id: u64) -> Option<Arc<SatchelContext>> {
        self.contexts.remove(&id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a registry id into the handle handed to the host
pub fn id_to_handle(id: u64) -> SatchelHandle {
    id as usize as SatchelHandle
}

/// Recover the registry id from a host handle
pub fn handle_to_id(handle: SatchelHandle) -> u64 {
    handle as usize as u64
}
