//! crates/study_buddy_core/src/locks.rs
//!
//! Process-local, per-document guard that keeps generation runs from
//! overlapping. Acquisition never waits: a second caller is turned away.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// The set of documents that currently have a generation run in flight.
#[derive(Debug, Default)]
pub struct GenerationLocks {
    held: Mutex<HashSet<Uuid>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `document_id` as locked. Returns `false` if it already was.
    pub fn try_acquire(&self, document_id: Uuid) -> bool {
        self.held_set().insert(document_id)
    }

    pub fn release(&self, document_id: Uuid) {
        self.held_set().remove(&document_id);
    }

    pub fn is_locked(&self, document_id: Uuid) -> bool {
        self.held_set().contains(&document_id)
    }

    /// Scoped acquisition: the lock is released when the returned guard drops,
    /// whichever way the holder exits.
    pub fn acquire(self: &Arc<Self>, document_id: Uuid) -> Option<GenerationGuard> {
        self.try_acquire(document_id).then(|| GenerationGuard {
            locks: Arc::clone(self),
            document_id,
        })
    }

    // The set stays consistent even if a holder panicked mid-update.
    fn held_set(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the document's generation lock on drop.
#[derive(Debug)]
pub struct GenerationGuard {
    locks: Arc<GenerationLocks>,
    document_id: Uuid,
}

impl GenerationGuard {
    pub fn document_id(&self) -> Uuid {
        self.document_id
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.locks.release(self.document_id);
    }
}
