//! Local uniqueness checks against the host's object store

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::global_id::GlobalId;

/// Answers whether an identifier is already held by a local object.
///
/// Generation claims candidates through [`try_reserve`](Self::try_reserve).
/// Implementations backed by a database should make that call an atomic
/// insert-if-absent so that concurrent generators in the same
/// authority/shoulder scope cannot both win the same value.
pub trait PidUniquenessOracle: Send + Sync {
    /// True when no local object holds `id`
    fn is_global_id_locally_unique(&self, id: &GlobalId) -> bool;

    /// Claim `id` for a new object; false if it is already taken
    fn try_reserve(&self, id: &GlobalId) -> bool {
        self.is_global_id_locally_unique(id)
    }

    /// Next value of the identifier sequence (`storedProcGenerated` style)
    fn next_sequence_value(&self) -> u64;
}

/// Mutex-guarded identifier set with an atomic sequence.
///
/// Keys are canonical PID strings.
#[derive(Debug)]
pub struct InMemoryPidRegistry {
    ids: Mutex<HashSet<String>>,
    sequence: AtomicU64,
}

impl InMemoryPidRegistry {
    pub fn new() -> Self {
        Self {
            ids: Mutex::new(HashSet::new()),
            sequence: AtomicU64::new(1),
        }
    }

    /// Record an identifier held by an existing object
    pub fn insert(&self, id: &GlobalId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.as_string())
    }

    pub fn contains(&self, id: &GlobalId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id.as_string())
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPidRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PidUniquenessOracle for InMemoryPidRegistry {
    fn is_global_id_locally_unique(&self, id: &GlobalId) -> bool {
        !self.contains(id)
    }

    fn try_reserve(&self, id: &GlobalId) -> bool {
        self.insert(id)
    }

    fn next_sequence_value(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }
}
