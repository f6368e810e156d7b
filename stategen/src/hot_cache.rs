use containers::{Root, State};
use parking_lot::RwLock;
use schnellru::{ByLength, LruMap};
use std::sync::Arc;

/// Zero-replay-cost cache of very recently processed states.
///
/// Entries are stored behind `Arc` so `get` can hand out independently
/// owned copies while `get_no_copy` shares the live value with trusted
/// read-only callers. Capacity-bounded; insertion past the bound evicts the
/// least recently used entry.
pub struct HotStateCache {
    entries: RwLock<LruMap<Root, Arc<State>>>,
}

impl HotStateCache {
    pub fn new(capacity: u32) -> Self {
        Self {
            entries: RwLock::new(LruMap::new(ByLength::new(capacity))),
        }
    }

    /// Store a deep copy of `state` under `root`.
    pub fn put(&self, root: Root, state: &State) {
        self.entries.write().insert(root, Arc::new(state.clone()));
    }

    /// An owned copy, safe for the caller to mutate.
    pub fn get(&self, root: Root) -> Option<State> {
        self.entries
            .write()
            .get(&root)
            .map(|state| state.as_ref().clone())
    }

    /// A shared handle to the live cached value, skipping the copy.
    ///
    /// The value aliases the cache entry; restricted to trusted internal
    /// callers that only read. Never expose across a trust boundary.
    pub fn get_no_copy(&self, root: Root) -> Option<Arc<State>> {
        self.entries.write().get(&root).cloned()
    }

    /// Presence check without touching recency.
    pub fn has(&self, root: Root) -> bool {
        self.entries.read().peek(&root).is_some()
    }

    pub fn delete(&self, root: Root) {
        self.entries.write().remove(&root);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
