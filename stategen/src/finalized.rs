use containers::{Root, Slot, State};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

/// The most recently finalized checkpoint's materialized state.
///
/// Exactly one live value; `set` replaces the whole (root, slot, state)
/// triple under the lock, so readers never observe a partial update. The
/// deepest stable in-memory replay base: ancestor walks that reach the
/// anchor stop there instead of descending into durable storage.
#[derive(Default)]
pub struct FinalizedAnchor {
    inner: RwLock<Option<FinalizedInfo>>,
}

#[derive(Clone)]
struct FinalizedInfo {
    root: Root,
    slot: Slot,
    state: Arc<State>,
}

impl FinalizedAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor wholesale.
    ///
    /// Finality never moves backwards, so an update carrying an earlier
    /// slot than the current anchor is dropped.
    pub fn set(&self, root: Root, slot: Slot, state: &State) {
        let mut guard = self.inner.write();

        if let Some(existing) = guard.as_ref() {
            if slot < existing.slot {
                warn!(
                    current_slot = existing.slot.0,
                    requested_slot = slot.0,
                    root = %root,
                    "Ignoring finalized anchor regression"
                );
                return;
            }
        }

        *guard = Some(FinalizedInfo {
            root,
            slot,
            state: Arc::new(state.clone()),
        });
    }

    /// The full current triple, with an owned state copy.
    pub fn get(&self) -> Option<(Root, Slot, State)> {
        self.inner
            .read()
            .as_ref()
            .map(|info| (info.root, info.slot, info.state.as_ref().clone()))
    }

    /// (root, slot) of the current anchor.
    pub fn info(&self) -> Option<(Root, Slot)> {
        self.inner.read().as_ref().map(|info| (info.root, info.slot))
    }

    pub fn slot(&self) -> Option<Slot> {
        self.inner.read().as_ref().map(|info| info.slot)
    }

    pub fn matches(&self, root: Root) -> bool {
        self.inner
            .read()
            .as_ref()
            .map(|info| info.root == root)
            .unwrap_or(false)
    }

    /// Owned copy of the anchor state when `root` is the anchor root.
    pub fn state_by_root(&self, root: Root) -> Option<State> {
        self.inner
            .read()
            .as_ref()
            .filter(|info| info.root == root)
            .map(|info| info.state.as_ref().clone())
    }

    /// Shared handle to the anchor state, for trusted read-only callers.
    pub(crate) fn state_no_copy(&self, root: Root) -> Option<Arc<State>> {
        self.inner
            .read()
            .as_ref()
            .filter(|info| info.root == root)
            .map(|info| info.state.clone())
    }
}
