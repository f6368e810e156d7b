use crate::errors::Error;
use containers::{Root, State};
use parking_lot::RwLock;
use schnellru::{ByLength, LruMap};
use std::sync::Arc;

/// States that sit exactly at epoch-start slots, indexed by block root.
///
/// Boundary states are the inputs to committee and shuffling computation
/// and are requested repeatedly, so they get their own retention tier with
/// a longer effective lifetime than the hot cache. A read miss is a fall
/// through signal, not an error.
pub struct EpochBoundaryStateCache {
    entries: RwLock<LruMap<Root, Arc<State>>>,
}

impl EpochBoundaryStateCache {
    pub fn new(capacity: u32) -> Self {
        Self {
            entries: RwLock::new(LruMap::new(ByLength::new(capacity))),
        }
    }

    /// Index a deep copy of a boundary state by its block root.
    ///
    /// Rejects states whose slot is not an epoch start; indexing an
    /// intra-epoch state here would hand out wrong shuffling inputs.
    pub fn put(&self, root: Root, state: &State) -> Result<(), Error> {
        if !state.slot.is_epoch_start() {
            return Err(Error::NotBoundaryState {
                root,
                slot: state.slot,
            });
        }

        self.entries.write().insert(root, Arc::new(state.clone()));
        Ok(())
    }

    /// An owned copy of the boundary state for `root`; `Ok(None)` on a miss
    /// so callers can fall through to the next tier.
    pub fn get_by_block_root(&self, root: Root) -> Result<Option<State>, Error> {
        Ok(self
            .entries
            .write()
            .get(&root)
            .map(|state| state.as_ref().clone()))
    }

    /// Shared handle to the live entry, for trusted read-only callers.
    pub(crate) fn get_no_copy(&self, root: Root) -> Option<Arc<State>> {
        self.entries.write().get(&root).cloned()
    }

    pub fn has(&self, root: Root) -> bool {
        self.entries.read().peek(&root).is_some()
    }

    pub fn delete(&self, root: Root) {
        self.entries.write().remove(&root);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containers::{Bytes32, Slot, SLOTS_PER_EPOCH};

    fn root(tag: u8) -> Root {
        Bytes32(containers::ssz::H256::from([tag; 32]))
    }

    fn state_at(slot: u64) -> State {
        let mut state = State::genesis_with_validator_count(0, 2);
        state.slot = Slot(slot);
        state
    }

    #[test]
    fn test_put_boundary_state() {
        let cache = EpochBoundaryStateCache::new(4);
        cache.put(root(1), &state_at(SLOTS_PER_EPOCH)).unwrap();

        let got = cache.get_by_block_root(root(1)).unwrap().unwrap();
        assert_eq!(got.slot, Slot(SLOTS_PER_EPOCH));
    }

    #[test]
    fn test_miss_is_not_an_error() {
        let cache = EpochBoundaryStateCache::new(4);
        assert!(cache.get_by_block_root(root(9)).unwrap().is_none());
    }

    #[test]
    fn test_rejects_intra_epoch_state() {
        let cache = EpochBoundaryStateCache::new(4);
        let err = cache.put(root(1), &state_at(SLOTS_PER_EPOCH + 1)).unwrap_err();

        assert!(matches!(err, Error::NotBoundaryState { .. }));
        assert!(!cache.has(root(1)));
    }

    #[test]
    fn test_copy_isolation() {
        let cache = EpochBoundaryStateCache::new(4);
        cache.put(root(1), &state_at(0)).unwrap();

        let mut got = cache.get_by_block_root(root(1)).unwrap().unwrap();
        got.slot = Slot(SLOTS_PER_EPOCH * 3);

        assert_eq!(
            cache.get_by_block_root(root(1)).unwrap().unwrap().slot,
            Slot(0)
        );
    }

    #[test]
    fn test_delete() {
        let cache = EpochBoundaryStateCache::new(4);
        cache.put(root(1), &state_at(0)).unwrap();
        cache.delete(root(1));
        assert!(!cache.has(root(1)));
    }
}
