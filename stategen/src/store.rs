use crate::errors::Error;
use containers::{compute_block_root, Block, Root, Slot, State};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Durable block storage, consumed from the persistence collaborator.
pub trait BlockStore: Send + Sync {
    fn block_by_root(&self, root: Root) -> Result<Option<Block>, Error>;

    /// All stored blocks with slot in `[start, end]`, ascending by slot.
    /// The result may span multiple branches; lineage filtering is the
    /// caller's concern.
    fn blocks_by_slot_range(&self, start: Slot, end: Slot) -> Result<Vec<Block>, Error>;

    fn is_finalized(&self, root: Root) -> bool;

    /// The genesis block root. Always resolvable once the store is
    /// initialized; the guaranteed terminal fallback of every ancestor walk.
    fn genesis_block_root(&self) -> Result<Root, Error>;
}

/// Durable full-state snapshot storage.
pub trait SnapshotStore: Send + Sync {
    fn state_by_root(&self, root: Root) -> Result<Option<State>, Error>;
    fn save_state(&self, root: Root, state: &State) -> Result<(), Error>;
    fn has_state(&self, root: Root) -> bool;
    /// Whether a slot/root summary record exists for `root`, even when the
    /// full state does not.
    fn has_state_summary(&self, root: Root) -> bool;
}

/// Thin pass-through over the durable stores. Owns no cache of its own.
pub struct ColdStore<DB> {
    db: Arc<DB>,
}

impl<DB> ColdStore<DB>
where
    DB: BlockStore + SnapshotStore,
{
    pub fn new(db: Arc<DB>) -> Self {
        Self { db }
    }

    pub fn block_by_root(&self, root: Root) -> Result<Option<Block>, Error> {
        self.db.block_by_root(root)
    }

    pub fn state_by_root(&self, root: Root) -> Result<Option<State>, Error> {
        self.db.state_by_root(root)
    }

    pub fn save_state(&self, root: Root, state: &State) -> Result<(), Error> {
        self.db.save_state(root, state)
    }

    pub fn has_state(&self, root: Root) -> bool {
        self.db.has_state(root)
    }

    pub fn has_state_summary(&self, root: Root) -> bool {
        self.db.has_state_summary(root)
    }

    pub fn is_finalized(&self, root: Root) -> bool {
        self.db.is_finalized(root)
    }

    pub fn genesis_block_root(&self) -> Result<Root, Error> {
        self.db.genesis_block_root()
    }

    /// The chain of blocks that are ancestors of `end_root` (inclusive)
    /// with slot in `[start, end]`, ascending by slot.
    ///
    /// Walks parent links backwards from `end_root` through the stored
    /// range, so sibling-branch blocks in the same slot window are filtered
    /// out. The walk ends at the first parent outside the range; callers
    /// verify that terminus against their expected replay base.
    pub fn ancestry_range(
        &self,
        start: Slot,
        end: Slot,
        end_root: Root,
    ) -> Result<Vec<Block>, Error> {
        let candidates = self.db.blocks_by_slot_range(start, end)?;

        let mut by_root: HashMap<Root, Block> = candidates
            .into_iter()
            .map(|block| (compute_block_root(&block), block))
            .collect();

        let mut lineage = Vec::new();
        let mut cursor = end_root;
        while let Some(block) = by_root.remove(&cursor) {
            cursor = block.parent_root;
            lineage.push(block);
        }

        lineage.reverse();
        Ok(lineage)
    }
}

/// In-memory durable-store stand-in used by tests and the demo node.
#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<Root, Block>>,
    states: RwLock<HashMap<Root, State>>,
    summaries: RwLock<HashSet<Root>>,
    finalized: RwLock<HashSet<Root>>,
    genesis_root: RwLock<Option<Root>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block, recording its summary. A slot-0 block becomes the
    /// genesis block. Returns the block root.
    pub fn put_block(&self, block: Block) -> Root {
        let root = compute_block_root(&block);
        if block.slot == Slot(0) {
            *self.genesis_root.write() = Some(root);
        }
        self.summaries.write().insert(root);
        self.blocks.write().insert(root, block);
        root
    }

    pub fn put_state(&self, root: Root, state: &State) {
        self.states.write().insert(root, state.clone());
    }

    pub fn mark_finalized(&self, root: Root) {
        self.finalized.write().insert(root);
    }

    /// Drop a stored block, leaving a gap in the chain. Test hook for
    /// discontinuity handling.
    pub fn remove_block(&self, root: Root) -> Option<Block> {
        self.blocks.write().remove(&root)
    }
}

impl BlockStore for MemoryStore {
    fn block_by_root(&self, root: Root) -> Result<Option<Block>, Error> {
        Ok(self.blocks.read().get(&root).cloned())
    }

    fn blocks_by_slot_range(&self, start: Slot, end: Slot) -> Result<Vec<Block>, Error> {
        let mut blocks: Vec<Block> = self
            .blocks
            .read()
            .values()
            .filter(|block| start <= block.slot && block.slot <= end)
            .cloned()
            .collect();
        blocks.sort_by_key(|block| block.slot);
        Ok(blocks)
    }

    fn is_finalized(&self, root: Root) -> bool {
        self.finalized.read().contains(&root)
    }

    fn genesis_block_root(&self) -> Result<Root, Error> {
        (*self.genesis_root.read()).ok_or(Error::NotFound(Root::zero()))
    }
}

impl SnapshotStore for MemoryStore {
    fn state_by_root(&self, root: Root) -> Result<Option<State>, Error> {
        Ok(self.states.read().get(&root).cloned())
    }

    fn save_state(&self, root: Root, state: &State) -> Result<(), Error> {
        self.states.write().insert(root, state.clone());
        Ok(())
    }

    fn has_state(&self, root: Root) -> bool {
        self.states.read().contains_key(&root)
    }

    fn has_state_summary(&self, root: Root) -> bool {
        self.summaries.read().contains(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containers::{BlockBody, Bytes32, ValidatorIndex};

    fn block_at(slot: u64, parent_root: Root) -> Block {
        Block {
            slot: Slot(slot),
            proposer_index: ValidatorIndex(0),
            parent_root,
            state_root: Bytes32::zero(),
            body: BlockBody::default(),
        }
    }

    fn forked_block_at(slot: u64, parent_root: Root, tag: u8) -> Block {
        let mut block = block_at(slot, parent_root);
        block.body.graffiti = Bytes32(containers::ssz::H256::from([tag; 32]));
        block
    }

    #[test]
    fn test_put_and_get_block() {
        let store = MemoryStore::new();
        let root = store.put_block(block_at(0, Root::zero()));

        assert!(store.block_by_root(root).unwrap().is_some());
        assert!(store.has_state_summary(root));
        assert_eq!(store.genesis_block_root().unwrap(), root);
    }

    #[test]
    fn test_slot_range_is_ascending() {
        let store = MemoryStore::new();
        let genesis = store.put_block(block_at(0, Root::zero()));
        store.put_block(block_at(3, genesis));
        store.put_block(block_at(1, genesis));
        store.put_block(block_at(2, genesis));

        let blocks = store.blocks_by_slot_range(Slot(1), Slot(3)).unwrap();
        let slots: Vec<u64> = blocks.iter().map(|b| b.slot.0).collect();
        assert_eq!(slots, vec![1, 2, 3]);
    }

    #[test]
    fn test_ancestry_range_filters_sibling_branch() {
        let store = MemoryStore::new();
        let genesis = store.put_block(block_at(0, Root::zero()));

        // Canonical chain 1 -> 2, plus a fork branch at the same slots.
        let canonical_1 = store.put_block(forked_block_at(1, genesis, 1));
        let canonical_2 = store.put_block(forked_block_at(2, canonical_1, 2));
        let fork_1 = store.put_block(forked_block_at(1, genesis, 101));
        store.put_block(forked_block_at(2, fork_1, 102));

        let cold = ColdStore::new(Arc::new(store));
        let lineage = cold.ancestry_range(Slot(1), Slot(2), canonical_2).unwrap();

        let roots: Vec<Root> = lineage.iter().map(compute_block_root).collect();
        assert_eq!(roots, vec![canonical_1, canonical_2]);
        assert_eq!(lineage[0].parent_root, genesis);
    }

    #[test]
    fn test_ancestry_range_stops_at_gap() {
        let store = MemoryStore::new();
        let genesis = store.put_block(block_at(0, Root::zero()));
        let root_1 = store.put_block(forked_block_at(1, genesis, 1));
        let root_2 = store.put_block(forked_block_at(2, root_1, 2));
        let root_3 = store.put_block(forked_block_at(3, root_2, 3));

        store.remove_block(root_2);

        let cold = ColdStore::new(Arc::new(store));
        let lineage = cold.ancestry_range(Slot(1), Slot(3), root_3).unwrap();

        // Only the suffix above the gap survives; the terminus exposes the
        // missing parent for the caller's continuity check.
        assert_eq!(lineage.len(), 1);
        assert_eq!(lineage[0].parent_root, root_2);
    }
}
