use crate::ancestor::ReplayBase;
use crate::cancel::CancelSignal;
use crate::errors::Error;
use crate::service::StateGen;
use crate::store::{BlockStore, SnapshotStore};
use crate::transition::StateTransition;
use containers::{Block, Root, Slot, State};

impl<DB, T> StateGen<DB, T>
where
    DB: BlockStore + SnapshotStore,
    T: StateTransition,
{
    /// Replay `blocks` on top of `base`, landing exactly on `target_slot`.
    ///
    /// Candidates are sorted ascending by slot before the pass, so callers
    /// need not guarantee ordering; a candidate at or below the running
    /// state's slot is skipped as a duplicate rather than rejected. Gaps
    /// between blocks are covered slot by slot through the transition
    /// provider, with the cancel signal checked between every step.
    pub fn replay_blocks(
        &self,
        base: State,
        mut blocks: Vec<Block>,
        target_slot: Slot,
        cancel: &CancelSignal,
    ) -> Result<State, Error> {
        if target_slot < base.slot {
            return Err(Error::ReplayOrderViolation {
                base: base.slot,
                target: target_slot,
            });
        }

        blocks.sort_by_key(|block| block.slot);

        let mut state = base;
        for block in &blocks {
            if block.slot <= state.slot {
                continue;
            }
            // Candidate lists are bounded by the target slot; anything past
            // it cannot contribute to the target state.
            if block.slot > target_slot {
                break;
            }

            state = self.advance_to(state, block.slot, cancel)?;
            cancel.checkpoint()?;
            state = self.transition.apply_block(&state, block)?;
        }

        if state.slot < target_slot {
            state = self.advance_to(state, target_slot, cancel)?;
        }

        Ok(state)
    }

    /// Slot-by-slot advance so a canceled caller unwinds between steps
    /// instead of completing a multi-epoch gap.
    fn advance_to(
        &self,
        mut state: State,
        upto: Slot,
        cancel: &CancelSignal,
    ) -> Result<State, Error> {
        while state.slot < upto {
            cancel.checkpoint()?;
            let next = state.slot.next();
            state = self.transition.advance_slots(&state, next)?;
        }
        Ok(state)
    }

    /// The minimal block range `(base.slot, target_slot]` along the
    /// ancestry of `target_root`, verified to connect back to `base`.
    pub(crate) fn load_blocks(
        &self,
        base: &ReplayBase,
        target_slot: Slot,
        target_root: Root,
    ) -> Result<Vec<Block>, Error> {
        let start = base.state.slot.next();
        if start > target_slot {
            return Ok(Vec::new());
        }

        let blocks = self.cold.ancestry_range(start, target_slot, target_root)?;

        // The lineage walk must terminate exactly at the replay base; any
        // other terminus means a block is missing from the durable range.
        let terminus = blocks
            .first()
            .map(|block| block.parent_root)
            .unwrap_or(target_root);
        if terminus != base.root && target_root != base.root {
            return Err(Error::ChainDiscontinuity(terminus));
        }

        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateGenConfig;
    use crate::store::MemoryStore;
    use containers::{hash_tree_root, BlockBody, Root, ValidatorIndex};
    use std::sync::Arc;

    fn engine() -> StateGen<MemoryStore> {
        StateGen::new(Arc::new(MemoryStore::new()), StateGenConfig::default())
    }

    fn build_block_on(state: &State, slot: Slot) -> (Block, State) {
        let pre = state.process_slots(slot).unwrap();
        let parent_root = hash_tree_root(&pre.latest_block_header);

        let mut block = Block {
            slot,
            proposer_index: ValidatorIndex(slot.0 % 4),
            parent_root,
            state_root: Root::zero(),
            body: BlockBody::default(),
        };

        let post = pre.process_block(&block).unwrap();
        block.state_root = hash_tree_root(&post);
        (block, post)
    }

    #[test]
    fn test_rejects_backward_target() {
        let base = State::genesis_with_validator_count(0, 4)
            .process_slots(Slot(5))
            .unwrap();

        let err = engine()
            .replay_blocks(base, Vec::new(), Slot(4), &CancelSignal::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ReplayOrderViolation {
                base: Slot(5),
                target: Slot(4)
            }
        ));
    }

    #[test]
    fn test_slot_only_advance_lands_on_target() {
        let base = State::genesis_with_validator_count(0, 4);
        let expected = base.process_slots(Slot(7)).unwrap();

        let got = engine()
            .replay_blocks(base, Vec::new(), Slot(7), &CancelSignal::new())
            .unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_target_equal_to_base_is_a_noop() {
        let base = State::genesis_with_validator_count(0, 4)
            .process_slots(Slot(3))
            .unwrap();

        let got = engine()
            .replay_blocks(base.clone(), Vec::new(), Slot(3), &CancelSignal::new())
            .unwrap();
        assert_eq!(got, base);
    }

    #[test]
    fn test_unordered_candidates_replay_in_slot_order() {
        let genesis = State::genesis_with_validator_count(0, 4);
        let (block_1, post_1) = build_block_on(&genesis, Slot(1));
        let (block_2, post_2) = build_block_on(&post_1, Slot(3));

        let got = engine()
            .replay_blocks(
                genesis,
                vec![block_2, block_1],
                Slot(3),
                &CancelSignal::new(),
            )
            .unwrap();
        assert_eq!(got, post_2);
    }

    #[test]
    fn test_duplicate_candidates_are_skipped() {
        let genesis = State::genesis_with_validator_count(0, 4);
        let (block_1, post_1) = build_block_on(&genesis, Slot(1));
        let (block_2, post_2) = build_block_on(&post_1, Slot(2));

        let got = engine()
            .replay_blocks(
                genesis,
                vec![block_1.clone(), block_1, block_2],
                Slot(2),
                &CancelSignal::new(),
            )
            .unwrap();
        assert_eq!(got, post_2);
    }

    #[test]
    fn test_gap_past_last_block_is_covered() {
        let genesis = State::genesis_with_validator_count(0, 4);
        let (block_1, post_1) = build_block_on(&genesis, Slot(1));
        let expected = post_1.process_slots(Slot(6)).unwrap();

        let got = engine()
            .replay_blocks(genesis, vec![block_1], Slot(6), &CancelSignal::new())
            .unwrap();
        assert_eq!(got, expected);
        assert_eq!(got.slot, Slot(6));
    }

    #[test]
    fn test_canceled_replay_unwinds() {
        let genesis = State::genesis_with_validator_count(0, 4);
        let (block_1, _) = build_block_on(&genesis, Slot(10));

        let cancel = CancelSignal::new();
        cancel.cancel();

        let err = engine()
            .replay_blocks(genesis, vec![block_1], Slot(10), &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::Canceled));
    }
}
