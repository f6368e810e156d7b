use crate::block::{hash_tree_root, Block, BlockHeader};
use crate::validator::Validator;
use crate::{
    Bytes32, ChainConfig, Checkpoint, Epoch, Gwei, HistoricalBlockHashes, Slot, ValidatorIndex,
    Validators,
};
use ssz::PersistentList as List;
use ssz_derive::Ssz;
use thiserror::Error;

/// Failures of the pre-trusted transition functions.
///
/// Inputs reaching these functions have already passed signature and
/// proposer verification upstream, so every variant here signals either a
/// caller bug or corrupted persisted data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateTransitionError {
    #[error("target slot {target:?} is not ahead of state slot {current:?}")]
    PastSlot { current: Slot, target: Slot },

    #[error("block slot {block:?} does not match state slot {state:?}")]
    SlotMismatch { block: Slot, state: Slot },

    #[error("block is not newer than the latest block header")]
    StaleBlock,

    #[error("block parent root does not match the latest block header")]
    ParentRootMismatch,

    #[error("state history list is full")]
    HistoryOverflow,
}

#[derive(Clone, Debug, PartialEq, Eq, Ssz, Default)]
pub struct State {
    pub config: ChainConfig,

    pub slot: Slot,
    pub latest_block_header: BlockHeader,

    pub latest_justified: Checkpoint,
    pub latest_finalized: Checkpoint,

    pub historical_block_hashes: HistoricalBlockHashes,

    pub validators: Validators,
}

impl State {
    pub fn genesis(genesis_time: u64, validators: Vec<Validator>) -> Self {
        let genesis_header = BlockHeader {
            slot: Slot(0),
            proposer_index: ValidatorIndex(0),
            parent_root: Bytes32::zero(),
            state_root: Bytes32::zero(),
            body_root: hash_tree_root(&crate::BlockBody::default()),
        };

        let mut validator_list = List::default();
        for v in validators {
            validator_list.push(v).expect("validator registry within limit");
        }

        Self {
            config: ChainConfig { genesis_time },
            slot: Slot(0),
            latest_block_header: genesis_header,
            latest_justified: Checkpoint::default_checkpoint(),
            latest_finalized: Checkpoint::default_checkpoint(),
            historical_block_hashes: HistoricalBlockHashes::default(),
            validators: validator_list,
        }
    }

    /// Genesis state with `count` interchangeable validators at the maximum
    /// effective balance, active from epoch 0.
    pub fn genesis_with_validator_count(genesis_time: u64, count: u64) -> Self {
        let validators = (0..count)
            .map(|_| Validator {
                effective_balance: Gwei(32_000_000_000),
                ..Validator::default()
            })
            .collect();
        Self::genesis(genesis_time, validators)
    }

    /// The epoch of the state's current slot.
    pub fn epoch(&self) -> Epoch {
        self.slot.epoch()
    }

    /// Advance the state to `target`, one slot at a time.
    ///
    /// Strictly forward: the target must be ahead of the current slot.
    pub fn process_slots(&self, target: Slot) -> Result<Self, StateTransitionError> {
        if self.slot >= target {
            return Err(StateTransitionError::PastSlot {
                current: self.slot,
                target,
            });
        }

        let mut state = self.clone();

        while state.slot < target {
            state = state.process_slot();
            state.slot = state.slot.next();
        }

        Ok(state)
    }

    /// Per-slot bookkeeping: cache the state root into the latest block
    /// header the first time a slot ticks past it.
    pub fn process_slot(&self) -> Self {
        if self.latest_block_header.state_root.is_zero() {
            let previous_state_root = hash_tree_root(self);

            let mut new_state = self.clone();
            new_state.latest_block_header.state_root = previous_state_root;
            return new_state;
        }

        self.clone()
    }

    /// Apply a pre-verified block to a state already advanced to the block's
    /// slot. Performs structural header checks only; signatures and proposer
    /// eligibility were verified before the block was persisted.
    pub fn process_block(&self, block: &Block) -> Result<Self, StateTransitionError> {
        if block.slot != self.slot {
            return Err(StateTransitionError::SlotMismatch {
                block: block.slot,
                state: self.slot,
            });
        }
        if block.slot <= self.latest_block_header.slot {
            return Err(StateTransitionError::StaleBlock);
        }

        let parent_root = hash_tree_root(&self.latest_block_header);
        if block.parent_root != parent_root {
            return Err(StateTransitionError::ParentRootMismatch);
        }

        // Record the parent root at its slot, then zero-pad the empty slots
        // between the parent and this block.
        let mut new_historical_hashes = HistoricalBlockHashes::default();
        for hash in &self.historical_block_hashes {
            new_historical_hashes
                .push(*hash)
                .map_err(|_| StateTransitionError::HistoryOverflow)?;
        }
        new_historical_hashes
            .push(parent_root)
            .map_err(|_| StateTransitionError::HistoryOverflow)?;

        let num_empty_slots = block.slot.0 - self.latest_block_header.slot.0 - 1;
        for _ in 0..num_empty_slots {
            new_historical_hashes
                .push(Bytes32::zero())
                .map_err(|_| StateTransitionError::HistoryOverflow)?;
        }

        let new_latest_block_header = BlockHeader {
            slot: block.slot,
            proposer_index: block.proposer_index,
            parent_root: block.parent_root,
            body_root: hash_tree_root(&block.body),
            // Zeroed here; filled in by the next slot tick.
            state_root: Bytes32::zero(),
        };

        Ok(Self {
            config: self.config.clone(),
            slot: self.slot,
            latest_block_header: new_latest_block_header,
            latest_justified: self.latest_justified.clone(),
            latest_finalized: self.latest_finalized.clone(),
            historical_block_hashes: new_historical_hashes,
            validators: self.validators.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockBody;

    fn build_block_on(state: &State, slot: Slot) -> (Block, State) {
        let pre = state.process_slots(slot).unwrap();
        let parent_root = hash_tree_root(&pre.latest_block_header);

        let mut block = Block {
            slot,
            proposer_index: ValidatorIndex(slot.0 % 4),
            parent_root,
            state_root: Bytes32::zero(),
            body: BlockBody::default(),
        };

        let post = pre.process_block(&block).unwrap();
        block.state_root = hash_tree_root(&post);
        (block, post)
    }

    #[test]
    fn test_genesis_state() {
        let state = State::genesis_with_validator_count(0, 4);
        assert_eq!(state.slot, Slot(0));
        assert_eq!(state.validators.len_u64(), 4);
        assert!(state.latest_block_header.state_root.is_zero());
    }

    #[test]
    fn test_process_slots() {
        let genesis_state = State::genesis_with_validator_count(0, 10);
        let target_slot = Slot(5);

        let new_state = genesis_state.process_slots(target_slot).unwrap();

        assert_eq!(new_state.slot, target_slot);
        assert_eq!(
            new_state.latest_block_header.state_root,
            hash_tree_root(&genesis_state)
        );
    }

    #[test]
    fn test_process_slots_rejects_past_target() {
        let state = State::genesis_with_validator_count(0, 4)
            .process_slots(Slot(3))
            .unwrap();

        let err = state.process_slots(Slot(3)).unwrap_err();
        assert_eq!(
            err,
            StateTransitionError::PastSlot {
                current: Slot(3),
                target: Slot(3)
            }
        );
    }

    #[test]
    fn test_process_block_updates_header() {
        let genesis_state = State::genesis_with_validator_count(0, 4);
        let (block, post) = build_block_on(&genesis_state, Slot(1));

        assert_eq!(post.slot, Slot(1));
        assert_eq!(post.latest_block_header.slot, block.slot);
        assert_eq!(post.latest_block_header.parent_root, block.parent_root);
        assert!(post.latest_block_header.state_root.is_zero());
    }

    #[test]
    fn test_process_block_rejects_parent_mismatch() {
        let genesis_state = State::genesis_with_validator_count(0, 4);
        let pre = genesis_state.process_slots(Slot(1)).unwrap();

        let block = Block {
            slot: Slot(1),
            proposer_index: ValidatorIndex(1),
            parent_root: Bytes32(ssz::H256::from([9u8; 32])),
            state_root: Bytes32::zero(),
            body: BlockBody::default(),
        };

        assert_eq!(
            pre.process_block(&block).unwrap_err(),
            StateTransitionError::ParentRootMismatch
        );
    }

    #[test]
    fn test_slot_gap_pads_history() {
        let genesis_state = State::genesis_with_validator_count(0, 4);
        let (_, post_1) = build_block_on(&genesis_state, Slot(1));
        let (_, post_4) = build_block_on(&post_1, Slot(4));

        // Index 1 holds the slot-1 parent root, indexes 2 and 3 the gap.
        assert_eq!(post_4.historical_block_hashes.len_u64(), 4);
        assert!(!post_4.historical_block_hashes.get(1).unwrap().is_zero());
        assert!(post_4.historical_block_hashes.get(2).unwrap().is_zero());
        assert!(post_4.historical_block_hashes.get(3).unwrap().is_zero());
    }

    #[test]
    fn test_chained_blocks_commit_to_state_roots() {
        let genesis_state = State::genesis_with_validator_count(0, 4);
        let (block_1, post_1) = build_block_on(&genesis_state, Slot(1));
        let (block_2, _) = build_block_on(&post_1, Slot(2));

        // The child's parent root is the slot-1 header with the post-state
        // root cached in, which is exactly the canonical root of block 1.
        assert_eq!(block_2.parent_root, crate::compute_block_root(&block_1));
    }
}
