use containers::{Block, Slot, State, StateTransitionError};

/// Seam to the externally supplied consensus transition rules.
///
/// Both operations are pre-trusted: inputs originate from already persisted
/// and validated data, so implementations perform no signature or proposer
/// verification. Errors are propagated to callers unchanged.
pub trait StateTransition: Send + Sync {
    /// Advance `state` through empty slots up to exactly `target`.
    fn advance_slots(&self, state: &State, target: Slot) -> Result<State, StateTransitionError>;

    /// Apply a block to a state already advanced to the block's slot.
    fn apply_block(&self, state: &State, block: &Block) -> Result<State, StateTransitionError>;
}

/// Default provider backed by the container transition functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreTrustedTransition;

impl StateTransition for PreTrustedTransition {
    fn advance_slots(&self, state: &State, target: Slot) -> Result<State, StateTransitionError> {
        state.process_slots(target)
    }

    fn apply_block(&self, state: &State, block: &Block) -> Result<State, StateTransitionError> {
        state.process_block(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_slots_is_strictly_forward() {
        let transition = PreTrustedTransition;
        let state = State::genesis_with_validator_count(0, 4);

        let advanced = transition.advance_slots(&state, Slot(3)).unwrap();
        assert_eq!(advanced.slot, Slot(3));

        assert!(transition.advance_slots(&advanced, Slot(2)).is_err());
    }
}
