use crate::boundary_cache::EpochBoundaryStateCache;
use crate::cancel::CancelSignal;
use crate::config::StateGenConfig;
use crate::errors::Error;
use crate::finalized::FinalizedAnchor;
use crate::hot_cache::HotStateCache;
use crate::store::{BlockStore, ColdStore, SnapshotStore};
use crate::transition::{PreTrustedTransition, StateTransition};
use containers::{Gwei, Root, Slot, State};
use std::sync::Arc;
use tracing::{debug, warn};

/// State reconstruction orchestrator.
///
/// The single entry point all collaborators share. Constructed once at node
/// startup and passed around behind `Arc`; every cache tier carries its own
/// lock, so unrelated roots never serialize on each other. Cross-tier
/// consistency is eventual: a state may be visible in the hot cache before
/// it is mirrored anywhere else, and callers tolerate that.
pub struct StateGen<DB, T = PreTrustedTransition> {
    pub(crate) cold: ColdStore<DB>,
    pub(crate) hot: HotStateCache,
    pub(crate) boundary: EpochBoundaryStateCache,
    pub(crate) finalized: FinalizedAnchor,
    pub(crate) transition: T,
    pub(crate) config: StateGenConfig,
}

/// Point-in-time view of the engine's in-memory tiers.
#[derive(Debug, Clone, Copy)]
pub struct StateGenStats {
    pub hot_states: usize,
    pub boundary_states: usize,
    pub finalized_slot: Option<Slot>,
}

impl<DB> StateGen<DB>
where
    DB: BlockStore + SnapshotStore,
{
    pub fn new(db: Arc<DB>, config: StateGenConfig) -> Self {
        Self::with_transition(db, PreTrustedTransition, config)
    }
}

impl<DB, T> StateGen<DB, T>
where
    DB: BlockStore + SnapshotStore,
    T: StateTransition,
{
    pub fn with_transition(db: Arc<DB>, transition: T, config: StateGenConfig) -> Self {
        Self {
            cold: ColdStore::new(db),
            hot: HotStateCache::new(config.hot_cache_capacity),
            boundary: EpochBoundaryStateCache::new(config.boundary_cache_capacity),
            finalized: FinalizedAnchor::new(),
            transition,
            config,
        }
    }

    /// The canonical state at `root`, served from the fastest tier that has
    /// it, else rebuilt by ancestor location and replay.
    pub fn state_by_root(&self, cancel: &CancelSignal, root: Root) -> Result<State, Error> {
        self.load_state_by_root(cancel, root, true)
    }

    /// `state_by_root` for bulk historical backfill: skips the epoch
    /// boundary cache, which is not guaranteed populated during initial
    /// sync and must not be polluted with transient backfill states.
    pub fn state_by_root_initial_sync(
        &self,
        cancel: &CancelSignal,
        root: Root,
    ) -> Result<State, Error> {
        self.load_state_by_root(cancel, root, false)
    }

    fn load_state_by_root(
        &self,
        cancel: &CancelSignal,
        root: Root,
        use_boundary_cache: bool,
    ) -> Result<State, Error> {
        cancel.checkpoint()?;

        // Direct lookup: any tier holding the exact state wins, zero replay.
        if let Some(state) = self.hot.get(root) {
            return Ok(state);
        }
        if use_boundary_cache {
            if let Some(state) = self.boundary.get_by_block_root(root)? {
                return Ok(state);
            }
        }
        if let Some(state) = self.finalized.state_by_root(root) {
            return Ok(state);
        }
        if let Some(state) = self.cold.state_by_root(root)? {
            return Ok(state);
        }

        // Full reconstruction: the target block pins the target slot, the
        // nearest materialized ancestor bounds the replay distance.
        let target_block = self
            .cold
            .block_by_root(root)?
            .ok_or(Error::NotFound(root))?;
        let target_slot = target_block.slot;

        let base = self.last_ancestor_state(root, cancel, use_boundary_cache)?;
        debug!(
            root = %root,
            target_slot = target_slot.0,
            base_slot = base.state.slot.0,
            "Reconstructing state by replay"
        );

        let blocks = self.load_blocks(&base, target_slot, root)?;
        self.replay_blocks(base.state, blocks, target_slot, cancel)
    }

    /// The live cached value for `root` without copying, if any in-memory
    /// tier holds it. For trusted, read-only internal callers.
    pub fn state_by_root_if_cached_no_copy(&self, root: Root) -> Option<Arc<State>> {
        self.hot
            .get_no_copy(root)
            .or_else(|| self.boundary.get_no_copy(root))
            .or_else(|| self.finalized.state_no_copy(root))
    }

    /// Whether a state for `root` is reachable at all: in-memory tiers, an
    /// exact durable state, or a durable summary that replay can serve.
    pub fn has_state(&self, cancel: &CancelSignal, root: Root) -> Result<bool, Error> {
        cancel.checkpoint()?;

        Ok(self.hot.has(root)
            || self.boundary.has(root)
            || self.finalized.matches(root)
            || self.cold.has_state(root)
            || self.cold.has_state_summary(root))
    }

    /// Eviction hook for the pruning collaborator: drop `root` from every
    /// in-memory tier once its branch is no longer canonical. Durable
    /// records are untouched.
    pub fn delete_state_from_caches(&self, cancel: &CancelSignal, root: Root) -> Result<(), Error> {
        cancel.checkpoint()?;

        if self.cold.is_finalized(root) {
            warn!(root = %root, "Refusing to evict a finalized root from caches");
            return Ok(());
        }

        self.hot.delete(root);
        self.boundary.delete(root);
        Ok(())
    }

    /// Record a freshly processed state: hot-cache insert, epoch-boundary
    /// mirror, and a durable snapshot when the slot lands on an archived
    /// point.
    pub fn save_state(&self, root: Root, state: &State) -> Result<(), Error> {
        self.hot.put(root, state);

        if state.slot.is_epoch_start() {
            self.boundary.put(root, state)?;
        }

        if state.slot.0 % self.config.slots_per_archived_point == 0 {
            self.cold.save_state(root, state)?;
            debug!(root = %root, slot = state.slot.0, "Persisted archived point");
        }

        Ok(())
    }

    /// Replace the finalized anchor wholesale. Invoked once per
    /// finalization event.
    pub fn save_finalized_state(&self, root: Root, slot: Slot, state: &State) {
        self.finalized.set(root, slot, state);
    }

    /// Effective balances at `root` for validators that are active at the
    /// state's epoch and not slashed; zero for everyone else, so indexes
    /// line up with the registry.
    pub fn active_non_slashed_balances_by_root(
        &self,
        cancel: &CancelSignal,
        root: Root,
    ) -> Result<Vec<Gwei>, Error> {
        let state = self.state_by_root(cancel, root)?;
        let epoch = state.epoch();

        let mut balances = Vec::with_capacity(state.validators.len_usize());
        for validator in &state.validators {
            if validator.is_active_at(epoch) && !validator.slashed {
                balances.push(validator.effective_balance);
            } else {
                balances.push(Gwei(0));
            }
        }

        Ok(balances)
    }

    pub fn stats(&self) -> StateGenStats {
        StateGenStats {
            hot_states: self.hot.len(),
            boundary_states: self.boundary.len(),
            finalized_slot: self.finalized.slot(),
        }
    }
}
