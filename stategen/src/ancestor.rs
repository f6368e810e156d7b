use crate::cancel::CancelSignal;
use crate::errors::Error;
use crate::service::StateGen;
use crate::store::{BlockStore, SnapshotStore};
use crate::transition::StateTransition;
use containers::{Root, State};
use tracing::trace;

/// A replay starting point: the nearest ancestor of some target that has a
/// materialized state.
pub(crate) struct ReplayBase {
    pub root: Root,
    pub state: State,
}

impl<DB, T> StateGen<DB, T>
where
    DB: BlockStore + SnapshotStore,
    T: StateTransition,
{
    /// Walk parent links from `root` (inclusive) to the nearest root with an
    /// available state, bounding the replay distance.
    ///
    /// At each visited root the tiers are probed hot cache, boundary cache,
    /// finalized anchor, then exact durable state; the first hit wins. The
    /// genesis root is the guaranteed terminal fallback. A missing parent
    /// block mid-walk is a chain discontinuity: fatal for this lookup,
    /// never papered over with a different branch.
    pub(crate) fn last_ancestor_state(
        &self,
        root: Root,
        cancel: &CancelSignal,
        use_boundary_cache: bool,
    ) -> Result<ReplayBase, Error> {
        let genesis_root = self.cold.genesis_block_root()?;
        let mut cursor = root;

        loop {
            cancel.checkpoint()?;

            if let Some(state) = self.hot.get(cursor) {
                trace!(root = %cursor, "Replay base from hot cache");
                return Ok(ReplayBase {
                    root: cursor,
                    state,
                });
            }
            if use_boundary_cache {
                if let Some(state) = self.boundary.get_by_block_root(cursor)? {
                    trace!(root = %cursor, "Replay base from boundary cache");
                    return Ok(ReplayBase {
                        root: cursor,
                        state,
                    });
                }
            }
            if let Some(state) = self.finalized.state_by_root(cursor) {
                trace!(root = %cursor, "Replay base from finalized anchor");
                return Ok(ReplayBase {
                    root: cursor,
                    state,
                });
            }
            if let Some(state) = self.cold.state_by_root(cursor)? {
                trace!(root = %cursor, "Replay base from durable store");
                return Ok(ReplayBase {
                    root: cursor,
                    state,
                });
            }

            if cursor == genesis_root {
                // The genesis state is persisted at initialization; reaching
                // here without one means the store was never seeded.
                return Err(Error::NotFound(cursor));
            }

            let block = self
                .cold
                .block_by_root(cursor)?
                .ok_or(Error::ChainDiscontinuity(cursor))?;
            cursor = block.parent_root;
        }
    }
}
