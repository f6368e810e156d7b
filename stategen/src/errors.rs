use containers::{Root, Slot, StateTransitionError};
use thiserror::Error;

/// Errors surfaced by the state reconstruction engine.
///
/// A miss at a single cache tier is never an error; tiers fall through to
/// the next lookup source and only the final fallback's failure reaches the
/// caller. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// State or block absent from every tier and from durable storage.
    /// Recoverable; the caller may treat this as "not synced yet".
    #[error("no state or block known for root {0}")]
    NotFound(Root),

    /// The ancestor walk hit a missing parent block mid-chain. Indicates a
    /// durable-store integrity failure for this lookup.
    #[error("chain discontinuity: missing block {0}")]
    ChainDiscontinuity(Root),

    /// Replay was asked to move a state backwards. A contract violation by
    /// the caller; replay is not reversible.
    #[error("replay target slot {target:?} is behind base state slot {base:?}")]
    ReplayOrderViolation { base: Slot, target: Slot },

    /// The transition provider failed on input that was assumed
    /// pre-verified. Propagated unchanged.
    #[error("transition: {0}")]
    Transition(#[from] StateTransitionError),

    /// The caller's cancel signal tripped mid-lookup. Distinct from
    /// `NotFound` so callers can tell "unavailable" from "gave up".
    #[error("lookup canceled")]
    Canceled,

    /// Attempted to index a state that is not at an epoch-start slot into
    /// the epoch boundary cache.
    #[error("state at slot {slot:?} for root {root} is not at an epoch start")]
    NotBoundaryState { root: Root, slot: Slot },
}
