//! State reconstruction and caching engine.
//!
//! Given a block root, the engine produces the exact canonical chain state
//! at that point without re-executing full chain history: recent states are
//! served from bounded in-memory tiers, everything else is rebuilt by
//! locating the nearest ancestor with a materialized state and replaying the
//! intervening blocks through the pre-trusted transition provider.

pub mod ancestor;
pub mod boundary_cache;
pub mod cancel;
pub mod config;
pub mod errors;
pub mod finalized;
pub mod hot_cache;
pub mod replay;
pub mod service;
pub mod store;
pub mod transition;

pub use boundary_cache::EpochBoundaryStateCache;
pub use cancel::CancelSignal;
pub use config::StateGenConfig;
pub use errors::Error;
pub use finalized::FinalizedAnchor;
pub use hot_cache::HotStateCache;
pub use service::{StateGen, StateGenStats};
pub use store::{BlockStore, ColdStore, MemoryStore, SnapshotStore};
pub use transition::{PreTrustedTransition, StateTransition};
