pub mod block;
pub mod checkpoint;
pub mod config;
pub mod slot;
pub mod state;
pub mod types;
pub mod validator;

pub use block::{compute_block_root, hash_tree_root, Block, BlockBody, BlockHeader};
pub use checkpoint::Checkpoint;
pub use config::ChainConfig;
pub use slot::{Epoch, Slot, SLOTS_PER_EPOCH};
pub use state::{State, StateTransitionError};
pub use types::{Bytes32, Gwei, Root, Uint64, ValidatorIndex};
pub use validator::{Validator, FAR_FUTURE_EPOCH};
pub use ssz;

use ssz::PersistentList;
use typenum::{U262144, U4096};

/// Validator registry carried by the state.
pub type Validators = PersistentList<Validator, U4096>;

/// Per-slot block root history carried by the state.
pub type HistoricalBlockHashes = PersistentList<Bytes32, U262144>;
