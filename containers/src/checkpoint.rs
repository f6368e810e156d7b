use crate::{Root, Slot};
use serde::{Deserialize, Serialize};
use ssz_derive::Ssz;

/// Represents a checkpoint in the chain's history.
///
/// A checkpoint marks a specific moment in the chain. It combines a block
/// identifier with a slot number. Checkpoints are used for justification and
/// finalization.
#[derive(Clone, Debug, PartialEq, Eq, Ssz, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The root hash of the checkpoint's block.
    pub root: Root,
    /// The slot number of the checkpoint's block.
    pub slot: Slot,
}

impl Checkpoint {
    /// Return a default checkpoint with zero root and slot 0.
    pub fn default_checkpoint() -> Self {
        Self {
            root: Root::zero(),
            slot: Slot(0),
        }
    }
}
