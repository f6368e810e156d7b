use serde::{Deserialize, Serialize};
use ssz_derive::Ssz;
use std::cmp::Ordering;

/// Number of slots in one epoch.
pub const SLOTS_PER_EPOCH: u64 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Ssz, Default, Serialize, Deserialize)]
pub struct Slot(pub u64);

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Ssz, Default, Serialize, Deserialize)]
#[ssz(transparent)]
pub struct Epoch(pub u64);

impl Slot {
    /// The epoch this slot belongs to.
    pub fn epoch(self) -> Epoch {
        Epoch(self.0 / SLOTS_PER_EPOCH)
    }

    /// Whether this slot is the first slot of its epoch.
    ///
    /// States at epoch-start slots are the inputs to committee and shuffling
    /// computation and are retained separately by the boundary cache.
    pub fn is_epoch_start(self) -> bool {
        self.0 % SLOTS_PER_EPOCH == 0
    }

    pub fn next(self) -> Slot {
        Slot(self.0 + 1)
    }
}
