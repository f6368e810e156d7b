use crate::{Epoch, Gwei};
use serde::{Deserialize, Serialize};
use ssz::ByteVector;
use ssz_derive::Ssz;
use typenum::U48;

/// Epoch sentinel for validators that have not scheduled an exit.
pub const FAR_FUTURE_EPOCH: Epoch = Epoch(u64::MAX);

pub type BlsPublicKey = ByteVector<U48>;

#[derive(Clone, Debug, PartialEq, Eq, Ssz, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: BlsPublicKey,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
}

impl Validator {
    /// Whether this validator is in its active window at `epoch`.
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            pubkey: BlsPublicKey::default(),
            effective_balance: Gwei(0),
            slashed: false,
            activation_epoch: Epoch(0),
            exit_epoch: FAR_FUTURE_EPOCH,
        }
    }
}
