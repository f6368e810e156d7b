use crate::{Bytes32, Root, Slot, ValidatorIndex};
use serde::{Deserialize, Serialize};
use ssz::SszHash;
use ssz_derive::Ssz;

/// The body of a block.
///
/// Payload operations (attestations, deposits, exits) are opaque to state
/// reconstruction and are consumed wholesale by the transition provider;
/// only the graffiti field is carried here.
#[derive(Clone, Debug, PartialEq, Eq, Ssz, Default, Serialize, Deserialize)]
pub struct BlockBody {
    pub graffiti: Bytes32,
}

#[derive(Clone, Debug, PartialEq, Eq, Ssz, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body_root: Root,
}

#[derive(Clone, Debug, PartialEq, Eq, Ssz, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body: BlockBody,
}

impl Block {
    /// The header form of this block, with the body collapsed to its root.
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            slot: self.slot,
            proposer_index: self.proposer_index,
            parent_root: self.parent_root,
            state_root: self.state_root,
            body_root: hash_tree_root(&self.body),
        }
    }
}

/// Compute the SSZ hash tree root for any type implementing `SszHash`.
pub fn hash_tree_root<T: SszHash>(value: &T) -> Bytes32 {
    Bytes32(value.hash_tree_root())
}

/// The canonical block root: the hash tree root of the block's header.
pub fn compute_block_root(block: &Block) -> Root {
    hash_tree_root(&block.header())
}
