// Rust Evonode Library
// Written in 2024 by
//     The Evonode Core Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! The chain view the masternode subsystem consumes.
//!
//! The host node owns block storage and the UTXO set; this module defines
//! the narrow slice of them the list manager and the validators read.

use std::sync::Arc;

use crate::hash_types::BlockHash;
use crate::script::ScriptBuf;
use crate::transaction::{OutPoint, Transaction};

/// A block header position in the active chain.
///
/// Indexes form a linked list back to genesis through `prev`; the list
/// store walks it when reconstructing a list for an old block.
#[derive(Clone, Debug)]
pub struct BlockIndex {
    /// The block hash.
    pub hash: BlockHash,
    /// The height of the block.
    pub height: i32,
    /// The previous block, `None` at genesis.
    pub prev: Option<Arc<BlockIndex>>,
}

impl BlockIndex {
    /// Creates the index of a block extending `prev`.
    pub fn new(hash: BlockHash, height: i32, prev: Option<Arc<BlockIndex>>) -> Self {
        BlockIndex { hash, height, prev }
    }

    /// Walks back to the ancestor at `height`, if this index descends
    /// from it.
    pub fn ancestor(self: &Arc<Self>, height: i32) -> Option<Arc<BlockIndex>> {
        if height > self.height || height < 0 {
            return None;
        }
        let mut index = Arc::clone(self);
        while index.height > height {
            index = Arc::clone(index.prev.as_ref()?);
        }
        Some(index)
    }
}

/// The transactions of a connected block.
#[derive(Clone, Debug, Default)]
pub struct Block {
    /// The transactions, coinbase first.
    pub txdata: Vec<Transaction>,
}

/// An unspent transaction output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Coin {
    /// The value of the output.
    pub value: u64,
    /// The locking script of the output.
    pub script_pubkey: ScriptBuf,
}

/// Read access to the UTXO set, as of the validation point.
pub trait CoinView {
    /// Looks up an unspent output. Returns `None` when the output does not
    /// exist or has been spent.
    fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}

#[cfg(test)]
mod tests {
    use crate::hashes::Hash;

    use super::*;

    #[test]
    fn ancestor_walk() {
        let mut tip: Option<Arc<BlockIndex>> = None;
        for height in 0i32..5 {
            let hash = BlockHash::hash(&height.to_le_bytes());
            tip = Some(Arc::new(BlockIndex::new(hash, height, tip)));
        }
        let tip = tip.unwrap();
        assert_eq!(tip.ancestor(4).unwrap().height, 4);
        assert_eq!(tip.ancestor(0).unwrap().height, 0);
        assert!(tip.ancestor(5).is_none());
        assert!(tip.ancestor(-1).is_none());
    }
}
