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

//! Diffs between masternode list versions.
//!
//! A diff carries everything needed to take the list of block N-1 to the
//! list of block N: added entries, per-masternode state deltas keyed by
//! internal id, and removed internal ids. One diff is persisted per block;
//! replaying them from a snapshot reconstructs any historical list.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

use crate::consensus::{Decodable, Encodable, VarInt, encode};
use crate::dmn::entry::DeterministicMasternode;
use crate::dmn::list::MasternodeList;
use crate::dmn::state::MasternodeStateDiff;
use crate::error::InternalError;
use crate::hash_types::BlockHash;

/// The delta between two consecutive masternode lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MasternodeListDiff {
    /// The height this diff leads to. Memory only, rederived from the
    /// block index when the diff is loaded.
    pub height: i32,
    /// Masternodes present in the new list only, ordered by internal id.
    pub added_mns: Vec<Arc<DeterministicMasternode>>,
    /// State deltas of surviving masternodes, keyed by internal id.
    pub updated_mns: BTreeMap<u64, MasternodeStateDiff>,
    /// Internal ids of masternodes removed from the list.
    pub removed_mns: BTreeSet<u64>,
}

impl MasternodeListDiff {
    /// Whether the diff changes anything at all.
    pub fn has_changes(&self) -> bool {
        !self.added_mns.is_empty() || !self.updated_mns.is_empty() || !self.removed_mns.is_empty()
    }
}

impl Encodable for MasternodeListDiff {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        len += VarInt(self.added_mns.len() as u64).consensus_encode(writer)?;
        for mn in &self.added_mns {
            len += mn.as_ref().consensus_encode(writer)?;
        }
        len += VarInt(self.updated_mns.len() as u64).consensus_encode(writer)?;
        for (internal_id, state_diff) in &self.updated_mns {
            len += VarInt(*internal_id).consensus_encode(writer)?;
            len += state_diff.consensus_encode(writer)?;
        }
        len += VarInt(self.removed_mns.len() as u64).consensus_encode(writer)?;
        for internal_id in &self.removed_mns {
            len += VarInt(*internal_id).consensus_encode(writer)?;
        }
        Ok(len)
    }
}

impl Decodable for MasternodeListDiff {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let added_count = VarInt::consensus_decode(reader)?.0 as usize;
        if added_count > encode::MAX_VEC_SIZE {
            return Err(encode::Error::OversizedVectorAllocation {
                requested: added_count,
                max: encode::MAX_VEC_SIZE,
            });
        }
        let mut added_mns = Vec::with_capacity(added_count);
        for _ in 0..added_count {
            added_mns.push(Arc::new(DeterministicMasternode::consensus_decode(reader)?));
        }
        let updated_count = VarInt::consensus_decode(reader)?.0 as usize;
        let mut updated_mns = BTreeMap::new();
        for _ in 0..updated_count {
            let internal_id = VarInt::consensus_decode(reader)?.0;
            let state_diff = MasternodeStateDiff::consensus_decode(reader)?;
            updated_mns.insert(internal_id, state_diff);
        }
        let removed_count = VarInt::consensus_decode(reader)?.0 as usize;
        let mut removed_mns = BTreeSet::new();
        for _ in 0..removed_count {
            removed_mns.insert(VarInt::consensus_decode(reader)?.0);
        }
        Ok(MasternodeListDiff { height: -1, added_mns, updated_mns, removed_mns })
    }
}

impl MasternodeList {
    /// Computes the diff taking this list to `to`.
    pub fn build_diff(&self, to: &MasternodeList) -> MasternodeListDiff {
        let mut diff = MasternodeListDiff { height: to.height(), ..Default::default() };

        for to_mn in to.masternodes() {
            match self.get_mn(&to_mn.pro_tx_hash) {
                None => diff.added_mns.push(Arc::clone(to_mn)),
                Some(from_mn) => {
                    // shared state pointers cannot differ
                    if !Arc::ptr_eq(&from_mn.state, &to_mn.state) {
                        let state_diff = MasternodeStateDiff::new(&from_mn.state, &to_mn.state);
                        if !state_diff.is_empty() {
                            diff.updated_mns.insert(to_mn.internal_id(), state_diff);
                        }
                    }
                }
            }
        }
        for from_mn in self.masternodes() {
            if !to.contains_mn(&from_mn.pro_tx_hash) {
                diff.removed_mns.insert(from_mn.internal_id());
            }
        }

        // apply order matters: additions must replay in internal id order
        diff.added_mns.sort_by_key(|mn| mn.internal_id());
        diff
    }

    /// Applies a diff, producing the list of the next block.
    pub fn apply_diff(
        &self,
        block_hash: BlockHash,
        height: i32,
        diff: &MasternodeListDiff,
    ) -> Result<MasternodeList, InternalError> {
        let mut result = self.clone();
        result.set_block_hash(block_hash);
        result.set_height(height);

        for internal_id in &diff.removed_mns {
            let pro_tx_hash = result
                .get_mn_by_internal_id(*internal_id)
                .map(|mn| mn.pro_tx_hash)
                .ok_or(InternalError::InternalIdNotFound(*internal_id))?;
            result.remove_mn(&pro_tx_hash)?;
        }
        for mn in &diff.added_mns {
            result.add_mn(Arc::clone(mn), true)?;
        }
        for (internal_id, state_diff) in &diff.updated_mns {
            let pro_tx_hash = result
                .get_mn_by_internal_id(*internal_id)
                .map(|mn| mn.pro_tx_hash)
                .ok_or(InternalError::InternalIdNotFound(*internal_id))?;
            result.update_mn_with_diff(&pro_tx_hash, state_diff)?;
        }
        Ok(result)
    }
}
