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

//! The deterministic masternode list.
//!
//! A list is an immutable-by-convention value tied to one block: updates
//! clone the affected entry, swap its state pointer and reinsert, so a
//! copied list keeps sharing everything that did not change.
//!
//! Besides the main map the list maintains a unique-property index over
//! collaterals, service addresses, owner keys and operator keys. An entry
//! carries a reference count because a property can transiently be claimed
//! twice by the same masternode while an update moves it.

mod diff;
mod payee;
mod quorum;

pub use diff::MasternodeListDiff;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::info;

use crate::address::ServiceAddress;
use crate::bls_sig_utils::BLSPublicKey;
use crate::consensus::{Decodable, Encodable, VarInt, encode};
use crate::dmn::entry::DeterministicMasternode;
use crate::dmn::state::{MasternodeState, MasternodeStateDiff};
use crate::error::InternalError;
use crate::hash_types::{BlockHash, ProTxHash, PubkeyHash, UniquePropertyHash};
use crate::hashes::Hash;
use crate::transaction::OutPoint;

/// A value that at most one masternode may hold at a time.
///
/// The index stores the hash of the value's consensus encoding, so
/// differently-typed properties cannot collide structurally.
pub trait UniqueProperty: Encodable {
    /// Whether this is the type's null sentinel. Null values are never
    /// indexed.
    fn is_null_value(&self) -> bool;

    /// The index key for this value.
    fn property_hash(&self) -> UniquePropertyHash {
        let mut engine = UniquePropertyHash::engine();
        self.consensus_encode(&mut engine).expect("engines don't error");
        UniquePropertyHash::from_engine(engine)
    }
}

impl UniqueProperty for OutPoint {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl UniqueProperty for ServiceAddress {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl UniqueProperty for PubkeyHash {
    fn is_null_value(&self) -> bool {
        *self == PubkeyHash::all_zeros()
    }
}

impl UniqueProperty for BLSPublicKey {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

/// The masternode list as of one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasternodeList {
    block_hash: BlockHash,
    height: i32,
    total_registered_count: u32,
    mn_map: BTreeMap<ProTxHash, Arc<DeterministicMasternode>>,
    mn_internal_id_map: BTreeMap<u64, ProTxHash>,
    unique_property_map: BTreeMap<UniquePropertyHash, (ProTxHash, u32)>,
}

impl Default for MasternodeList {
    fn default() -> Self {
        MasternodeList::new(BlockHash::all_zeros(), -1, 0)
    }
}

impl MasternodeList {
    /// Creates an empty list for the given block.
    pub fn new(block_hash: BlockHash, height: i32, total_registered_count: u32) -> Self {
        MasternodeList {
            block_hash,
            height,
            total_registered_count,
            mn_map: BTreeMap::new(),
            mn_internal_id_map: BTreeMap::new(),
            unique_property_map: BTreeMap::new(),
        }
    }

    /// The block this list belongs to.
    pub fn block_hash(&self) -> BlockHash {
        self.block_hash
    }

    /// The height of that block, `-1` on a list not yet tied to a block.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Ties the list to a block hash.
    pub fn set_block_hash(&mut self, block_hash: BlockHash) {
        self.block_hash = block_hash;
    }

    /// Ties the list to a height.
    pub fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    /// How many masternodes have ever been registered up to this list.
    /// Internal ids are assigned from this counter and never reused.
    pub fn total_registered_count(&self) -> u32 {
        self.total_registered_count
    }

    /// The number of masternodes in the list, banned ones included.
    pub fn all_mns_count(&self) -> usize {
        self.mn_map.len()
    }

    /// The number of masternodes that are not PoSe-banned.
    pub fn valid_mns_count(&self) -> usize {
        self.mn_map.values().filter(|mn| !mn.state.is_pose_banned()).count()
    }

    /// Iterates all masternodes in registration-hash order.
    pub fn masternodes(&self) -> impl Iterator<Item = &Arc<DeterministicMasternode>> {
        self.mn_map.values()
    }

    /// Iterates the masternodes that are not PoSe-banned.
    pub fn valid_masternodes(&self) -> impl Iterator<Item = &Arc<DeterministicMasternode>> {
        self.mn_map.values().filter(|mn| !mn.state.is_pose_banned())
    }

    /// Looks up a masternode by registration hash.
    pub fn get_mn(&self, pro_tx_hash: &ProTxHash) -> Option<&Arc<DeterministicMasternode>> {
        self.mn_map.get(pro_tx_hash)
    }

    /// Looks up a masternode by registration hash, skipping banned ones.
    pub fn get_valid_mn(&self, pro_tx_hash: &ProTxHash) -> Option<&Arc<DeterministicMasternode>> {
        self.get_mn(pro_tx_hash).filter(|mn| !mn.state.is_pose_banned())
    }

    /// Whether this registration hash maps to a masternode that is not
    /// PoSe-banned.
    pub fn is_mn_valid(&self, pro_tx_hash: &ProTxHash) -> bool {
        self.get_valid_mn(pro_tx_hash).is_some()
    }

    /// Whether this registration hash maps to a PoSe-banned masternode.
    pub fn is_mn_pose_banned(&self, pro_tx_hash: &ProTxHash) -> bool {
        self.get_mn(pro_tx_hash).is_some_and(|mn| mn.state.is_pose_banned())
    }

    /// Whether a masternode with this registration hash exists.
    pub fn contains_mn(&self, pro_tx_hash: &ProTxHash) -> bool {
        self.mn_map.contains_key(pro_tx_hash)
    }

    /// Looks up a masternode by internal id.
    pub fn get_mn_by_internal_id(
        &self,
        internal_id: u64,
    ) -> Option<&Arc<DeterministicMasternode>> {
        self.mn_internal_id_map.get(&internal_id).and_then(|hash| self.mn_map.get(hash))
    }

    /// Looks up the masternode holding a unique property value.
    pub fn get_unique_property_mn<T: UniqueProperty>(
        &self,
        value: &T,
    ) -> Option<&Arc<DeterministicMasternode>> {
        let (owner, _) = self.unique_property_map.get(&value.property_hash())?;
        self.mn_map.get(owner)
    }

    /// Whether any masternode holds this unique property value.
    pub fn has_unique_property<T: UniqueProperty>(&self, value: &T) -> bool {
        self.unique_property_map.contains_key(&value.property_hash())
    }

    /// Looks up a masternode by its locked collateral.
    pub fn get_mn_by_collateral(
        &self,
        collateral: &OutPoint,
    ) -> Option<&Arc<DeterministicMasternode>> {
        self.get_unique_property_mn(collateral)
    }

    /// Like [`Self::get_mn_by_collateral`] but skips banned masternodes.
    pub fn get_valid_mn_by_collateral(
        &self,
        collateral: &OutPoint,
    ) -> Option<&Arc<DeterministicMasternode>> {
        self.get_mn_by_collateral(collateral).filter(|mn| !mn.state.is_pose_banned())
    }

    /// Whether any masternode locks this collateral.
    pub fn contains_collateral(&self, collateral: &OutPoint) -> bool {
        self.has_unique_property(collateral)
    }

    /// Looks up a masternode by service address.
    pub fn get_mn_by_service(
        &self,
        service: &ServiceAddress,
    ) -> Option<&Arc<DeterministicMasternode>> {
        self.get_unique_property_mn(service)
    }

    /// Looks up a masternode by operator key. Linear, only used on the
    /// validation slow path.
    pub fn get_mn_by_operator_key(
        &self,
        operator_key: &BLSPublicKey,
    ) -> Option<&Arc<DeterministicMasternode>> {
        self.mn_map.values().find(|mn| mn.state.operator_public_key == *operator_key)
    }

    /// Adds a masternode to the list.
    ///
    /// Fails when the registration hash, internal id, or any of the unique
    /// properties is already taken. `bump_total_count` advances the
    /// registration counter past the new internal id; it is off when
    /// rebuilding a list from a snapshot, where the stored counter rules.
    pub fn add_mn(
        &mut self,
        mn: Arc<DeterministicMasternode>,
        bump_total_count: bool,
    ) -> Result<(), InternalError> {
        if self.mn_map.contains_key(&mn.pro_tx_hash) {
            return Err(InternalError::DuplicateProTxHash(mn.pro_tx_hash));
        }
        if self.mn_internal_id_map.contains_key(&mn.internal_id()) {
            return Err(InternalError::DuplicateInternalId(mn.internal_id()));
        }
        if !mn.state.service_address.is_null() && self.has_unique_property(&mn.state.service_address)
        {
            return Err(InternalError::DuplicateUniqueProperty(mn.pro_tx_hash));
        }
        if self.has_unique_property(&mn.state.owner_key_hash)
            || self.has_unique_property(&mn.state.operator_public_key)
        {
            return Err(InternalError::DuplicateUniqueProperty(mn.pro_tx_hash));
        }

        self.mn_internal_id_map.insert(mn.internal_id(), mn.pro_tx_hash);
        self.add_unique_property(&mn, &mn.collateral_outpoint.clone())?;
        if !mn.state.service_address.is_null() {
            self.add_unique_property(&mn, &mn.state.service_address.clone())?;
        }
        self.add_unique_property(&mn, &mn.state.owner_key_hash.clone())?;
        self.add_unique_property(&mn, &mn.state.operator_public_key.clone())?;

        if bump_total_count {
            // the counter is a high-water mark, not a limit
            self.total_registered_count =
                self.total_registered_count.max((mn.internal_id() + 1).min(u32::MAX as u64) as u32);
        }
        self.mn_map.insert(mn.pro_tx_hash, mn);
        Ok(())
    }

    /// Replaces the state of a masternode, keeping the unique-property
    /// index in sync.
    pub fn update_mn(
        &mut self,
        pro_tx_hash: &ProTxHash,
        new_state: Arc<MasternodeState>,
    ) -> Result<(), InternalError> {
        let old_mn = self
            .mn_map
            .get(pro_tx_hash)
            .ok_or(InternalError::MasternodeNotFound(*pro_tx_hash))?
            .clone();

        // the address index must still point at us before we move it
        if !old_mn.state.service_address.is_null() {
            match self.unique_property_map.get(&old_mn.state.service_address.property_hash()) {
                Some((owner, _)) if *owner == old_mn.pro_tx_hash => {}
                _ => return Err(InternalError::UniqueIndexCorrupt(old_mn.pro_tx_hash)),
            }
        }

        let mut new_mn = (*old_mn).clone();
        let old_state = Arc::clone(&new_mn.state);
        new_mn.state = new_state;
        let new_mn = Arc::new(new_mn);

        self.update_unique_property(
            &new_mn,
            &old_state.service_address,
            &new_mn.state.service_address.clone(),
        )?;
        self.update_unique_property(
            &new_mn,
            &old_state.owner_key_hash,
            &new_mn.state.owner_key_hash.clone(),
        )?;
        self.update_unique_property(
            &new_mn,
            &old_state.operator_public_key,
            &new_mn.state.operator_public_key.clone(),
        )?;
        self.mn_map.insert(*pro_tx_hash, new_mn);
        Ok(())
    }

    /// Applies a state diff to a masternode.
    pub fn update_mn_with_diff(
        &mut self,
        pro_tx_hash: &ProTxHash,
        state_diff: &MasternodeStateDiff,
    ) -> Result<(), InternalError> {
        let old_mn = self
            .mn_map
            .get(pro_tx_hash)
            .ok_or(InternalError::MasternodeNotFound(*pro_tx_hash))?;
        let mut new_state = (*old_mn.state).clone();
        state_diff.apply_to(&mut new_state);
        self.update_mn(pro_tx_hash, Arc::new(new_state))
    }

    /// Removes a masternode from the list.
    pub fn remove_mn(&mut self, pro_tx_hash: &ProTxHash) -> Result<(), InternalError> {
        let mn = self
            .mn_map
            .get(pro_tx_hash)
            .ok_or(InternalError::MasternodeNotFound(*pro_tx_hash))?
            .clone();
        self.delete_unique_property(&mn, &mn.collateral_outpoint.clone())?;
        if !mn.state.service_address.is_null() {
            self.delete_unique_property(&mn, &mn.state.service_address.clone())?;
        }
        self.delete_unique_property(&mn, &mn.state.owner_key_hash.clone())?;
        self.delete_unique_property(&mn, &mn.state.operator_public_key.clone())?;

        self.mn_map.remove(pro_tx_hash);
        self.mn_internal_id_map.remove(&mn.internal_id());
        Ok(())
    }

    /// The largest penalty the list can hand out: the size of a full
    /// payment cycle, but at least 100.
    pub fn calc_max_pose_penalty(&self) -> i32 {
        100.max(self.all_mns_count() as i32)
    }

    /// A percentage of the maximum penalty. Choose the percentage high
    /// enough to survive the per-block decrease between failures.
    pub fn calc_penalty(&self, percent: i32) -> i32 {
        debug_assert!(percent > 0);
        ((self.calc_max_pose_penalty() * percent) / 100).max(1)
    }

    /// Raises the PoSe penalty of a masternode and bans it when the
    /// penalty reaches the maximum.
    ///
    /// Penalties only grow while the masternode is unbanned, so a banned
    /// masternode's score may read below the current maximum.
    pub fn pose_punish(
        &mut self,
        pro_tx_hash: &ProTxHash,
        penalty: i32,
    ) -> Result<(), InternalError> {
        debug_assert!(penalty > 0);
        let mn = self
            .mn_map
            .get(pro_tx_hash)
            .ok_or(InternalError::MasternodeNotFound(*pro_tx_hash))?;

        let max_penalty = self.calc_max_pose_penalty();
        let mut new_state = (*mn.state).clone();
        new_state.pose_penalty = max_penalty.min(new_state.pose_penalty + penalty);

        info!(
            target: "mnlist",
            masternode = %pro_tx_hash,
            penalty = new_state.pose_penalty,
            max = max_penalty,
            "PoSe punished"
        );

        if new_state.pose_penalty >= max_penalty && new_state.pose_ban_height == -1 {
            new_state.pose_ban_height = self.height;
            info!(target: "mnlist", masternode = %pro_tx_hash, height = self.height, "PoSe banned");
        }
        self.update_mn(pro_tx_hash, Arc::new(new_state))
    }

    /// Lowers the PoSe penalty of a masternode by one. Only callable on
    /// unbanned masternodes with a positive penalty.
    pub fn pose_decrease(&mut self, pro_tx_hash: &ProTxHash) -> Result<(), InternalError> {
        let mn = self
            .mn_map
            .get(pro_tx_hash)
            .ok_or(InternalError::MasternodeNotFound(*pro_tx_hash))?;
        if mn.state.pose_penalty <= 0 || mn.state.is_pose_banned() {
            return Err(InternalError::PoSeDecreasePrecondition(*pro_tx_hash));
        }
        let mut new_state = (*mn.state).clone();
        new_state.pose_penalty -= 1;
        self.update_mn(pro_tx_hash, Arc::new(new_state))
    }

    fn add_unique_property<T: UniqueProperty>(
        &mut self,
        mn: &Arc<DeterministicMasternode>,
        value: &T,
    ) -> Result<(), InternalError> {
        debug_assert!(!value.is_null_value());
        let hash = value.property_hash();
        let entry = self.unique_property_map.entry(hash).or_insert((mn.pro_tx_hash, 0));
        if entry.0 != mn.pro_tx_hash {
            return Err(InternalError::DuplicateUniqueProperty(mn.pro_tx_hash));
        }
        entry.1 += 1;
        Ok(())
    }

    fn delete_unique_property<T: UniqueProperty>(
        &mut self,
        mn: &Arc<DeterministicMasternode>,
        old_value: &T,
    ) -> Result<(), InternalError> {
        debug_assert!(!old_value.is_null_value());
        let hash = old_value.property_hash();
        match self.unique_property_map.get_mut(&hash) {
            Some((owner, count)) if *owner == mn.pro_tx_hash => {
                if *count == 1 {
                    self.unique_property_map.remove(&hash);
                } else {
                    *count -= 1;
                }
                Ok(())
            }
            _ => Err(InternalError::UniqueIndexCorrupt(mn.pro_tx_hash)),
        }
    }

    fn update_unique_property<T: UniqueProperty>(
        &mut self,
        mn: &Arc<DeterministicMasternode>,
        old_value: &T,
        new_value: &T,
    ) -> Result<(), InternalError> {
        if old_value.property_hash() == new_value.property_hash() {
            return Ok(());
        }
        if !old_value.is_null_value() {
            self.delete_unique_property(mn, old_value)?;
        }
        if !new_value.is_null_value() {
            self.add_unique_property(mn, new_value)?;
        }
        Ok(())
    }
}

impl Encodable for MasternodeList {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.block_hash.consensus_encode(writer)?;
        len += self.height.consensus_encode(writer)?;
        len += self.total_registered_count.consensus_encode(writer)?;
        len += VarInt(self.mn_map.len() as u64).consensus_encode(writer)?;
        for mn in self.mn_map.values() {
            len += mn.as_ref().consensus_encode(writer)?;
        }
        Ok(len)
    }
}

impl Decodable for MasternodeList {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let block_hash = BlockHash::consensus_decode(reader)?;
        let height = i32::consensus_decode(reader)?;
        let total_registered_count = u32::consensus_decode(reader)?;
        let count = VarInt::consensus_decode(reader)?.0 as usize;
        if count > encode::MAX_VEC_SIZE {
            return Err(encode::Error::OversizedVectorAllocation {
                requested: count,
                max: encode::MAX_VEC_SIZE,
            });
        }
        let mut list = MasternodeList::new(block_hash, height, total_registered_count);
        for _ in 0..count {
            let mn = DeterministicMasternode::consensus_decode(reader)?;
            // rebuild the indexes; the stored counter rules, so no bump
            list.add_mn(Arc::new(mn), false)
                .map_err(|_| encode::Error::ParseFailed("duplicate masternode in snapshot"))?;
        }
        Ok(list)
    }
}
