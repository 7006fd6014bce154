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

//! The masternode list manager.
//!
//! Connects and disconnects blocks against the deterministic list. For
//! every connected block the manager derives the new list from the
//! previous one, persists the delta (plus a full snapshot at a fixed
//! interval) and keeps a bounded cache of recent lists and diffs. A list
//! for any block is reconstructed by walking back to the nearest snapshot
//! and replaying diffs forward.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::chain::{Block, BlockIndex, CoinView};
use crate::dmn::entry::DeterministicMasternode;
use crate::dmn::list::{MasternodeList, MasternodeListDiff};
use crate::dmn::state::MasternodeState;
use crate::dmn::validation::{
    ValidationContext, check_special_tx, decode_pro_reg, decode_pro_up_reg, decode_pro_up_rev,
    decode_pro_up_serv,
};
use crate::error::{InternalError, ProTxValidationError, ProcessBlockError};
use crate::hash_types::{BlockHash, ProTxHash, PubkeyHash};
use crate::hashes::Hash;
use crate::params::Params;
use crate::signer::{BlsVerifier, HashSigVerifier};
use crate::store::{DB_BEST_BLOCK, DB_LIST_DIFF, DB_LIST_SNAPSHOT, EvoDb, read_record, write_record};
use crate::transaction::special::TransactionType;
use crate::transaction::{OutPoint, Transaction};

/// How many blocks apart full list snapshots are written.
pub const DISK_SNAPSHOT_PERIOD: i32 = 1440;
/// How many snapshot generations the caches are sized for.
pub const DISK_SNAPSHOTS: i32 = 3;
/// How many blocks of lists and diffs stay cached in memory.
pub const LIST_DIFFS_CACHE_SIZE: i32 = DISK_SNAPSHOT_PERIOD * DISK_SNAPSHOTS;

// the best-block marker is a single record under a fixed all-zero key
fn best_block_key() -> BlockHash {
    BlockHash::all_zeros()
}

/// Observer of list changes, called after a block connects or disconnects.
///
/// Notifications happen outside the manager lock, so an implementation may
/// call back into the manager.
pub trait MasternodeListListener {
    /// `old_list` is the list the change departs from and `diff` takes it
    /// to the new state; `undone` marks a disconnect.
    fn on_masternode_list_changed(
        &self,
        undone: bool,
        old_list: &MasternodeList,
        diff: &MasternodeListDiff,
    );
}

/// Hook into the host's pre-deterministic masternode tracking.
pub trait LegacyBridge {
    /// A registration claimed `collateral`; any legacy masternode entry
    /// pinned to that outpoint must retire.
    fn collateral_registered(&self, pro_tx_hash: &ProTxHash, collateral: &OutPoint);
}

struct Inner<D> {
    db: D,
    lists_cache: BTreeMap<BlockHash, MasternodeList>,
    diffs_cache: BTreeMap<BlockHash, MasternodeListDiff>,
    tip: Option<Arc<BlockIndex>>,
}

/// Drives the deterministic masternode list along the active chain.
pub struct DeterministicMnManager<D: EvoDb> {
    params: Params,
    inner: Mutex<Inner<D>>,
    listeners: Vec<Box<dyn MasternodeListListener + Send + Sync>>,
    legacy_bridge: Option<Box<dyn LegacyBridge + Send + Sync>>,
}

impl<D: EvoDb> DeterministicMnManager<D> {
    /// Creates a manager over the given store.
    pub fn new(params: Params, db: D) -> Self {
        DeterministicMnManager {
            params,
            inner: Mutex::new(Inner {
                db,
                lists_cache: BTreeMap::new(),
                diffs_cache: BTreeMap::new(),
                tip: None,
            }),
            listeners: Vec::new(),
            legacy_bridge: None,
        }
    }

    /// Registers a list change observer.
    pub fn add_listener(&mut self, listener: Box<dyn MasternodeListListener + Send + Sync>) {
        self.listeners.push(listener);
    }

    /// Installs the legacy masternode bridge.
    pub fn set_legacy_bridge(&mut self, bridge: Box<dyn LegacyBridge + Send + Sync>) {
        self.legacy_bridge = Some(bridge);
    }

    /// The network parameters the manager runs under.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Connects `block` at `index`, updating and persisting the list.
    ///
    /// Validates every special transaction against the list and UTXO set of
    /// the previous block, then applies them in order. On success a diff
    /// record is written for the block, plus a snapshot every
    /// [`DISK_SNAPSHOT_PERIOD`] blocks.
    pub fn process_block<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
        &self,
        block: &Block,
        index: &Arc<BlockIndex>,
        coins: &C,
        hash_signer: &H,
        bls: &B,
    ) -> Result<(), ProcessBlockError> {
        let height = index.height;
        let mut registered_collaterals = Vec::new();

        let (old_list, diff) = {
            let mut inner = self.inner.lock().expect("masternode manager lock poisoned");
            let old_list = self.get_list_for_block_inner(&mut inner, index.prev.clone())?;

            let mut new_list = self.build_new_list_from_block(
                block,
                index,
                &old_list,
                coins,
                hash_signer,
                bls,
                &mut registered_collaterals,
            )?;
            new_list.set_block_hash(index.hash);
            new_list.set_height(height);

            let mut diff = old_list.build_diff(&new_list);
            write_record(&mut inner.db, DB_LIST_DIFF, &index.hash, &diff)
                .map_err(InternalError::from)?;

            if height % DISK_SNAPSHOT_PERIOD == 0 || old_list.height() == -1 {
                write_record(&mut inner.db, DB_LIST_SNAPSHOT, &index.hash, &new_list)
                    .map_err(InternalError::from)?;
                inner.lists_cache.insert(index.hash, new_list.clone());
                info!(
                    target: "mnlist",
                    height,
                    masternodes = new_list.all_mns_count(),
                    "wrote masternode list snapshot"
                );
            }

            write_record(&mut inner.db, DB_BEST_BLOCK, &best_block_key(), &index.hash)
                .map_err(InternalError::from)?;

            // the record itself never stores the height
            diff.height = height;
            inner.diffs_cache.insert(index.hash, diff.clone());
            inner.tip = Some(Arc::clone(index));
            Self::cleanup_cache(&mut inner, height);
            (old_list, diff)
        };

        if let Some(bridge) = &self.legacy_bridge {
            for (pro_tx_hash, collateral) in &registered_collaterals {
                bridge.collateral_registered(pro_tx_hash, collateral);
            }
        }
        if diff.has_changes() {
            for listener in &self.listeners {
                listener.on_masternode_list_changed(false, &old_list, &diff);
            }
        }
        if self.params.is_activation_height(height) {
            info!(target: "mnlist", height, "deterministic masternode list is now consensus");
        }
        Ok(())
    }

    /// Disconnects the block at `index`, restoring the previous list.
    ///
    /// The diff written when the block connected must still be present;
    /// a missing record means the store no longer covers the chain and the
    /// node cannot continue.
    pub fn undo_block(&self, index: &Arc<BlockIndex>) -> Result<(), InternalError> {
        let lists = {
            let mut inner = self.inner.lock().expect("masternode manager lock poisoned");
            let diff: MasternodeListDiff =
                read_record(&inner.db, DB_LIST_DIFF, &index.hash)?.ok_or(
                    InternalError::MissingListData { hash: index.hash, height: index.height },
                )?;

            let lists = if diff.has_changes() {
                let current = self.get_list_for_block_inner(&mut inner, Some(Arc::clone(index)))?;
                let previous = self.get_list_for_block_inner(&mut inner, index.prev.clone())?;
                Some((current, previous))
            } else {
                None
            };

            inner.lists_cache.remove(&index.hash);
            inner.diffs_cache.remove(&index.hash);
            inner.db.erase(DB_LIST_DIFF, &index.hash)?;
            inner.db.erase(DB_LIST_SNAPSHOT, &index.hash)?;
            match index.prev.as_ref() {
                Some(prev) => {
                    write_record(&mut inner.db, DB_BEST_BLOCK, &best_block_key(), &prev.hash)?
                }
                None => inner.db.erase(DB_BEST_BLOCK, &best_block_key())?,
            }
            inner.tip = index.prev.clone();
            lists
        };

        if let Some((current, previous)) = lists {
            let undo_diff = current.build_diff(&previous);
            for listener in &self.listeners {
                listener.on_masternode_list_changed(true, &current, &undo_diff);
            }
        }
        if self.params.is_activation_height(index.height) {
            info!(target: "mnlist", height = index.height, "deterministic masternode list disconnected below activation");
        }
        Ok(())
    }

    /// Checks at startup that the store left off at the expected chain tip.
    ///
    /// A mismatch means the store was written against a different chain (or
    /// lost its final blocks) and must be rebuilt before the manager can
    /// serve lists. Blocks before activation leave no marker, so `None` on
    /// both sides is fine.
    pub fn verify_best_block(
        &self,
        expected: Option<&Arc<BlockIndex>>,
    ) -> Result<(), InternalError> {
        let inner = self.inner.lock().expect("masternode manager lock poisoned");
        let stored: Option<BlockHash> =
            read_record(&inner.db, DB_BEST_BLOCK, &best_block_key())?;
        let expected_hash = expected.map(|index| index.hash);
        if stored == expected_hash {
            Ok(())
        } else {
            Err(InternalError::StoreOutOfSync { stored, expected: expected_hash })
        }
    }

    /// The list as of the given block, reconstructed from a snapshot and
    /// the diff chain when not cached. `None` yields the pre-activation
    /// empty list.
    pub fn get_list_for_block(
        &self,
        index: Option<&Arc<BlockIndex>>,
    ) -> Result<MasternodeList, InternalError> {
        let mut inner = self.inner.lock().expect("masternode manager lock poisoned");
        self.get_list_for_block_inner(&mut inner, index.cloned())
    }

    /// The list as of the current tip.
    pub fn get_list_at_chain_tip(&self) -> Result<MasternodeList, InternalError> {
        let mut inner = self.inner.lock().expect("masternode manager lock poisoned");
        let tip = inner.tip.clone();
        self.get_list_for_block_inner(&mut inner, tip)
    }

    fn get_list_for_block_inner(
        &self,
        inner: &mut Inner<D>,
        index: Option<Arc<BlockIndex>>,
    ) -> Result<MasternodeList, InternalError> {
        let requested = index.clone();
        let mut steps: Vec<(Arc<BlockIndex>, MasternodeListDiff)> = Vec::new();
        let mut cursor = index;

        let snapshot = loop {
            let Some(current) = cursor else {
                break MasternodeList::default();
            };
            if let Some(cached) = inner.lists_cache.get(&current.hash) {
                break cached.clone();
            }
            if let Some(stored) =
                read_record::<_, MasternodeList>(&inner.db, DB_LIST_SNAPSHOT, &current.hash)?
            {
                inner.lists_cache.insert(current.hash, stored.clone());
                break stored;
            }

            let diff = if let Some(cached) = inner.diffs_cache.get(&current.hash) {
                Some(cached.clone())
            } else if let Some(mut stored) =
                read_record::<_, MasternodeListDiff>(&inner.db, DB_LIST_DIFF, &current.hash)?
            {
                stored.height = current.height;
                inner.diffs_cache.insert(current.hash, stored.clone());
                Some(stored)
            } else {
                None
            };

            match diff {
                Some(diff) => {
                    let prev = current.prev.clone();
                    steps.push((current, diff));
                    cursor = prev;
                }
                None => {
                    // a gap inside the covered range means the store is no
                    // longer usable
                    if self.params.is_active(current.height) {
                        return Err(InternalError::MissingListData {
                            hash: current.hash,
                            height: current.height,
                        });
                    }
                    let mut empty = MasternodeList::default();
                    empty.set_block_hash(current.hash);
                    break empty;
                }
            }
        };

        let mut list = snapshot;
        for (block_index, diff) in steps.iter().rev() {
            if diff.has_changes() {
                list = list.apply_diff(block_index.hash, block_index.height, diff)?;
            } else {
                list.set_block_hash(block_index.hash);
                list.set_height(block_index.height);
            }
        }

        // keep the tip list hot; everything else ages out of the diff cache
        if let (Some(requested), Some(tip)) = (&requested, &inner.tip) {
            if requested.hash == tip.hash {
                inner.lists_cache.insert(requested.hash, list.clone());
            }
        }
        Ok(list)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_new_list_from_block<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
        &self,
        block: &Block,
        index: &Arc<BlockIndex>,
        old_list: &MasternodeList,
        coins: &C,
        hash_signer: &H,
        bls: &B,
        registered_collaterals: &mut Vec<(ProTxHash, OutPoint)>,
    ) -> Result<MasternodeList, ProcessBlockError> {
        let height = index.height;
        let ctx = ValidationContext { params: &self.params, coins, hash_signer, bls };

        let mut new_list = old_list.clone();
        new_list.set_block_hash(BlockHash::all_zeros());
        new_list.set_height(height);

        // the payee is chosen from the previous list; its payment is
        // stamped only after all updates of this block are applied
        let payee = old_list.get_mn_payee().cloned();

        if let Some(prev) = index.prev.as_ref() {
            for mn in old_list.masternodes() {
                if mn.state.is_confirmed() || mn.state.registered_height == -1 {
                    continue;
                }
                if prev.height - mn.state.registered_height
                    >= self.params.masternode_min_confirmations
                {
                    let mut state = (*mn.state).clone();
                    state.update_confirmed_hash(&mn.pro_tx_hash, &prev.hash);
                    new_list.update_mn(&mn.pro_tx_hash, Arc::new(state))?;
                }
            }
        }

        self.decrease_pose_penalties(&mut new_list)?;

        for tx in &block.txdata {
            if tx.is_special() {
                check_special_tx(tx, height, old_list, &ctx)?;
                self.apply_special_tx(&mut new_list, tx, height, registered_collaterals)?;
            }

            // spending a collateral retires the masternode it backs
            if !tx.is_coinbase() {
                for input in &tx.input {
                    let spent = new_list
                        .get_mn_by_collateral(&input.prevout)
                        .filter(|mn| mn.collateral_outpoint == input.prevout)
                        .map(|mn| mn.pro_tx_hash);
                    if let Some(pro_tx_hash) = spent {
                        info!(
                            target: "mnlist",
                            masternode = %pro_tx_hash,
                            collateral = %input.prevout,
                            height,
                            "collateral spent, masternode removed"
                        );
                        new_list.remove_mn(&pro_tx_hash)?;
                    }
                }
            }
        }

        if let Some(payee) = payee {
            if let Some(mn) = new_list.get_mn(&payee.pro_tx_hash) {
                let mut state = (*mn.state).clone();
                state.last_paid_height = height;
                new_list.update_mn(&payee.pro_tx_hash, Arc::new(state))?;
            }
        }

        Ok(new_list)
    }

    fn apply_special_tx(
        &self,
        new_list: &mut MasternodeList,
        tx: &Transaction,
        height: i32,
        registered_collaterals: &mut Vec<(ProTxHash, OutPoint)>,
    ) -> Result<(), ProcessBlockError> {
        match tx.tx_type {
            TransactionType::Classic => {}
            TransactionType::ProviderRegistration => {
                let payload = decode_pro_reg(tx)?;
                let pro_tx_hash = ProTxHash::from_byte_array(tx.txid().to_byte_array());
                let collateral = if payload.has_internal_collateral() {
                    OutPoint::new(tx.txid(), payload.collateral_outpoint.vout)
                } else {
                    payload.collateral_outpoint
                };

                // re-registering a collateral replaces its masternode
                if let Some(replaced) =
                    new_list.get_mn_by_collateral(&collateral).map(|mn| mn.pro_tx_hash)
                {
                    debug!(
                        target: "mnlist",
                        masternode = %replaced,
                        collateral = %collateral,
                        "masternode replaced by re-registration"
                    );
                    new_list.remove_mn(&replaced)?;
                }

                if !payload.service_address.is_null()
                    && new_list.has_unique_property(&payload.service_address)
                {
                    return Err(ProTxValidationError::DupAddress.into());
                }
                if new_list.has_unique_property(&payload.owner_key_hash)
                    || new_list.has_unique_property(&payload.operator_public_key)
                {
                    return Err(ProTxValidationError::DupKey.into());
                }

                let mut state = MasternodeState::from_registration(&payload);
                state.registered_height = height;
                if payload.service_address.is_null() {
                    // no address yet, the node starts banned until a service
                    // update goes through
                    state.pose_ban_height = height;
                }
                let mn = DeterministicMasternode::new(
                    new_list.total_registered_count() as u64,
                    pro_tx_hash,
                    collateral,
                    payload.operator_reward,
                    state,
                );
                new_list.add_mn(Arc::new(mn), true)?;
                registered_collaterals.push((pro_tx_hash, collateral));
                info!(target: "mnlist", masternode = %pro_tx_hash, height, "masternode registered");
            }
            TransactionType::ProviderUpdateService => {
                let payload = decode_pro_up_serv(tx)?;
                if let Some(holder) = new_list.get_mn_by_service(&payload.service_address) {
                    if holder.pro_tx_hash != payload.pro_tx_hash {
                        return Err(ProTxValidationError::DupAddress.into());
                    }
                }
                let mn = new_list
                    .get_mn(&payload.pro_tx_hash)
                    .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

                let mut state = (*mn.state).clone();
                state.service_address = payload.service_address;
                state.script_operator_payout = payload.script_operator_payout.clone();
                // revival needs all three key roles filled; a revoked
                // masternode stays banned until the owner names an operator
                if state.is_pose_banned()
                    && !state.operator_public_key.is_null()
                    && state.owner_key_hash != PubkeyHash::all_zeros()
                    && state.voting_key_hash != PubkeyHash::all_zeros()
                {
                    state.pose_ban_height = -1;
                    state.pose_penalty = 0;
                    state.pose_revived_height = height;
                    info!(
                        target: "mnlist",
                        masternode = %payload.pro_tx_hash,
                        height,
                        "masternode revived by service update"
                    );
                }
                new_list.update_mn(&payload.pro_tx_hash, Arc::new(state))?;
            }
            TransactionType::ProviderUpdateRegistrar => {
                let payload = decode_pro_up_reg(tx)?;
                let mn = new_list
                    .get_mn(&payload.pro_tx_hash)
                    .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

                let mut state = (*mn.state).clone();
                if state.operator_public_key != payload.operator_public_key {
                    // a new operator starts from a clean slate and must
                    // advertise a service before going live again
                    state.reset_operator_fields();
                    state.ban_if_not_banned(height);
                }
                state.operator_public_key = payload.operator_public_key;
                state.voting_key_hash = payload.voting_key_hash;
                state.script_payout = payload.script_payout.clone();
                new_list.update_mn(&payload.pro_tx_hash, Arc::new(state))?;
            }
            TransactionType::ProviderUpdateRevocation => {
                let payload = decode_pro_up_rev(tx)?;
                let mn = new_list
                    .get_mn(&payload.pro_tx_hash)
                    .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

                let mut state = (*mn.state).clone();
                state.reset_operator_fields();
                state.ban_if_not_banned(height);
                state.revocation_reason = payload.reason;
                new_list.update_mn(&payload.pro_tx_hash, Arc::new(state))?;
                info!(
                    target: "mnlist",
                    masternode = %payload.pro_tx_hash,
                    reason = payload.reason,
                    height,
                    "masternode revoked"
                );
            }
        }
        Ok(())
    }

    fn decrease_pose_penalties(&self, list: &mut MasternodeList) -> Result<(), InternalError> {
        let to_decrease: Vec<ProTxHash> = list
            .masternodes()
            .filter(|mn| mn.state.pose_penalty > 0 && !mn.state.is_pose_banned())
            .map(|mn| mn.pro_tx_hash)
            .collect();
        for pro_tx_hash in to_decrease {
            list.pose_decrease(&pro_tx_hash)?;
        }
        Ok(())
    }

    fn cleanup_cache(inner: &mut Inner<D>, height: i32) {
        inner.lists_cache.retain(|_, list| list.height() + LIST_DIFFS_CACHE_SIZE >= height);
        inner.diffs_cache.retain(|_, diff| diff.height + LIST_DIFFS_CACHE_SIZE >= height);
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::store::MemoryEvoDb;
    use crate::test_utils::{
        AcceptAllSigners, MemoryCoins, block_with, extend_chain, pro_reg_tx, pro_tx_hash_of,
        pro_up_reg_tx, pro_up_rev_tx, pro_up_serv_tx, service, spend_tx, test_params,
    };
    use crate::test_utils::{operator_key, payout_key, voting_key};
    use crate::transaction::special::provider_update_revocation::REASON_TERMINATION_OF_SERVICE;

    use super::*;

    struct Harness {
        manager: DeterministicMnManager<MemoryEvoDb>,
        coins: MemoryCoins,
        tip: Option<Arc<BlockIndex>>,
    }

    impl Harness {
        fn new() -> Self {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
            Harness {
                manager: DeterministicMnManager::new(test_params(), MemoryEvoDb::new()),
                coins: MemoryCoins::default(),
                tip: None,
            }
        }

        fn connect(&mut self, txdata: Vec<Transaction>) -> Arc<BlockIndex> {
            self.try_connect(txdata).expect("block should connect")
        }

        fn try_connect(
            &mut self,
            txdata: Vec<Transaction>,
        ) -> Result<Arc<BlockIndex>, ProcessBlockError> {
            let index = extend_chain(self.tip.clone());
            let block = block_with(index.height, txdata);
            self.manager.process_block(
                &block,
                &index,
                &self.coins,
                &AcceptAllSigners,
                &AcceptAllSigners,
            )?;
            // mirror the block into the UTXO set for the next connect
            for tx in &block.txdata {
                if !tx.is_coinbase() {
                    for input in &tx.input {
                        self.coins.spend(&input.prevout);
                    }
                }
                for (vout, out) in tx.output.iter().enumerate() {
                    self.coins.add(
                        OutPoint::new(tx.txid(), vout as u32),
                        out.value,
                        out.script_pubkey.clone(),
                    );
                }
            }
            self.tip = Some(Arc::clone(&index));
            Ok(index)
        }

        fn disconnect(&mut self) {
            let index = self.tip.take().expect("a block to disconnect");
            self.manager.undo_block(&index).unwrap();
            self.tip = index.prev.clone();
        }

        fn tip_list(&self) -> MasternodeList {
            self.manager.get_list_at_chain_tip().unwrap()
        }
    }

    #[test]
    fn registration_appears_in_list() {
        let mut harness = Harness::new();
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let hash = pro_tx_hash_of(&reg);
        harness.connect(vec![reg]);

        let list = harness.tip_list();
        assert_eq!(list.all_mns_count(), 1);
        let mn = list.get_mn(&hash).unwrap();
        assert_eq!(mn.state.registered_height, 0);
        assert_eq!(mn.internal_id(), 0);
        assert_eq!(list.total_registered_count(), 1);
    }

    #[test]
    fn duplicate_owner_key_rejects_block() {
        let mut harness = Harness::new();
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        harness.connect(vec![reg.clone()]);

        // second registration reusing the same keys but fresh collateral
        let mut dup = pro_reg_tx(harness.manager.params(), 2, None);
        let mut payload = decode_pro_reg(&dup).unwrap();
        payload.owner_key_hash = decode_pro_reg(&reg).unwrap().owner_key_hash;
        dup.extra_payload = crate::consensus::serialize(&payload);

        assert_matches!(
            harness.try_connect(vec![dup]),
            Err(ProcessBlockError::Validation(ProTxValidationError::DupOwnerKey))
        );
    }

    #[test]
    fn payee_rotation_stamps_last_paid() {
        let mut harness = Harness::new();
        let reg_a = pro_reg_tx(harness.manager.params(), 1, None);
        let reg_b = pro_reg_tx(harness.manager.params(), 2, None);
        let hash_a = pro_tx_hash_of(&reg_a);
        let hash_b = pro_tx_hash_of(&reg_b);
        harness.connect(vec![reg_a, reg_b]);

        // block 1: one of the two is paid; block 2 pays the other
        harness.connect(vec![]);
        let list = harness.tip_list();
        let paid: Vec<_> = list
            .masternodes()
            .filter(|mn| mn.state.last_paid_height == 1)
            .map(|mn| mn.pro_tx_hash)
            .collect();
        assert_eq!(paid.len(), 1);

        harness.connect(vec![]);
        let list = harness.tip_list();
        let paid_heights: Vec<i32> = [hash_a, hash_b]
            .iter()
            .map(|h| list.get_mn(h).unwrap().state.last_paid_height)
            .collect();
        let mut sorted = paid_heights.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn collateral_spend_removes_masternode() {
        let mut harness = Harness::new();
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let hash = pro_tx_hash_of(&reg);
        let collateral = OutPoint::new(reg.txid(), 0);
        harness.connect(vec![reg]);
        assert_eq!(harness.tip_list().all_mns_count(), 1);

        harness.connect(vec![spend_tx(&[collateral])]);
        let list = harness.tip_list();
        assert_eq!(list.all_mns_count(), 0);
        assert!(!list.contains_mn(&hash));
        // the internal id is burned, not recycled
        assert_eq!(list.total_registered_count(), 1);
    }

    #[test]
    fn operator_change_bans_until_service_update() {
        let mut harness = Harness::new();
        let params_port = harness.manager.params().default_port;
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let hash = pro_tx_hash_of(&reg);
        harness.connect(vec![reg]);

        // rotate the operator key: operator fields reset, masternode banned
        let rotate = pro_up_reg_tx(hash, operator_key(9), voting_key(1), payout_key(1), 3);
        harness.connect(vec![rotate]);
        let list = harness.tip_list();
        let mn = list.get_mn(&hash).unwrap();
        assert!(mn.state.is_pose_banned());
        assert_eq!(mn.state.operator_public_key, operator_key(9));
        assert!(mn.state.service_address.is_null());
        assert_eq!(list.valid_mns_count(), 0);

        // the new operator advertises a service and revives the node
        let revive = pro_up_serv_tx(hash, service(77, params_port), 4);
        harness.connect(vec![revive]);
        let list = harness.tip_list();
        let mn = list.get_mn(&hash).unwrap();
        assert!(!mn.state.is_pose_banned());
        assert_eq!(mn.state.pose_revived_height, 2);
        assert_eq!(mn.state.service_address, service(77, params_port));
    }

    #[test]
    fn revocation_bans_and_records_reason() {
        let mut harness = Harness::new();
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let hash = pro_tx_hash_of(&reg);
        harness.connect(vec![reg]);

        harness.connect(vec![pro_up_rev_tx(hash, REASON_TERMINATION_OF_SERVICE, 5)]);
        let mn = harness.tip_list().get_mn(&hash).unwrap().clone();
        assert!(mn.state.is_pose_banned());
        assert_eq!(mn.state.revocation_reason, REASON_TERMINATION_OF_SERVICE);
        assert!(mn.state.operator_public_key.is_null());
    }

    #[test]
    fn confirmation_after_min_depth() {
        let mut harness = Harness::new();
        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let hash = pro_tx_hash_of(&reg);
        harness.connect(vec![reg]);

        let min_conf = harness.manager.params().masternode_min_confirmations;
        // registered at height 0; confirmation triggers once the previous
        // block is at least min_conf past it
        for _ in 0..min_conf {
            harness.connect(vec![]);
            assert!(!harness.tip_list().get_mn(&hash).unwrap().state.is_confirmed());
        }
        harness.connect(vec![]);
        let mn = harness.tip_list().get_mn(&hash).unwrap().clone();
        assert!(mn.state.is_confirmed());
    }

    #[test]
    fn undo_restores_previous_list() {
        let mut harness = Harness::new();
        let reg_a = pro_reg_tx(harness.manager.params(), 1, None);
        harness.connect(vec![reg_a]);
        let before = harness.tip_list();

        let reg_b = pro_reg_tx(harness.manager.params(), 2, None);
        harness.connect(vec![reg_b]);
        assert_eq!(harness.tip_list().all_mns_count(), 2);

        harness.disconnect();
        let after = harness.tip_list();
        assert_eq!(after, before);
    }

    #[test]
    fn historical_lists_are_reconstructed() {
        let mut harness = Harness::new();
        let reg_a = pro_reg_tx(harness.manager.params(), 1, None);
        let first = harness.connect(vec![reg_a]);

        let reg_b = pro_reg_tx(harness.manager.params(), 2, None);
        harness.connect(vec![reg_b]);
        harness.connect(vec![]);

        let historical = harness.manager.get_list_for_block(Some(&first)).unwrap();
        assert_eq!(historical.height(), 0);
        assert_eq!(historical.all_mns_count(), 1);
    }

    #[test]
    fn missing_diff_on_undo_is_fatal() {
        let harness = Harness::new();
        let orphan = extend_chain(None);
        assert_matches!(
            harness.manager.undo_block(&orphan),
            Err(InternalError::MissingListData { .. })
        );
    }

    #[test]
    fn listener_sees_connect_and_undo() {
        struct Recorder(std::sync::Mutex<Vec<bool>>);
        impl MasternodeListListener for std::sync::Arc<Recorder> {
            fn on_masternode_list_changed(
                &self,
                undone: bool,
                _old_list: &MasternodeList,
                _diff: &MasternodeListDiff,
            ) {
                self.0.lock().unwrap().push(undone);
            }
        }

        let recorder = std::sync::Arc::new(Recorder(std::sync::Mutex::new(Vec::new())));
        let mut harness = Harness::new();
        harness.manager.add_listener(Box::new(std::sync::Arc::clone(&recorder)));

        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        harness.connect(vec![reg]);
        harness.disconnect();

        assert_eq!(*recorder.0.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn best_block_marker_follows_the_tip() {
        let mut harness = Harness::new();
        harness.manager.verify_best_block(None).unwrap();

        let reg = pro_reg_tx(harness.manager.params(), 1, None);
        let first = harness.connect(vec![reg]);
        harness.manager.verify_best_block(Some(&first)).unwrap();
        assert_matches!(
            harness.manager.verify_best_block(None),
            Err(InternalError::StoreOutOfSync { stored: Some(_), expected: None })
        );

        harness.disconnect();
        harness.manager.verify_best_block(None).unwrap();
    }

    #[test]
    fn empty_blocks_on_empty_list_write_no_changes() {
        let mut harness = Harness::new();
        harness.connect(vec![]);
        harness.connect(vec![]);
        let list = harness.tip_list();
        assert_eq!(list.all_mns_count(), 0);
        assert_eq!(list.height(), 1);
    }
}
