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

//! End-to-end masternode lifecycle over the public API: registration,
//! confirmation, quorum participation, operator rotation, collateral
//! spends and reorgs.

use std::sync::Arc;

use evonode::chain::BlockIndex;
use evonode::dmn::manager::DeterministicMnManager;
use evonode::hash_types::{ProTxHash, QuorumModifierHash};
use evonode::hashes::Hash;
use evonode::store::MemoryEvoDb;
use evonode::test_utils::{
    AcceptAllSigners, MemoryCoins, block_with, extend_chain, operator_key, payout_key, pro_reg_tx,
    pro_tx_hash_of, pro_up_reg_tx, pro_up_serv_tx, service, spend_tx, test_params, voting_key,
};
use evonode::transaction::{OutPoint, Transaction};
use evonode::{MasternodeList, ProcessBlockError};

struct Node {
    manager: DeterministicMnManager<MemoryEvoDb>,
    coins: MemoryCoins,
    tip: Option<Arc<BlockIndex>>,
}

impl Node {
    fn new() -> Self {
        Node {
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

    fn mine_until_confirmed(&mut self, hashes: &[ProTxHash]) {
        let min_conf = self.manager.params().masternode_min_confirmations;
        for _ in 0..=min_conf {
            self.connect(vec![]);
        }
        let list = self.tip_list();
        for hash in hashes {
            assert!(list.get_mn(hash).unwrap().state.is_confirmed());
        }
    }
}

#[test]
fn full_lifecycle_with_quorums_and_rotation() {
    let mut node = Node::new();
    let params_port = node.manager.params().default_port;

    let regs: Vec<Transaction> =
        (1..=3).map(|seed| pro_reg_tx(node.manager.params(), seed, None)).collect();
    let hashes: Vec<ProTxHash> = regs.iter().map(pro_tx_hash_of).collect();
    node.connect(regs);
    assert_eq!(node.tip_list().all_mns_count(), 3);

    // no quorum before confirmation
    let modifier = QuorumModifierHash::hash(b"round-1");
    assert!(node.tip_list().calculate_quorum(3, &modifier).is_empty());

    node.mine_until_confirmed(&hashes);
    let quorum = node.tip_list().calculate_quorum(3, &modifier);
    assert_eq!(quorum.len(), 3);
    // selection is deterministic
    let again = node.tip_list().calculate_quorum(3, &modifier);
    assert_eq!(
        quorum.iter().map(|mn| mn.pro_tx_hash).collect::<Vec<_>>(),
        again.iter().map(|mn| mn.pro_tx_hash).collect::<Vec<_>>()
    );

    // rotating an operator bans the node and drops it from quorums
    let rotated = hashes[0];
    node.connect(vec![pro_up_reg_tx(rotated, operator_key(9), voting_key(1), payout_key(1), 10)]);
    let list = node.tip_list();
    assert!(list.get_mn(&rotated).unwrap().state.is_pose_banned());
    let quorum = list.calculate_quorum(3, &modifier);
    assert_eq!(quorum.len(), 2);
    assert!(quorum.iter().all(|mn| mn.pro_tx_hash != rotated));

    // the new operator revives it; the confirmation survives the rotation
    node.connect(vec![pro_up_serv_tx(rotated, service(99, params_port), 11)]);
    let list = node.tip_list();
    let revived = list.get_mn(&rotated).unwrap();
    assert!(!revived.state.is_pose_banned());
    assert!(revived.state.is_confirmed());
    assert_eq!(list.calculate_quorum(3, &modifier).len(), 3);
}

#[test]
fn reorg_restores_exact_state() {
    let mut node = Node::new();
    let reg_a = pro_reg_tx(node.manager.params(), 1, None);
    let reg_b = pro_reg_tx(node.manager.params(), 2, None);
    let collateral_b = OutPoint::new(reg_b.txid(), 0);
    node.connect(vec![reg_a, reg_b.clone()]);
    node.connect(vec![]);
    let before = node.tip_list();

    // a block that removes one masternode and pays the other
    node.connect(vec![spend_tx(&[collateral_b])]);
    let after = node.tip_list();
    assert_eq!(after.all_mns_count(), 1);
    assert_ne!(after, before);

    node.disconnect();
    assert_eq!(node.tip_list(), before);

    // reconnecting yields the same list again
    node.connect(vec![spend_tx(&[collateral_b])]);
    assert_eq!(node.tip_list().all_mns_count(), 1);
    assert_eq!(node.tip_list().total_registered_count(), 2);
}

#[test]
fn payee_removed_in_same_block_is_not_paid() {
    let mut node = Node::new();
    let reg_a = pro_reg_tx(node.manager.params(), 1, None);
    let reg_b = pro_reg_tx(node.manager.params(), 2, None);
    node.connect(vec![reg_a.clone(), reg_b.clone()]);

    let payee = node.tip_list().get_mn_payee().unwrap().clone();
    let other = if payee.pro_tx_hash == pro_tx_hash_of(&reg_a) {
        pro_tx_hash_of(&reg_b)
    } else {
        pro_tx_hash_of(&reg_a)
    };

    // spend the would-be payee's collateral in the very block that would
    // have paid it
    node.connect(vec![spend_tx(&[payee.collateral_outpoint])]);
    let list = node.tip_list();
    assert!(!list.contains_mn(&payee.pro_tx_hash));
    // the payment lapses rather than passing to the next in line
    assert_eq!(list.get_mn(&other).unwrap().state.last_paid_height, 0);
}

#[test]
fn projected_payees_rotate_through_the_list() {
    let mut node = Node::new();
    let regs: Vec<Transaction> =
        (1..=4).map(|seed| pro_reg_tx(node.manager.params(), seed, None)).collect();
    node.connect(regs);

    // four blocks pay four distinct masternodes
    let mut paid = Vec::new();
    for _ in 0..4 {
        let projected = node.tip_list().get_projected_mn_payees(1);
        node.connect(vec![]);
        let list = node.tip_list();
        let stamped = list.get_mn(&projected[0].pro_tx_hash).unwrap();
        assert_eq!(stamped.state.last_paid_height, list.height());
        paid.push(stamped.pro_tx_hash);
    }
    paid.sort();
    paid.dedup();
    assert_eq!(paid.len(), 4);
}
