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

//! Payment queue ordering.
//!
//! Every block pays the valid masternode that has waited longest. The
//! effective wait height of a masternode is its last payment; a revival
//! from a ban moves it to the back of the queue, and a masternode that was
//! never paid waits since registration.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::dmn::entry::DeterministicMasternode;
use crate::dmn::list::MasternodeList;

fn last_paid_effective_height(mn: &DeterministicMasternode) -> i32 {
    let mut height = mn.state.last_paid_height;
    if mn.state.pose_revived_height != -1 && mn.state.pose_revived_height > height {
        height = mn.state.pose_revived_height;
    } else if height == 0 {
        height = mn.state.registered_height;
    }
    height
}

fn compare_by_last_paid(a: &DeterministicMasternode, b: &DeterministicMasternode) -> Ordering {
    last_paid_effective_height(a)
        .cmp(&last_paid_effective_height(b))
        .then_with(|| a.pro_tx_hash.cmp(&b.pro_tx_hash))
}

impl MasternodeList {
    /// The masternode the next block pays, `None` on an empty list.
    pub fn get_mn_payee(&self) -> Option<&Arc<DeterministicMasternode>> {
        self.valid_masternodes().min_by(|a, b| compare_by_last_paid(a, b))
    }

    /// The projected payees of the next `count` blocks, in payment order.
    /// Not a guarantee: bans between now and then reshuffle the queue.
    pub fn get_projected_mn_payees(&self, count: usize) -> Vec<Arc<DeterministicMasternode>> {
        let mut payees: Vec<Arc<DeterministicMasternode>> =
            self.valid_masternodes().cloned().collect();
        payees.sort_by(|a, b| compare_by_last_paid(a, b));
        payees.truncate(count);
        payees
    }
}

#[cfg(test)]
mod tests {
    use crate::dmn::list::tests::test_mn;
    use crate::hash_types::BlockHash;
    use crate::hashes::Hash;

    use super::*;

    fn list_with_paid_heights(heights: &[i32]) -> MasternodeList {
        let mut list = MasternodeList::new(BlockHash::all_zeros(), 100, 0);
        for (i, &paid) in heights.iter().enumerate() {
            let mn = test_mn(i as u8 + 1, i as u64);
            let mut state = (*mn.state).clone();
            state.last_paid_height = paid;
            let mut mn = (*mn).clone();
            mn.state = Arc::new(state);
            list.add_mn(Arc::new(mn), true).unwrap();
        }
        list
    }

    #[test]
    fn longest_unpaid_wins() {
        let list = list_with_paid_heights(&[50, 20, 90]);
        let payee = list.get_mn_payee().unwrap();
        assert_eq!(payee.pro_tx_hash, test_mn(2, 1).pro_tx_hash);

        let projected = list.get_projected_mn_payees(10);
        let heights: Vec<i32> = projected.iter().map(|mn| mn.state.last_paid_height).collect();
        assert_eq!(heights, vec![20, 50, 90]);
    }

    #[test]
    fn never_paid_waits_since_registration() {
        // registered at 10 (test_mn default), never paid
        let mut list = list_with_paid_heights(&[50]);
        let fresh = test_mn(9, 5);
        list.add_mn(fresh.clone(), true).unwrap();

        assert_eq!(list.get_mn_payee().unwrap().pro_tx_hash, fresh.pro_tx_hash);
    }

    #[test]
    fn revival_moves_to_back_of_queue() {
        let mut list = list_with_paid_heights(&[50, 20]);
        let second = test_mn(2, 1);
        let mut state = (*list.get_mn(&second.pro_tx_hash).unwrap().state).clone();
        state.pose_revived_height = 95;
        list.update_mn(&second.pro_tx_hash, Arc::new(state)).unwrap();

        // the revived node now waits since height 95, so the other wins
        assert_eq!(list.get_mn_payee().unwrap().pro_tx_hash, test_mn(1, 0).pro_tx_hash);
    }

    #[test]
    fn ties_break_by_registration_hash() {
        let list = list_with_paid_heights(&[40, 40, 40]);
        let projected = list.get_projected_mn_payees(3);
        let hashes: Vec<_> = projected.iter().map(|mn| mn.pro_tx_hash).collect();
        let mut sorted = hashes.clone();
        sorted.sort();
        assert_eq!(hashes, sorted);
    }

    #[test]
    fn banned_masternodes_are_skipped() {
        let mut list = list_with_paid_heights(&[50, 20]);
        let second = test_mn(2, 1);
        let mut state = (*list.get_mn(&second.pro_tx_hash).unwrap().state).clone();
        state.pose_ban_height = 99;
        list.update_mn(&second.pro_tx_hash, Arc::new(state)).unwrap();

        assert_eq!(list.get_mn_payee().unwrap().pro_tx_hash, test_mn(1, 0).pro_tx_hash);
        assert_eq!(list.get_projected_mn_payees(10).len(), 1);
    }
}
