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

//! Quorum selection.
//!
//! A quorum is the top slice of valid masternodes ranked by a per-node
//! score derived from a block-derived modifier. Only confirmed masternodes
//! participate: before confirmation the registration hash is attacker
//! chosen, and grinding it would let someone steer themselves into future
//! quorums.

use std::sync::Arc;

use crate::dmn::entry::DeterministicMasternode;
use crate::dmn::list::MasternodeList;
use crate::hash_types::{QuorumModifierHash, ScoreHash};

impl MasternodeList {
    /// Scores every confirmed, unbanned masternode under `modifier`.
    pub fn calculate_scores(
        &self,
        modifier: &QuorumModifierHash,
    ) -> Vec<(ScoreHash, Arc<DeterministicMasternode>)> {
        self.valid_masternodes()
            .filter(|mn| mn.state.is_confirmed())
            .map(|mn| {
                let score = ScoreHash::create_score(
                    mn.state.confirmed_hash_with_pro_reg_tx_hash,
                    *modifier,
                );
                (score, Arc::clone(mn))
            })
            .collect()
    }

    /// Selects a quorum of up to `max_size` members, deterministically
    /// sorted by descending score.
    pub fn calculate_quorum(
        &self,
        max_size: usize,
        modifier: &QuorumModifierHash,
    ) -> Vec<Arc<DeterministicMasternode>> {
        let mut scores = self.calculate_scores(modifier);
        scores.sort_by(|a, b| {
            b.0.cmp_as_uint256(&a.0)
                .then_with(|| a.1.collateral_outpoint.cmp(&b.1.collateral_outpoint))
        });
        scores.truncate(max_size);
        scores.into_iter().map(|(_, mn)| mn).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::dmn::list::tests::test_mn;
    use crate::hash_types::BlockHash;
    use crate::hashes::Hash;

    use super::*;

    fn confirmed_list(count: u8) -> MasternodeList {
        let mut list = MasternodeList::new(BlockHash::all_zeros(), 200, 0);
        for i in 0..count {
            let mn = test_mn(i + 1, i as u64);
            let mut state = (*mn.state).clone();
            state.update_confirmed_hash(&mn.pro_tx_hash, &BlockHash::from_byte_array([i + 1; 32]));
            let mut mn = (*mn).clone();
            mn.state = Arc::new(state);
            list.add_mn(Arc::new(mn), true).unwrap();
        }
        list
    }

    #[test]
    fn unconfirmed_masternodes_are_excluded() {
        let mut list = confirmed_list(3);
        list.add_mn(test_mn(9, 7), true).unwrap(); // never confirmed

        let modifier = QuorumModifierHash::hash(b"modifier");
        let quorum = list.calculate_quorum(10, &modifier);
        assert_eq!(quorum.len(), 3);
        assert!(quorum.iter().all(|mn| mn.state.is_confirmed()));
    }

    #[test]
    fn quorum_is_deterministic_and_score_sorted() {
        let list = confirmed_list(5);
        let modifier = QuorumModifierHash::hash(b"modifier");

        let quorum = list.calculate_quorum(3, &modifier);
        assert_eq!(quorum.len(), 3);
        assert_eq!(
            quorum.iter().map(|mn| mn.pro_tx_hash).collect::<Vec<_>>(),
            list.calculate_quorum(3, &modifier).iter().map(|mn| mn.pro_tx_hash).collect::<Vec<_>>()
        );

        // members really are the top-scored ones, in descending order
        let mut scores = list.calculate_scores(&modifier);
        scores.sort_by(|a, b| b.0.cmp_as_uint256(&a.0));
        let expected: Vec<_> = scores.iter().take(3).map(|(_, mn)| mn.pro_tx_hash).collect();
        assert_eq!(quorum.iter().map(|mn| mn.pro_tx_hash).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn different_modifiers_change_scores() {
        let list = confirmed_list(6);
        let scores_a = list.calculate_scores(&QuorumModifierHash::hash(b"a"));
        let scores_b = list.calculate_scores(&QuorumModifierHash::hash(b"b"));
        assert_eq!(scores_a.len(), scores_b.len());
        for ((sa, mn_a), (sb, mn_b)) in scores_a.iter().zip(scores_b.iter()) {
            assert_eq!(mn_a.pro_tx_hash, mn_b.pro_tx_hash);
            assert_ne!(sa, sb);
        }

        // full-size quorums carry the same membership either way
        let mut ah: Vec<_> = list
            .calculate_quorum(6, &QuorumModifierHash::hash(b"a"))
            .iter()
            .map(|mn| mn.pro_tx_hash)
            .collect();
        let mut bh: Vec<_> = list
            .calculate_quorum(6, &QuorumModifierHash::hash(b"b"))
            .iter()
            .map(|mn| mn.pro_tx_hash)
            .collect();
        ah.sort();
        bh.sort();
        assert_eq!(ah, bh);
    }

    #[test]
    fn banned_masternodes_are_excluded() {
        let mut list = confirmed_list(3);
        let target = test_mn(2, 1);
        let mut state = (*list.get_mn(&target.pro_tx_hash).unwrap().state).clone();
        state.pose_ban_height = 150;
        list.update_mn(&target.pro_tx_hash, Arc::new(state)).unwrap();

        let quorum = list.calculate_quorum(10, &QuorumModifierHash::hash(b"m"));
        assert_eq!(quorum.len(), 2);
        assert!(quorum.iter().all(|mn| mn.pro_tx_hash != target.pro_tx_hash));
    }
}
