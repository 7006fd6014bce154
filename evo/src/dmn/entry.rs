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

//! A single deterministic masternode entry.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use crate::consensus::{Decodable, Encodable, VarInt, encode};
use crate::dmn::state::MasternodeState;
use crate::hash_types::ProTxHash;
use crate::transaction::OutPoint;
use crate::transaction::special::provider_registration::OPERATOR_REWARD_SHARES;

/// An entry in the deterministic masternode list.
///
/// Identity fields are immutable for the life of the registration; only
/// the `state` pointer is swapped when a list applies an update.
#[derive(Clone, PartialEq, Eq)]
pub struct DeterministicMasternode {
    /// A small id unique within the list's history, assigned at
    /// registration and never reused. Diffs refer to masternodes by it.
    internal_id: u64,
    /// The hash of the registration transaction.
    pub pro_tx_hash: ProTxHash,
    /// The locked collateral backing the masternode.
    pub collateral_outpoint: OutPoint,
    /// The operator's share of rewards, in hundredths of a percent.
    pub operator_reward: u16,
    /// The mutable state, shared between list versions.
    pub state: Arc<MasternodeState>,
}

impl DeterministicMasternode {
    /// Creates a new entry.
    pub fn new(
        internal_id: u64,
        pro_tx_hash: ProTxHash,
        collateral_outpoint: OutPoint,
        operator_reward: u16,
        state: MasternodeState,
    ) -> Self {
        DeterministicMasternode {
            internal_id,
            pro_tx_hash,
            collateral_outpoint,
            operator_reward,
            state: Arc::new(state),
        }
    }

    /// The list-internal id of this masternode.
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// Splits `reward` between operator and owner, returning
    /// `(operator_part, owner_part)`. The operator part rounds down.
    pub fn split_reward(&self, reward: u64) -> (u64, u64) {
        let operator =
            (reward as u128 * self.operator_reward as u128 / OPERATOR_REWARD_SHARES as u128) as u64;
        (operator, reward - operator)
    }
}

impl fmt::Debug for DeterministicMasternode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeterministicMasternode(proTxHash={}, internalId={}, collateral={})",
            self.pro_tx_hash, self.internal_id, self.collateral_outpoint
        )
    }
}

impl Encodable for DeterministicMasternode {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.pro_tx_hash.consensus_encode(writer)?;
        len += VarInt(self.internal_id).consensus_encode(writer)?;
        len += self.collateral_outpoint.consensus_encode(writer)?;
        len += self.operator_reward.consensus_encode(writer)?;
        len += self.state.as_ref().consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for DeterministicMasternode {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let pro_tx_hash = ProTxHash::consensus_decode(reader)?;
        let internal_id = VarInt::consensus_decode(reader)?.0;
        let collateral_outpoint = OutPoint::consensus_decode(reader)?;
        let operator_reward = u16::consensus_decode(reader)?;
        let state = MasternodeState::consensus_decode(reader)?;
        Ok(DeterministicMasternode {
            internal_id,
            pro_tx_hash,
            collateral_outpoint,
            operator_reward,
            state: Arc::new(state),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::consensus::{deserialize, serialize};
    use crate::hash_types::Txid;
    use crate::hashes::Hash;

    use super::*;

    fn sample_mn(operator_reward: u16) -> DeterministicMasternode {
        DeterministicMasternode::new(
            3,
            ProTxHash::from_byte_array([0x10; 32]),
            OutPoint::new(Txid::from_byte_array([0x20; 32]), 1),
            operator_reward,
            MasternodeState::default(),
        )
    }

    #[test]
    fn entry_roundtrip() {
        let mn = sample_mn(250);
        let decoded: DeterministicMasternode = deserialize(&serialize(&mn)).unwrap();
        assert_eq!(decoded, mn);
        assert_eq!(decoded.internal_id(), 3);
    }

    #[test]
    fn reward_split_rounds_down() {
        // 5% of 70_000_000_000 units
        let mn = sample_mn(500);
        let (operator, owner) = mn.split_reward(70_000_000_000);
        assert_eq!(operator, 3_500_000_000);
        assert_eq!(owner, 66_500_000_000);

        // rounding goes to the owner
        let (operator, owner) = mn.split_reward(3);
        assert_eq!(operator, 0);
        assert_eq!(owner, 3);

        let zero = sample_mn(0);
        assert_eq!(zero.split_reward(1000), (0, 1000));

        let all = sample_mn(OPERATOR_REWARD_SHARES);
        assert_eq!(all.split_reward(1000), (1000, 0));
    }
}
