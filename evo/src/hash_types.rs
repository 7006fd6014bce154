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

//! Hash types used across the crate.
//!
//! Every hash that carries consensus meaning gets its own newtype so the
//! compiler keeps block hashes, transaction ids and masternode identities
//! from being mixed up.

use crate::hashes::{Hash, hash160, hash_newtype, sha256, sha256d};

hash_newtype! {
    /// A transaction id, the double-SHA256 of the serialized transaction.
    pub struct Txid(sha256d::Hash);
    /// A block hash.
    pub struct BlockHash(sha256d::Hash);
    /// The hash of a provider registration transaction, which serves as the
    /// masternode's permanent identity.
    pub struct ProTxHash(sha256d::Hash);
    /// Double-SHA256 over all of a transaction's input outpoints. Provider
    /// payloads embed it to bind the payload to its carrying transaction.
    pub struct InputsHash(sha256d::Hash);
    /// Double-SHA256 of a provider payload with the signature fields skipped.
    /// This is the message that payload signatures commit to.
    pub struct SpecialTransactionPayloadHash(sha256d::Hash);
    /// Single SHA256 of `proTxHash || confirmedHash`, precalculated on the
    /// masternode state to speed up quorum calculations.
    pub struct ConfirmedHashWithProRegTxHash(sha256::Hash);
    /// Per-block entropy mixed into quorum scores.
    pub struct QuorumModifierHash(sha256d::Hash);
    /// A masternode's quorum placement score. A single SHA256, not a double.
    pub struct ScoreHash(sha256::Hash);
    /// RIPEMD160(SHA256) of a public key. Identifies owner and voting keys.
    pub struct PubkeyHash(hash160::Hash);
    /// Key of the unique-property index: the double-SHA256 of a
    /// consensus-encoded property value.
    pub struct UniquePropertyHash(sha256d::Hash);
}

impl_hashencode!(Txid);
impl_hashencode!(BlockHash);
impl_hashencode!(ProTxHash);
impl_hashencode!(InputsHash);
impl_hashencode!(SpecialTransactionPayloadHash);
impl_hashencode!(ConfirmedHashWithProRegTxHash);
impl_hashencode!(QuorumModifierHash);
impl_hashencode!(ScoreHash);
impl_hashencode!(PubkeyHash);
impl_hashencode!(UniquePropertyHash);

impl ConfirmedHashWithProRegTxHash {
    /// Hashes a masternode identity together with its confirmation block hash.
    pub fn from_confirmed(pro_tx_hash: ProTxHash, confirmed_hash: BlockHash) -> Self {
        ConfirmedHashWithProRegTxHash::hash(
            &[pro_tx_hash.to_byte_array(), confirmed_hash.to_byte_array()].concat(),
        )
    }
}

impl ScoreHash {
    /// Creates the score for quorum placement from the precalculated
    /// `confirmedHashWithProRegTxHash` and the per-block modifier.
    pub fn create_score(
        confirmed_hash_with_pro_reg_tx_hash: ConfirmedHashWithProRegTxHash,
        modifier: QuorumModifierHash,
    ) -> Self {
        ScoreHash::hash(
            &[
                confirmed_hash_with_pro_reg_tx_hash.to_byte_array(),
                modifier.to_byte_array(),
            ]
            .concat(),
        )
    }

    /// Compares two scores as 256-bit little-endian integers.
    ///
    /// Quorum ordering is defined on the numeric value of the score, whose
    /// byte representation is little-endian, so the comparison starts at the
    /// last byte.
    pub fn cmp_as_uint256(&self, other: &Self) -> std::cmp::Ordering {
        let a = self.to_byte_array();
        let b = other.to_byte_array();
        a.iter().rev().cmp(b.iter().rev())
    }
}
