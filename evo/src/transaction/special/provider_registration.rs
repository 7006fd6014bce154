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

//! Provider registration special transaction (type 1).
//!
//! Registers a masternode: it names the locked collateral, the three keys
//! (owner, operator, voting), the service address and the payout scripts.
//! When the collateral is an output of another transaction, the payload
//! carries a signature made with the key the collateral pays to; the string
//! that key signs is produced by [`ProviderRegistrationPayload::make_sign_string`].

use std::io::{self, Write};

use crate::address::ServiceAddress;
use crate::bls_sig_utils::BLSPublicKey;
use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::{InputsHash, PubkeyHash};
use crate::hashes::Hash;
use crate::params::Params;
use crate::script::ScriptBuf;
use crate::transaction::OutPoint;
use crate::transaction::special::SpecialTransactionBasePayloadEncodable;

/// The payload version this code produces and accepts.
pub const PROVIDER_REGISTRATION_PAYLOAD_VERSION: u16 = 1;

/// The only provider type currently defined.
pub const PROVIDER_TYPE_REGULAR: u16 = 0;

/// Operator reward shares are expressed in hundredths of a percent, so the
/// whole block reward is 10000 shares.
pub const OPERATOR_REWARD_SHARES: u16 = 10000;

/// A provider registration payload.
///
/// Field order is fixed by consensus; the trailing signature is excluded
/// from the base payload hash.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProviderRegistrationPayload {
    /// The payload format version.
    pub version: u16,
    /// The masternode type. Only [`PROVIDER_TYPE_REGULAR`] exists.
    pub provider_type: u16,
    /// The masternode mode. Must currently be zero.
    pub provider_mode: u16,
    /// The collateral being locked. A null transaction hash means the
    /// collateral is an output of the registration transaction itself, at
    /// the given index.
    pub collateral_outpoint: OutPoint,
    /// The address the masternode serves on. May be null, in which case the
    /// masternode starts out PoSe-banned.
    pub service_address: ServiceAddress,
    /// Hash of the owner's key.
    pub owner_key_hash: PubkeyHash,
    /// The operator's BLS public key.
    pub operator_public_key: BLSPublicKey,
    /// Hash of the voting key.
    pub voting_key_hash: PubkeyHash,
    /// The script the masternode share of block rewards is paid to.
    pub script_payout: ScriptBuf,
    /// The operator's share of the reward, in hundredths of a percent.
    pub operator_reward: u16,
    /// The script the operator share is paid to. Empty when the operator
    /// reward is zero or the operator has not chosen a destination yet.
    pub script_operator_payout: ScriptBuf,
    /// Hash of all outpoints of the enclosing transaction's inputs.
    pub inputs_hash: InputsHash,
    /// Signature by the key the external collateral pays to. Empty when the
    /// collateral is internal.
    pub signature: Vec<u8>,
}

impl ProviderRegistrationPayload {
    /// Whether the collateral is an output of the registration transaction
    /// itself.
    pub fn has_internal_collateral(&self) -> bool {
        self.collateral_outpoint.has_null_txid()
    }

    /// The string an external collateral holder signs to prove consent.
    ///
    /// Format: payout script hex, operator reward, owner address, voting
    /// address and the base payload hash, joined by `|`.
    pub fn make_sign_string(&self, params: &Params) -> String {
        let payout = hex::encode(self.script_payout.as_bytes());
        let owner = params.encode_p2pkh_address(&self.owner_key_hash);
        let voting = params.encode_p2pkh_address(&self.voting_key_hash);
        format!(
            "{}|{}|{}|{}|{}",
            payout,
            self.operator_reward,
            owner,
            voting,
            self.base_payload_hash()
        )
    }
}

impl Default for ProviderRegistrationPayload {
    fn default() -> Self {
        ProviderRegistrationPayload {
            version: PROVIDER_REGISTRATION_PAYLOAD_VERSION,
            provider_type: PROVIDER_TYPE_REGULAR,
            provider_mode: 0,
            collateral_outpoint: OutPoint::null(),
            service_address: ServiceAddress::null(),
            owner_key_hash: PubkeyHash::all_zeros(),
            operator_public_key: BLSPublicKey::null(),
            voting_key_hash: PubkeyHash::all_zeros(),
            script_payout: ScriptBuf::new(),
            operator_reward: 0,
            script_operator_payout: ScriptBuf::new(),
            inputs_hash: InputsHash::all_zeros(),
            signature: Vec::new(),
        }
    }
}

impl SpecialTransactionBasePayloadEncodable for ProviderRegistrationPayload {
    fn base_payload_data_encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.provider_type.consensus_encode(writer)?;
        len += self.provider_mode.consensus_encode(writer)?;
        len += self.collateral_outpoint.consensus_encode(writer)?;
        len += self.service_address.consensus_encode(writer)?;
        len += self.owner_key_hash.consensus_encode(writer)?;
        len += self.operator_public_key.consensus_encode(writer)?;
        len += self.voting_key_hash.consensus_encode(writer)?;
        len += self.script_payout.consensus_encode(writer)?;
        len += self.operator_reward.consensus_encode(writer)?;
        len += self.script_operator_payout.consensus_encode(writer)?;
        len += self.inputs_hash.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Encodable for ProviderRegistrationPayload {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.base_payload_data_encode(writer)?;
        len += self.signature.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for ProviderRegistrationPayload {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let provider_type = u16::consensus_decode(reader)?;
        let provider_mode = u16::consensus_decode(reader)?;
        let collateral_outpoint = OutPoint::consensus_decode(reader)?;
        let service_address = ServiceAddress::consensus_decode(reader)?;
        let owner_key_hash = PubkeyHash::consensus_decode(reader)?;
        let operator_public_key = BLSPublicKey::consensus_decode(reader)?;
        let voting_key_hash = PubkeyHash::consensus_decode(reader)?;
        let script_payout = ScriptBuf::consensus_decode(reader)?;
        let operator_reward = u16::consensus_decode(reader)?;
        let script_operator_payout = ScriptBuf::consensus_decode(reader)?;
        let inputs_hash = InputsHash::consensus_decode(reader)?;
        let signature = Vec::<u8>::consensus_decode(reader)?;
        Ok(ProviderRegistrationPayload {
            version,
            provider_type,
            provider_mode,
            collateral_outpoint,
            service_address,
            owner_key_hash,
            operator_public_key,
            voting_key_hash,
            script_payout,
            operator_reward,
            script_operator_payout,
            inputs_hash,
            signature,
        })
    }
}
