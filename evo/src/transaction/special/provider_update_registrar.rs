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

//! Provider update registrar special transaction (type 3).
//!
//! Issued by the owner to rotate the operator key, the voting key or the
//! payout script. Changing the operator key resets the operator-controlled
//! fields and PoSe-bans the masternode until the new operator announces a
//! service address.

use std::io::{self, Write};

use crate::bls_sig_utils::BLSPublicKey;
use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::{InputsHash, ProTxHash, PubkeyHash};
use crate::hashes::Hash;
use crate::script::ScriptBuf;
use crate::transaction::special::SpecialTransactionBasePayloadEncodable;

/// The payload version this code produces and accepts.
pub const PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION: u16 = 1;

/// A provider update registrar payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProviderUpdateRegistrarPayload {
    /// The payload format version.
    pub version: u16,
    /// The registration transaction of the masternode being updated.
    pub pro_tx_hash: ProTxHash,
    /// The masternode mode. Must currently be zero.
    pub provider_mode: u16,
    /// The (possibly new) operator BLS public key.
    pub operator_public_key: BLSPublicKey,
    /// The (possibly new) voting key hash.
    pub voting_key_hash: PubkeyHash,
    /// The (possibly new) payout script.
    pub script_payout: ScriptBuf,
    /// Hash of all outpoints of the enclosing transaction's inputs.
    pub inputs_hash: InputsHash,
    /// Signature by the masternode's owner key over the base payload hash.
    pub signature: Vec<u8>,
}

impl Default for ProviderUpdateRegistrarPayload {
    fn default() -> Self {
        ProviderUpdateRegistrarPayload {
            version: PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION,
            pro_tx_hash: ProTxHash::all_zeros(),
            provider_mode: 0,
            operator_public_key: BLSPublicKey::null(),
            voting_key_hash: PubkeyHash::all_zeros(),
            script_payout: ScriptBuf::new(),
            inputs_hash: InputsHash::all_zeros(),
            signature: Vec::new(),
        }
    }
}

impl SpecialTransactionBasePayloadEncodable for ProviderUpdateRegistrarPayload {
    fn base_payload_data_encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.pro_tx_hash.consensus_encode(writer)?;
        len += self.provider_mode.consensus_encode(writer)?;
        len += self.operator_public_key.consensus_encode(writer)?;
        len += self.voting_key_hash.consensus_encode(writer)?;
        len += self.script_payout.consensus_encode(writer)?;
        len += self.inputs_hash.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Encodable for ProviderUpdateRegistrarPayload {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.base_payload_data_encode(writer)?;
        len += self.signature.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for ProviderUpdateRegistrarPayload {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let pro_tx_hash = ProTxHash::consensus_decode(reader)?;
        let provider_mode = u16::consensus_decode(reader)?;
        let operator_public_key = BLSPublicKey::consensus_decode(reader)?;
        let voting_key_hash = PubkeyHash::consensus_decode(reader)?;
        let script_payout = ScriptBuf::consensus_decode(reader)?;
        let inputs_hash = InputsHash::consensus_decode(reader)?;
        let signature = Vec::<u8>::consensus_decode(reader)?;
        Ok(ProviderUpdateRegistrarPayload {
            version,
            pro_tx_hash,
            provider_mode,
            operator_public_key,
            voting_key_hash,
            script_payout,
            inputs_hash,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::consensus::{deserialize, serialize};

    use super::*;

    #[test]
    fn payload_roundtrip() {
        let payload = ProviderUpdateRegistrarPayload {
            pro_tx_hash: ProTxHash::from_byte_array([0x12; 32]),
            operator_public_key: BLSPublicKey::from([0x34; 48]),
            voting_key_hash: PubkeyHash::from_byte_array([0x56; 20]),
            script_payout: ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([0x78; 20])),
            signature: vec![0x9A; 65],
            ..Default::default()
        };
        let decoded: ProviderUpdateRegistrarPayload =
            deserialize(&serialize(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn signature_excluded_from_base_hash() {
        let unsigned = ProviderUpdateRegistrarPayload::default();
        let mut signed = unsigned.clone();
        signed.signature = vec![0xFF; 65];
        assert_eq!(unsigned.base_payload_hash(), signed.base_payload_hash());
    }
}
