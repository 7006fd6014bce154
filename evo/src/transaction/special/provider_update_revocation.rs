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

//! Provider update revocation special transaction (type 4).
//!
//! Issued by the operator to take a masternode out of service, for example
//! after a key compromise. The masternode stays banned until the owner
//! names a new operator and that operator announces a service address.

use std::io::{self, Write};

use crate::bls_sig_utils::BLSSignature;
use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::{InputsHash, ProTxHash};
use crate::hashes::Hash;
use crate::transaction::special::SpecialTransactionBasePayloadEncodable;

/// The payload version this code produces and accepts.
pub const PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION: u16 = 1;

/// No particular reason given.
pub const REASON_NOT_SPECIFIED: u16 = 0;
/// The operator is terminating service.
pub const REASON_TERMINATION_OF_SERVICE: u16 = 1;
/// The operator key was compromised.
pub const REASON_COMPROMISED_KEYS: u16 = 2;
/// The operator key is being rotated.
pub const REASON_CHANGE_OF_KEYS: u16 = 3;
/// The highest defined revocation reason.
pub const REASON_LAST: u16 = REASON_CHANGE_OF_KEYS;

/// A provider update revocation payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProviderUpdateRevocationPayload {
    /// The payload format version.
    pub version: u16,
    /// The registration transaction of the masternode being revoked.
    pub pro_tx_hash: ProTxHash,
    /// The stated reason, one of the `REASON_*` constants.
    pub reason: u16,
    /// Hash of all outpoints of the enclosing transaction's inputs.
    pub inputs_hash: InputsHash,
    /// BLS signature by the masternode's current operator key.
    pub signature: BLSSignature,
}

impl Default for ProviderUpdateRevocationPayload {
    fn default() -> Self {
        ProviderUpdateRevocationPayload {
            version: PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION,
            pro_tx_hash: ProTxHash::all_zeros(),
            reason: REASON_NOT_SPECIFIED,
            inputs_hash: InputsHash::all_zeros(),
            signature: BLSSignature::null(),
        }
    }
}

impl SpecialTransactionBasePayloadEncodable for ProviderUpdateRevocationPayload {
    fn base_payload_data_encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.pro_tx_hash.consensus_encode(writer)?;
        len += self.reason.consensus_encode(writer)?;
        len += self.inputs_hash.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Encodable for ProviderUpdateRevocationPayload {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.base_payload_data_encode(writer)?;
        len += self.signature.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for ProviderUpdateRevocationPayload {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let pro_tx_hash = ProTxHash::consensus_decode(reader)?;
        let reason = u16::consensus_decode(reader)?;
        let inputs_hash = InputsHash::consensus_decode(reader)?;
        let signature = BLSSignature::consensus_decode(reader)?;
        Ok(ProviderUpdateRevocationPayload {
            version,
            pro_tx_hash,
            reason,
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
        let payload = ProviderUpdateRevocationPayload {
            pro_tx_hash: ProTxHash::from_byte_array([0x21; 32]),
            reason: REASON_COMPROMISED_KEYS,
            signature: BLSSignature::from([0x43; 96]),
            ..Default::default()
        };
        let decoded: ProviderUpdateRevocationPayload =
            deserialize(&serialize(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn signature_excluded_from_base_hash() {
        let unsigned = ProviderUpdateRevocationPayload::default();
        let mut signed = unsigned.clone();
        signed.signature = BLSSignature::from([0x01; 96]);
        assert_eq!(unsigned.base_payload_hash(), signed.base_payload_hash());
    }
}
