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

//! Provider update service special transaction (type 2).
//!
//! Issued by the operator to announce a new service address and,
//! optionally, a new operator payout script. A successful update also
//! revives a PoSe-banned masternode.

use std::io::{self, Write};

use crate::address::ServiceAddress;
use crate::bls_sig_utils::BLSSignature;
use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::{InputsHash, ProTxHash};
use crate::hashes::Hash;
use crate::script::ScriptBuf;
use crate::transaction::special::SpecialTransactionBasePayloadEncodable;

/// The payload version this code produces and accepts.
pub const PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION: u16 = 1;

/// A provider update service payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProviderUpdateServicePayload {
    /// The payload format version.
    pub version: u16,
    /// The registration transaction of the masternode being updated.
    pub pro_tx_hash: ProTxHash,
    /// The new service address.
    pub service_address: ServiceAddress,
    /// The new operator payout script. Must be empty when the masternode
    /// was registered with a zero operator reward.
    pub script_operator_payout: ScriptBuf,
    /// Hash of all outpoints of the enclosing transaction's inputs.
    pub inputs_hash: InputsHash,
    /// BLS signature by the masternode's current operator key.
    pub signature: BLSSignature,
}

impl Default for ProviderUpdateServicePayload {
    fn default() -> Self {
        ProviderUpdateServicePayload {
            version: PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION,
            pro_tx_hash: ProTxHash::all_zeros(),
            service_address: ServiceAddress::null(),
            script_operator_payout: ScriptBuf::new(),
            inputs_hash: InputsHash::all_zeros(),
            signature: BLSSignature::null(),
        }
    }
}

impl SpecialTransactionBasePayloadEncodable for ProviderUpdateServicePayload {
    fn base_payload_data_encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.pro_tx_hash.consensus_encode(writer)?;
        len += self.service_address.consensus_encode(writer)?;
        len += self.script_operator_payout.consensus_encode(writer)?;
        len += self.inputs_hash.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Encodable for ProviderUpdateServicePayload {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.base_payload_data_encode(writer)?;
        len += self.signature.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for ProviderUpdateServicePayload {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let pro_tx_hash = ProTxHash::consensus_decode(reader)?;
        let service_address = ServiceAddress::consensus_decode(reader)?;
        let script_operator_payout = ScriptBuf::consensus_decode(reader)?;
        let inputs_hash = InputsHash::consensus_decode(reader)?;
        let signature = BLSSignature::consensus_decode(reader)?;
        Ok(ProviderUpdateServicePayload {
            version,
            pro_tx_hash,
            service_address,
            script_operator_payout,
            inputs_hash,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use crate::consensus::{deserialize, serialize};

    use super::*;

    #[test]
    fn payload_roundtrip() {
        let payload = ProviderUpdateServicePayload {
            pro_tx_hash: ProTxHash::from_byte_array([0x77; 32]),
            service_address: ServiceAddress::new(Ipv4Addr::new(9, 8, 7, 6), 19999),
            signature: BLSSignature::from([0x55; 96]),
            ..Default::default()
        };
        let decoded: ProviderUpdateServicePayload =
            deserialize(&serialize(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn signature_excluded_from_base_hash() {
        let unsigned = ProviderUpdateServicePayload::default();
        let mut signed = unsigned.clone();
        signed.signature = BLSSignature::from([0x99; 96]);
        assert_eq!(unsigned.base_payload_hash(), signed.base_payload_hash());
    }
}
