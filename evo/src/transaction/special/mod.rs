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

//! Special transactions.
//!
//! Typed transactions append an extra payload after the classic transaction
//! fields. Four provider payload kinds exist, one per way of mutating the
//! deterministic masternode list:
//!
//! 1. provider registration (type 1)
//! 2. provider update service (type 2)
//! 3. provider update registrar (type 3)
//! 4. provider update revocation (type 4)
//!
//! Each payload signs a hash of itself with its own signature fields
//! excluded; [`SpecialTransactionBasePayloadEncodable`] captures that
//! "everything but the signature" encoding.

pub mod provider_registration;
pub mod provider_update_registrar;
pub mod provider_update_revocation;
pub mod provider_update_service;

use std::fmt;
use std::io::{self, Write};

use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::SpecialTransactionPayloadHash;
pub use crate::transaction::special::provider_registration::ProviderRegistrationPayload;
pub use crate::transaction::special::provider_update_registrar::ProviderUpdateRegistrarPayload;
pub use crate::transaction::special::provider_update_revocation::ProviderUpdateRevocationPayload;
pub use crate::transaction::special::provider_update_service::ProviderUpdateServicePayload;

/// The maximum allowed size, in bytes, of a serialized extra payload.
pub const MAX_SPECIALTX_EXTRAPAYLOAD: usize = 10000;

/// An enum wrapper around the various special transaction payloads.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TransactionPayload {
    /// A provider registration payload, used to register a masternode.
    ProviderRegistrationPayloadType(ProviderRegistrationPayload),
    /// A provider update service payload, used by the operator.
    ProviderUpdateServicePayloadType(ProviderUpdateServicePayload),
    /// A provider update registrar payload, used by the owner.
    ProviderUpdateRegistrarPayloadType(ProviderUpdateRegistrarPayload),
    /// A provider update revocation payload, used by the operator to revoke.
    ProviderUpdateRevocationPayloadType(ProviderUpdateRevocationPayload),
}

impl Encodable for TransactionPayload {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        match self {
            TransactionPayload::ProviderRegistrationPayloadType(p) => p.consensus_encode(writer),
            TransactionPayload::ProviderUpdateServicePayloadType(p) => p.consensus_encode(writer),
            TransactionPayload::ProviderUpdateRegistrarPayloadType(p) => {
                p.consensus_encode(writer)
            }
            TransactionPayload::ProviderUpdateRevocationPayloadType(p) => {
                p.consensus_encode(writer)
            }
        }
    }
}

impl TransactionPayload {
    /// The type tag matching this payload kind.
    pub fn get_type(&self) -> TransactionType {
        match self {
            TransactionPayload::ProviderRegistrationPayloadType(_) => {
                TransactionType::ProviderRegistration
            }
            TransactionPayload::ProviderUpdateServicePayloadType(_) => {
                TransactionType::ProviderUpdateService
            }
            TransactionPayload::ProviderUpdateRegistrarPayloadType(_) => {
                TransactionType::ProviderUpdateRegistrar
            }
            TransactionPayload::ProviderUpdateRevocationPayloadType(_) => {
                TransactionType::ProviderUpdateRevocation
            }
        }
    }

    /// Decodes a payload of the kind announced by `tx_type`, requiring the
    /// raw bytes to be consumed exactly.
    pub fn decode_for_type(
        tx_type: TransactionType,
        raw: &[u8],
    ) -> Result<TransactionPayload, encode::Error> {
        match tx_type {
            TransactionType::Classic => {
                Err(encode::Error::ParseFailed("classic transactions carry no payload"))
            }
            TransactionType::ProviderRegistration => {
                Ok(TransactionPayload::ProviderRegistrationPayloadType(
                    encode::deserialize(raw)?,
                ))
            }
            TransactionType::ProviderUpdateService => {
                Ok(TransactionPayload::ProviderUpdateServicePayloadType(
                    encode::deserialize(raw)?,
                ))
            }
            TransactionType::ProviderUpdateRegistrar => {
                Ok(TransactionPayload::ProviderUpdateRegistrarPayloadType(
                    encode::deserialize(raw)?,
                ))
            }
            TransactionType::ProviderUpdateRevocation => {
                Ok(TransactionPayload::ProviderUpdateRevocationPayloadType(
                    encode::deserialize(raw)?,
                ))
            }
        }
    }

    /// Converts into a provider registration payload.
    pub fn to_provider_registration_payload(
        self,
    ) -> Result<ProviderRegistrationPayload, encode::Error> {
        if let TransactionPayload::ProviderRegistrationPayloadType(payload) = self {
            Ok(payload)
        } else {
            Err(encode::Error::WrongSpecialTransactionPayloadConversion {
                expected: "ProviderRegistration",
                actual: self.get_type().name(),
            })
        }
    }

    /// Converts into a provider update service payload.
    pub fn to_update_service_payload(
        self,
    ) -> Result<ProviderUpdateServicePayload, encode::Error> {
        if let TransactionPayload::ProviderUpdateServicePayloadType(payload) = self {
            Ok(payload)
        } else {
            Err(encode::Error::WrongSpecialTransactionPayloadConversion {
                expected: "ProviderUpdateService",
                actual: self.get_type().name(),
            })
        }
    }

    /// Converts into a provider update registrar payload.
    pub fn to_update_registrar_payload(
        self,
    ) -> Result<ProviderUpdateRegistrarPayload, encode::Error> {
        if let TransactionPayload::ProviderUpdateRegistrarPayloadType(payload) = self {
            Ok(payload)
        } else {
            Err(encode::Error::WrongSpecialTransactionPayloadConversion {
                expected: "ProviderUpdateRegistrar",
                actual: self.get_type().name(),
            })
        }
    }

    /// Converts into a provider update revocation payload.
    pub fn to_update_revocation_payload(
        self,
    ) -> Result<ProviderUpdateRevocationPayload, encode::Error> {
        if let TransactionPayload::ProviderUpdateRevocationPayloadType(payload) = self {
            Ok(payload)
        } else {
            Err(encode::Error::WrongSpecialTransactionPayloadConversion {
                expected: "ProviderUpdateRevocation",
                actual: self.get_type().name(),
            })
        }
    }
}

/// The type tag of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u16)]
pub enum TransactionType {
    /// An ordinary transaction, no extra payload allowed.
    Classic = 0,
    /// Registers a masternode.
    ProviderRegistration = 1,
    /// Operator update of service address and operator payout.
    ProviderUpdateService = 2,
    /// Owner update of operator key, voting key and payout.
    ProviderUpdateRegistrar = 3,
    /// Operator self-revocation.
    ProviderUpdateRevocation = 4,
}

impl TransactionType {
    /// A short stable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TransactionType::Classic => "Classic",
            TransactionType::ProviderRegistration => "ProviderRegistration",
            TransactionType::ProviderUpdateService => "ProviderUpdateService",
            TransactionType::ProviderUpdateRegistrar => "ProviderUpdateRegistrar",
            TransactionType::ProviderUpdateRevocation => "ProviderUpdateRevocation",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u16> for TransactionType {
    type Error = encode::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransactionType::Classic),
            1 => Ok(TransactionType::ProviderRegistration),
            2 => Ok(TransactionType::ProviderUpdateService),
            3 => Ok(TransactionType::ProviderUpdateRegistrar),
            4 => Ok(TransactionType::ProviderUpdateRevocation),
            other => Err(encode::Error::UnknownSpecialTransactionType(other)),
        }
    }
}

impl Encodable for TransactionType {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        (*self as u16).consensus_encode(writer)
    }
}

impl Decodable for TransactionType {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        TransactionType::try_from(u16::consensus_decode(reader)?)
    }
}

/// The part of a special transaction payload that its signature commits to.
///
/// Implementors encode every payload field except the trailing signature;
/// the resulting double-SHA256 is the message presented to the signer.
pub trait SpecialTransactionBasePayloadEncodable {
    /// Encodes the payload with the signature fields skipped.
    fn base_payload_data_encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, io::Error>;

    /// Hashes the signature-free payload encoding.
    fn base_payload_hash(&self) -> SpecialTransactionPayloadHash {
        use crate::hashes::Hash;
        let mut engine = SpecialTransactionPayloadHash::engine();
        self.base_payload_data_encode(&mut engine).expect("engines don't error");
        SpecialTransactionPayloadHash::from_engine(engine)
    }
}
