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

//! BLS signature utilities.
//!
//! Raw-byte containers for BLS public keys and signatures as they appear on
//! the wire. Curve arithmetic is not performed here; cryptographic
//! verification is delegated to the host through [`crate::signer::BlsVerifier`].

use std::fmt;
use std::io;

use crate::consensus::{Decodable, Encodable, encode};

/// A compressed BLS public key, 48 bytes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BLSPublicKey([u8; 48]);

/// A compressed BLS signature, 96 bytes on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BLSSignature([u8; 96]);

impl BLSPublicKey {
    /// The all-zero key, used as the "unset" sentinel.
    pub fn null() -> Self {
        BLSPublicKey([0u8; 48])
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 48]
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 48] {
        &self.0
    }
}

impl BLSSignature {
    /// The all-zero signature, used as the "unset" sentinel.
    pub fn null() -> Self {
        BLSSignature([0u8; 96])
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 96]
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 96] {
        &self.0
    }
}

impl From<[u8; 48]> for BLSPublicKey {
    fn from(bytes: [u8; 48]) -> Self {
        BLSPublicKey(bytes)
    }
}

impl From<[u8; 96]> for BLSSignature {
    fn from(bytes: [u8; 96]) -> Self {
        BLSSignature(bytes)
    }
}

impl Default for BLSPublicKey {
    fn default() -> Self {
        BLSPublicKey::null()
    }
}

impl Default for BLSSignature {
    fn default() -> Self {
        BLSSignature::null()
    }
}

impl fmt::Display for BLSPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BLSPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BLSPublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for BLSSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BLSSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BLSSignature({})", hex::encode(self.0))
    }
}

impl Encodable for BLSPublicKey {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for BLSPublicKey {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        Ok(BLSPublicKey(<[u8; 48]>::consensus_decode(reader)?))
    }
}

impl Encodable for BLSSignature {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for BLSSignature {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        Ok(BLSSignature(<[u8; 96]>::consensus_decode(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::consensus::{deserialize, serialize};

    use super::*;

    #[test]
    fn null_sentinels() {
        assert!(BLSPublicKey::null().is_null());
        assert!(BLSSignature::null().is_null());
        let mut bytes = [0u8; 48];
        bytes[47] = 1;
        assert!(!BLSPublicKey::from(bytes).is_null());
    }

    #[test]
    fn consensus_roundtrip() {
        let mut bytes = [0u8; 48];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let key = BLSPublicKey::from(bytes);
        let encoded = serialize(&key);
        assert_eq!(encoded.len(), 48);
        let decoded: BLSPublicKey = deserialize(&encoded).unwrap();
        assert_eq!(decoded, key);
    }
}
