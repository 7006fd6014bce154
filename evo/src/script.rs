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

//! Output scripts.
//!
//! Payout destinations in provider payloads are restricted to
//! pay-to-pubkey-hash, so this module only knows how to build and recognize
//! that template. Script execution belongs to the host chain.

use std::fmt;
use std::io::{self, Write};

use crate::consensus::{Decodable, Encodable, encode};
use crate::hash_types::PubkeyHash;
use crate::hashes::Hash;

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xA9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xAC;
const OP_PUSHBYTES_20: u8 = 0x14;

/// An owned output script.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptBuf(Vec<u8>);

impl ScriptBuf {
    /// Creates a new empty script.
    pub const fn new() -> Self {
        ScriptBuf(Vec::new())
    }

    /// Creates a script from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ScriptBuf(bytes)
    }

    /// Generates a pay-to-pubkey-hash script locking to the given key hash.
    pub fn new_p2pkh(pubkey_hash: &PubkeyHash) -> Self {
        let mut script = Vec::with_capacity(25);
        script.push(OP_DUP);
        script.push(OP_HASH160);
        script.push(OP_PUSHBYTES_20);
        script.extend_from_slice(&pubkey_hash.to_byte_array());
        script.push(OP_EQUALVERIFY);
        script.push(OP_CHECKSIG);
        ScriptBuf(script)
    }

    /// Whether the script is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the raw script bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the script matches the pay-to-pubkey-hash template.
    pub fn is_p2pkh(&self) -> bool {
        self.0.len() == 25
            && self.0[0] == OP_DUP
            && self.0[1] == OP_HASH160
            && self.0[2] == OP_PUSHBYTES_20
            && self.0[23] == OP_EQUALVERIFY
            && self.0[24] == OP_CHECKSIG
    }

    /// Extracts the key hash from a pay-to-pubkey-hash script.
    pub fn p2pkh_pubkey_hash(&self) -> Option<PubkeyHash> {
        if !self.is_p2pkh() {
            return None;
        }
        let bytes: [u8; 20] = self.0[3..23].try_into().expect("fixed 20-byte slice");
        Some(PubkeyHash::from_byte_array(bytes))
    }
}

impl fmt::Display for ScriptBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for ScriptBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

impl Encodable for ScriptBuf {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for ScriptBuf {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        Ok(ScriptBuf(Vec::<u8>::consensus_decode(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p2pkh_template() {
        let pubkey_hash = PubkeyHash::from_byte_array([0x42; 20]);
        let script = ScriptBuf::new_p2pkh(&pubkey_hash);
        assert_eq!(script.len(), 25);
        assert!(script.is_p2pkh());
        assert_eq!(script.p2pkh_pubkey_hash(), Some(pubkey_hash));
    }

    #[test]
    fn non_p2pkh_rejected() {
        assert!(!ScriptBuf::new().is_p2pkh());
        assert!(ScriptBuf::from_bytes(vec![0x51]).p2pkh_pubkey_hash().is_none());
        // P2SH-looking script
        let mut p2sh = vec![0xA9, 0x14];
        p2sh.extend_from_slice(&[0u8; 20]);
        p2sh.push(0x87);
        assert!(!ScriptBuf::from_bytes(p2sh).is_p2pkh());
    }
}
