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

//! Base58check encoding.
//!
//! Only encoding is provided; the crate renders destinations as legacy
//! addresses inside the collateral sign-string, it never parses them.

use crate::hash_types::PubkeyHash;
use crate::hashes::{Hash, sha256d};

static BASE58_CHARS: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encodes `data` as a base58 string.
pub fn encode_slice(data: &[u8]) -> String {
    // 11/15 is just over log_58(256)
    let mut scratch = vec![0u8; 1 + data.len() * 11 / 15];

    // Build in base 256, from the least significant digit up.
    for &d256 in data {
        let mut carry = d256 as u32;
        for d58 in scratch.iter_mut().rev() {
            carry += (*d58 as u32) << 8;
            *d58 = (carry % 58) as u8;
            carry /= 58;
        }
        debug_assert_eq!(carry, 0);
    }

    // Preserve leading zeroes as '1' characters.
    let leading_zeroes = data.iter().take_while(|&&b| b == 0).count();
    let leading_zero_digits = scratch.iter().take_while(|&&d| d == 0).count();

    let mut result = String::with_capacity(leading_zeroes + scratch.len());
    for _ in 0..leading_zeroes {
        result.push('1');
    }
    for &d in &scratch[leading_zero_digits..] {
        result.push(BASE58_CHARS[d as usize] as char);
    }
    result
}

/// Encodes `data` as a base58 string including the four-byte checksum.
pub fn check_encode_slice(data: &[u8]) -> String {
    let checksum = sha256d::Hash::hash(data);
    let mut payload = Vec::with_capacity(data.len() + 4);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum.to_byte_array()[..4]);
    encode_slice(&payload)
}

/// Renders a key hash as a legacy pay-to-pubkey-hash address under the given
/// network version byte.
pub fn encode_p2pkh_address(version: u8, pubkey_hash: &PubkeyHash) -> String {
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(&pubkey_hash.to_byte_array());
    check_encode_slice(&data)
}

#[cfg(test)]
mod tests {
    use hex_lit::hex;

    use super::*;

    #[test]
    fn encode_basic() {
        assert_eq!(encode_slice(&[0]), "1");
        assert_eq!(encode_slice(&[1]), "2");
        assert_eq!(encode_slice(&[58]), "21");
        assert_eq!(encode_slice(&[13, 36]), "211");
        assert_eq!(encode_slice(&[0, 13, 36]), "1211");
        assert_eq!(encode_slice(b"Hello World!"), "2NEpo7TZRRrLZSi2U");
    }

    #[test]
    fn check_encode_known_address() {
        // The well-known genesis P2PKH address.
        let hash = PubkeyHash::from_byte_array(hex!("62e907b15cbf27d5425399ebf6f0fb50ebb88f18"));
        assert_eq!(encode_p2pkh_address(0, &hash), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }
}
