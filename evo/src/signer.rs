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

//! Signature verification seams.
//!
//! The payload validators are generic over these traits so the host can
//! plug in its own ECDSA and BLS backends, and the tests can substitute
//! deterministic stand-ins.

use crate::bls_sig_utils::{BLSPublicKey, BLSSignature};
use crate::hash_types::{PubkeyHash, SpecialTransactionPayloadHash};

/// ECDSA verification against a key hash.
pub trait HashSigVerifier {
    /// Verifies `signature` over the payload hash, recovering or matching
    /// the signer against `key_hash`.
    fn verify_hash(
        &self,
        key_hash: &PubkeyHash,
        payload_hash: &SpecialTransactionPayloadHash,
        signature: &[u8],
    ) -> bool;

    /// Verifies a signed arbitrary message (the external collateral
    /// sign-string) against `key_hash`.
    fn verify_message(&self, key_hash: &PubkeyHash, message: &str, signature: &[u8]) -> bool;
}

/// BLS verification.
pub trait BlsVerifier {
    /// Whether `public_key` deserializes to a valid group element.
    fn is_valid_public_key(&self, public_key: &BLSPublicKey) -> bool;

    /// Verifies `signature` over the payload hash under `public_key`.
    fn verify(
        &self,
        public_key: &BLSPublicKey,
        payload_hash: &SpecialTransactionPayloadHash,
        signature: &BLSSignature,
    ) -> bool;
}
