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

//! Mutable masternode state and state diffs.
//!
//! [`MasternodeState`] holds every field a provider transaction or a block
//! event can change after registration. Lists store states behind `Arc`
//! and never mutate them in place: an update clones the state, changes
//! the clone and swaps the pointer, so old list versions stay intact.
//!
//! [`MasternodeStateDiff`] is the compact wire form used in per-block list
//! diffs: a field bitmask followed by only the changed fields.

use std::fmt;
use std::io::{self, Write};

use bitflags::bitflags;

use crate::address::ServiceAddress;
use crate::bls_sig_utils::BLSPublicKey;
use crate::consensus::{Decodable, Encodable, VarInt, encode};
use crate::hash_types::{BlockHash, ConfirmedHashWithProRegTxHash, ProTxHash, PubkeyHash};
use crate::hashes::Hash;
use crate::script::ScriptBuf;
use crate::transaction::special::ProviderRegistrationPayload;
use crate::transaction::special::provider_update_revocation::REASON_NOT_SPECIFIED;

/// The mutable state of a registered masternode.
///
/// Serialization order is consensus; it matches the field declaration
/// order below.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MasternodeState {
    /// Height of the block that registered the masternode, `-1` until
    /// applied.
    pub registered_height: i32,
    /// Height of the last block that paid this masternode, `0` if never
    /// paid.
    pub last_paid_height: i32,
    /// The accumulated proof-of-service penalty.
    pub pose_penalty: i32,
    /// Height of the last revival from a ban, `-1` if never revived.
    pub pose_revived_height: i32,
    /// Height the masternode was banned at, `-1` while not banned.
    pub pose_ban_height: i32,
    /// The reason of the last revocation.
    pub revocation_reason: u16,
    /// The hash of the block that confirmed the masternode, all-zero until
    /// confirmation.
    pub confirmed_hash: BlockHash,
    /// Single-SHA256 of the registration hash and the confirmed hash,
    /// cached for quorum score calculations.
    pub confirmed_hash_with_pro_reg_tx_hash: ConfirmedHashWithProRegTxHash,
    /// Hash of the owner's key.
    pub owner_key_hash: PubkeyHash,
    /// The operator's BLS public key.
    pub operator_public_key: BLSPublicKey,
    /// Hash of the voting key.
    pub voting_key_hash: PubkeyHash,
    /// The advertised service address.
    pub service_address: ServiceAddress,
    /// The owner's payout script.
    pub script_payout: ScriptBuf,
    /// The operator's payout script.
    pub script_operator_payout: ScriptBuf,
}

impl Default for MasternodeState {
    fn default() -> Self {
        MasternodeState {
            registered_height: -1,
            last_paid_height: 0,
            pose_penalty: 0,
            pose_revived_height: -1,
            pose_ban_height: -1,
            revocation_reason: REASON_NOT_SPECIFIED,
            confirmed_hash: BlockHash::all_zeros(),
            confirmed_hash_with_pro_reg_tx_hash: ConfirmedHashWithProRegTxHash::all_zeros(),
            owner_key_hash: PubkeyHash::all_zeros(),
            operator_public_key: BLSPublicKey::null(),
            voting_key_hash: PubkeyHash::all_zeros(),
            service_address: ServiceAddress::null(),
            script_payout: ScriptBuf::new(),
            script_operator_payout: ScriptBuf::new(),
        }
    }
}

impl MasternodeState {
    /// Builds the initial state from a registration payload.
    pub fn from_registration(payload: &ProviderRegistrationPayload) -> Self {
        MasternodeState {
            owner_key_hash: payload.owner_key_hash,
            operator_public_key: payload.operator_public_key,
            voting_key_hash: payload.voting_key_hash,
            service_address: payload.service_address,
            script_payout: payload.script_payout.clone(),
            script_operator_payout: payload.script_operator_payout.clone(),
            ..Default::default()
        }
    }

    /// Whether the masternode currently carries a PoSe ban.
    pub fn is_pose_banned(&self) -> bool {
        self.pose_ban_height != -1
    }

    /// Whether the masternode has been confirmed yet.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_hash != BlockHash::all_zeros()
    }

    /// Clears the operator-controlled fields, after a revocation or an
    /// operator key change.
    pub fn reset_operator_fields(&mut self) {
        self.operator_public_key = BLSPublicKey::null();
        self.service_address = ServiceAddress::null();
        self.script_operator_payout = ScriptBuf::new();
        self.revocation_reason = REASON_NOT_SPECIFIED;
    }

    /// Bans the masternode at `height` unless it is already banned.
    pub fn ban_if_not_banned(&mut self, height: i32) {
        if self.pose_ban_height == -1 {
            self.pose_ban_height = height;
        }
    }

    /// Records the confirmation block hash and refreshes the cached quorum
    /// combination. Idempotent for a given pair of inputs.
    pub fn update_confirmed_hash(&mut self, pro_tx_hash: &ProTxHash, confirmed_hash: &BlockHash) {
        self.confirmed_hash = *confirmed_hash;
        self.confirmed_hash_with_pro_reg_tx_hash =
            ConfirmedHashWithProRegTxHash::from_confirmed(*pro_tx_hash, *confirmed_hash);
    }
}

impl_consensus_encoding!(
    MasternodeState,
    registered_height,
    last_paid_height,
    pose_penalty,
    pose_revived_height,
    pose_ban_height,
    revocation_reason,
    confirmed_hash,
    confirmed_hash_with_pro_reg_tx_hash,
    owner_key_hash,
    operator_public_key,
    voting_key_hash,
    service_address,
    script_payout,
    script_operator_payout
);

bitflags! {
    /// Which fields a [`MasternodeStateDiff`] carries. Bit positions follow
    /// the state serialization order.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct StateDiffField: u32 {
        const REGISTERED_HEIGHT                      = 0x0001;
        const LAST_PAID_HEIGHT                       = 0x0002;
        const POSE_PENALTY                           = 0x0004;
        const POSE_REVIVED_HEIGHT                    = 0x0008;
        const POSE_BAN_HEIGHT                        = 0x0010;
        const REVOCATION_REASON                      = 0x0020;
        const CONFIRMED_HASH                         = 0x0040;
        const CONFIRMED_HASH_WITH_PRO_REG_TX_HASH    = 0x0080;
        const OWNER_KEY_HASH                         = 0x0100;
        const OPERATOR_PUBLIC_KEY                    = 0x0200;
        const VOTING_KEY_HASH                        = 0x0400;
        const SERVICE_ADDRESS                        = 0x0800;
        const SCRIPT_PAYOUT                          = 0x1000;
        const SCRIPT_OPERATOR_PAYOUT                 = 0x2000;
    }
}

/// A compact delta between two masternode states.
///
/// Only the fields flagged in `fields` are meaningful in `state`; the
/// rest stay at their defaults and are skipped on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct MasternodeStateDiff {
    /// Which fields changed.
    pub fields: StateDiffField,
    /// Carrier for the changed field values.
    pub state: MasternodeState,
}

impl MasternodeStateDiff {
    /// Computes the delta taking state `a` to state `b`.
    pub fn new(a: &MasternodeState, b: &MasternodeState) -> Self {
        let mut fields = StateDiffField::empty();
        let mut state = MasternodeState::default();
        macro_rules! diff_field {
            ($field:ident, $flag:ident) => {
                if a.$field != b.$field {
                    state.$field = b.$field.clone();
                    fields |= StateDiffField::$flag;
                }
            };
        }
        diff_field!(registered_height, REGISTERED_HEIGHT);
        diff_field!(last_paid_height, LAST_PAID_HEIGHT);
        diff_field!(pose_penalty, POSE_PENALTY);
        diff_field!(pose_revived_height, POSE_REVIVED_HEIGHT);
        diff_field!(pose_ban_height, POSE_BAN_HEIGHT);
        diff_field!(revocation_reason, REVOCATION_REASON);
        diff_field!(confirmed_hash, CONFIRMED_HASH);
        diff_field!(confirmed_hash_with_pro_reg_tx_hash, CONFIRMED_HASH_WITH_PRO_REG_TX_HASH);
        diff_field!(owner_key_hash, OWNER_KEY_HASH);
        diff_field!(operator_public_key, OPERATOR_PUBLIC_KEY);
        diff_field!(voting_key_hash, VOTING_KEY_HASH);
        diff_field!(service_address, SERVICE_ADDRESS);
        diff_field!(script_payout, SCRIPT_PAYOUT);
        diff_field!(script_operator_payout, SCRIPT_OPERATOR_PAYOUT);
        MasternodeStateDiff { fields, state }
    }

    /// Whether the diff changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies the flagged fields onto `target`.
    pub fn apply_to(&self, target: &mut MasternodeState) {
        macro_rules! apply_field {
            ($field:ident, $flag:ident) => {
                if self.fields.contains(StateDiffField::$flag) {
                    target.$field = self.state.$field.clone();
                }
            };
        }
        apply_field!(registered_height, REGISTERED_HEIGHT);
        apply_field!(last_paid_height, LAST_PAID_HEIGHT);
        apply_field!(pose_penalty, POSE_PENALTY);
        apply_field!(pose_revived_height, POSE_REVIVED_HEIGHT);
        apply_field!(pose_ban_height, POSE_BAN_HEIGHT);
        apply_field!(revocation_reason, REVOCATION_REASON);
        apply_field!(confirmed_hash, CONFIRMED_HASH);
        apply_field!(confirmed_hash_with_pro_reg_tx_hash, CONFIRMED_HASH_WITH_PRO_REG_TX_HASH);
        apply_field!(owner_key_hash, OWNER_KEY_HASH);
        apply_field!(operator_public_key, OPERATOR_PUBLIC_KEY);
        apply_field!(voting_key_hash, VOTING_KEY_HASH);
        apply_field!(service_address, SERVICE_ADDRESS);
        apply_field!(script_payout, SCRIPT_PAYOUT);
        apply_field!(script_operator_payout, SCRIPT_OPERATOR_PAYOUT);
    }
}

impl fmt::Debug for MasternodeStateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasternodeStateDiff(fields={:#06x})", self.fields.bits())
    }
}

impl Encodable for MasternodeStateDiff {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = VarInt(self.fields.bits() as u64).consensus_encode(writer)?;
        macro_rules! encode_field {
            ($field:ident, $flag:ident) => {
                if self.fields.contains(StateDiffField::$flag) {
                    len += self.state.$field.consensus_encode(writer)?;
                }
            };
        }
        encode_field!(registered_height, REGISTERED_HEIGHT);
        encode_field!(last_paid_height, LAST_PAID_HEIGHT);
        encode_field!(pose_penalty, POSE_PENALTY);
        encode_field!(pose_revived_height, POSE_REVIVED_HEIGHT);
        encode_field!(pose_ban_height, POSE_BAN_HEIGHT);
        encode_field!(revocation_reason, REVOCATION_REASON);
        encode_field!(confirmed_hash, CONFIRMED_HASH);
        encode_field!(confirmed_hash_with_pro_reg_tx_hash, CONFIRMED_HASH_WITH_PRO_REG_TX_HASH);
        encode_field!(owner_key_hash, OWNER_KEY_HASH);
        encode_field!(operator_public_key, OPERATOR_PUBLIC_KEY);
        encode_field!(voting_key_hash, VOTING_KEY_HASH);
        encode_field!(service_address, SERVICE_ADDRESS);
        encode_field!(script_payout, SCRIPT_PAYOUT);
        encode_field!(script_operator_payout, SCRIPT_OPERATOR_PAYOUT);
        Ok(len)
    }
}

impl Decodable for MasternodeStateDiff {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let bits = VarInt::consensus_decode(reader)?.0;
        if bits > u32::MAX as u64 {
            return Err(encode::Error::ParseFailed("state diff field mask too wide"));
        }
        let fields = StateDiffField::from_bits(bits as u32)
            .ok_or(encode::Error::ParseFailed("unknown state diff field bits"))?;
        let mut state = MasternodeState::default();
        macro_rules! decode_field {
            ($field:ident, $flag:ident) => {
                if fields.contains(StateDiffField::$flag) {
                    state.$field = Decodable::consensus_decode(reader)?;
                }
            };
        }
        decode_field!(registered_height, REGISTERED_HEIGHT);
        decode_field!(last_paid_height, LAST_PAID_HEIGHT);
        decode_field!(pose_penalty, POSE_PENALTY);
        decode_field!(pose_revived_height, POSE_REVIVED_HEIGHT);
        decode_field!(pose_ban_height, POSE_BAN_HEIGHT);
        decode_field!(revocation_reason, REVOCATION_REASON);
        decode_field!(confirmed_hash, CONFIRMED_HASH);
        decode_field!(confirmed_hash_with_pro_reg_tx_hash, CONFIRMED_HASH_WITH_PRO_REG_TX_HASH);
        decode_field!(owner_key_hash, OWNER_KEY_HASH);
        decode_field!(operator_public_key, OPERATOR_PUBLIC_KEY);
        decode_field!(voting_key_hash, VOTING_KEY_HASH);
        decode_field!(service_address, SERVICE_ADDRESS);
        decode_field!(script_payout, SCRIPT_PAYOUT);
        decode_field!(script_operator_payout, SCRIPT_OPERATOR_PAYOUT);
        Ok(MasternodeStateDiff { fields, state })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use crate::consensus::{deserialize, serialize};

    use super::*;

    fn registered_state() -> MasternodeState {
        let payload = ProviderRegistrationPayload {
            service_address: ServiceAddress::new(Ipv4Addr::new(1, 2, 3, 4), 46003),
            owner_key_hash: PubkeyHash::from_byte_array([0x01; 20]),
            operator_public_key: BLSPublicKey::from([0x02; 48]),
            voting_key_hash: PubkeyHash::from_byte_array([0x03; 20]),
            script_payout: ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array([0x04; 20])),
            ..Default::default()
        };
        MasternodeState::from_registration(&payload)
    }

    #[test]
    fn state_roundtrip() {
        let mut state = registered_state();
        state.registered_height = 100;
        state.last_paid_height = 250;
        state.pose_penalty = 33;
        let decoded: MasternodeState = deserialize(&serialize(&state)).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn diff_captures_only_changes() {
        let a = registered_state();
        let mut b = a.clone();
        b.pose_penalty = 50;
        b.pose_ban_height = 120;

        let diff = MasternodeStateDiff::new(&a, &b);
        assert_eq!(diff.fields, StateDiffField::POSE_PENALTY | StateDiffField::POSE_BAN_HEIGHT);

        let mut restored = a.clone();
        diff.apply_to(&mut restored);
        assert_eq!(restored, b);
    }

    #[test]
    fn empty_diff_for_equal_states() {
        let a = registered_state();
        let diff = MasternodeStateDiff::new(&a, &a.clone());
        assert!(diff.is_empty());
    }

    #[test]
    fn diff_wire_skips_unchanged_fields() {
        let a = registered_state();
        let mut b = a.clone();
        b.last_paid_height = 77;

        let diff = MasternodeStateDiff::new(&a, &b);
        let encoded = serialize(&diff);
        // one byte of mask, four bytes of height
        assert_eq!(encoded.len(), 1 + 4);

        let decoded: MasternodeStateDiff = deserialize(&encoded).unwrap();
        assert_eq!(decoded, diff);
    }

    #[test]
    fn unknown_mask_bits_rejected() {
        let encoded = serialize(&VarInt(0x4000));
        assert!(deserialize::<MasternodeStateDiff>(&encoded).is_err());
    }

    #[test]
    fn confirmation_is_idempotent() {
        let mut state = registered_state();
        let pro_tx_hash = ProTxHash::from_byte_array([0xAA; 32]);
        let confirmed = BlockHash::from_byte_array([0xBB; 32]);
        state.update_confirmed_hash(&pro_tx_hash, &confirmed);
        let once = state.clone();
        state.update_confirmed_hash(&pro_tx_hash, &confirmed);
        assert_eq!(state, once);
        assert!(state.is_confirmed());
    }

    #[test]
    fn reset_operator_fields_clears_service() {
        let mut state = registered_state();
        state.revocation_reason = 2;
        state.reset_operator_fields();
        assert!(state.operator_public_key.is_null());
        assert!(state.service_address.is_null());
        assert!(state.script_operator_payout.is_empty());
        assert_eq!(state.revocation_reason, REASON_NOT_SPECIFIED);
        // owner-controlled fields stay
        assert!(!state.script_payout.is_empty());
        assert_ne!(state.owner_key_hash, PubkeyHash::all_zeros());
    }
}
