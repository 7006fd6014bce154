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

//! Error taxonomy.
//!
//! Failures split into two worlds. [`ProTxValidationError`] covers
//! consensus rejection of a transaction or block: deterministic verdicts a
//! peer can be penalized over, each carrying a stable reject-reason
//! string. [`InternalError`] covers everything that should never happen on
//! honest, uncorrupted state: broken invariants, missing records, failing
//! storage. The former is an ordinary outcome, the latter means the node
//! cannot safely continue processing the block.

use crate::hash_types::{BlockHash, ProTxHash};
use crate::store::{ReadError, StorageError};

/// A consensus rejection of a special transaction (or of the block
/// containing it).
///
/// Each variant maps to the stable reject-reason string peers exchange;
/// see [`ProTxValidationError::reject_reason`].
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ProTxValidationError {
    /// The extra payload is missing or does not decode.
    #[error("special transaction payload missing or malformed")]
    BadPayload,
    /// The payload version is unknown.
    #[error("unsupported payload version {0}")]
    BadVersion(u16),
    /// The transaction type is unknown, or the provider type is not the
    /// regular one.
    #[error("unsupported provider or transaction type")]
    BadType,
    /// The provider mode is not zero.
    #[error("unsupported provider mode {0}")]
    BadMode(u16),
    /// The owner key hash is null.
    #[error("owner key is null")]
    KeyNull,
    /// The operator BLS public key is null or not a valid group element.
    #[error("operator key is invalid")]
    OperatorKeyInvalid,
    /// The voting key hash is null.
    #[error("voting key is null")]
    VotingKeyNull,
    /// The payout script is not pay-to-pubkey-hash.
    #[error("payout script is not P2PKH")]
    Payee,
    /// The payout destination could not be extracted.
    #[error("payout destination invalid")]
    PayeeDest,
    /// The payout destination equals the owner or voting key.
    #[error("payout destination reuses owner or voting key")]
    PayeeReuse,
    /// The operator payout script is present when forbidden, or not P2PKH.
    #[error("operator payout script invalid")]
    OperatorPayee,
    /// The operator reward exceeds the total share count.
    #[error("operator reward {0} out of range")]
    OperatorReward(u16),
    /// The service address is unset, not IPv4, or not routable.
    #[error("service address invalid")]
    IpAddress,
    /// The service port does not match the network rules.
    #[error("service port invalid")]
    IpAddressPort,
    /// The referenced collateral does not exist.
    #[error("collateral not found")]
    Collateral,
    /// An internal collateral index points past the outputs.
    #[error("collateral index out of range")]
    CollateralIndex,
    /// The external collateral destination is not a plain key.
    #[error("collateral destination is not a key")]
    CollateralDest,
    /// The collateral destination equals the owner or voting key.
    #[error("collateral destination reuses owner or voting key")]
    CollateralReuse,
    /// The collateral value differs from the required amount.
    #[error("collateral amount incorrect")]
    CollateralAmount,
    /// The external collateral script is not pay-to-pubkey-hash.
    #[error("collateral script is not P2PKH")]
    CollateralPkh,
    /// A payload signature failed verification, or is present when it must
    /// be empty.
    #[error("payload signature invalid")]
    Signature,
    /// The payload inputs hash does not match the transaction inputs.
    #[error("payload inputs hash mismatch")]
    InputsHash,
    /// The referenced masternode does not exist in the list.
    #[error("masternode {0} not found")]
    Hash(ProTxHash),
    /// The service address is already used by another masternode.
    #[error("service address already registered")]
    DupAddress,
    /// The service address appears twice within one block.
    #[error("duplicate service address within block")]
    DupIpAddressInBlock,
    /// The owner key is already used by another masternode.
    #[error("owner key already registered")]
    DupOwnerKey,
    /// The operator key is already used by another masternode.
    #[error("operator key already registered")]
    DupOperatorKey,
    /// A registrar update would take over another masternode's operator
    /// key.
    #[error("operator key already registered to another masternode")]
    DupKey,
    /// The revocation reason is out of range.
    #[error("revocation reason {0} out of range")]
    Reason(u16),
    /// The transaction type tag is not a known one.
    #[error("unknown transaction type")]
    TxType,
    /// A classic transaction carries an extra payload.
    #[error("extra payload on classic transaction")]
    TypePayload,
    /// A typed transaction has a version below the special minimum.
    #[error("typed transaction below minimum version")]
    TypeVersion,
    /// The coinbase carries a provider type.
    #[error("provider payload on coinbase")]
    SpecialCoinbase,
    /// A typed transaction has no payload at all.
    #[error("typed transaction without payload")]
    PayloadEmpty,
    /// The extra payload exceeds the size cap.
    #[error("extra payload oversize ({0} bytes)")]
    PayloadOversize(usize),
    /// A special transaction appeared before the upgrade enforced.
    #[error("special transaction before upgrade activation")]
    UpgradeNotActive,
}

impl ProTxValidationError {
    /// The stable reject-reason string for this rejection.
    pub fn reject_reason(&self) -> &'static str {
        use ProTxValidationError::*;
        match self {
            BadPayload => "bad-protx-payload",
            BadVersion(_) => "bad-protx-version",
            BadType => "bad-protx-type",
            BadMode(_) => "bad-protx-mode",
            KeyNull => "bad-protx-key-null",
            OperatorKeyInvalid => "bad-protx-operator-key-invalid",
            VotingKeyNull => "bad-protx-voting-key-null",
            Payee => "bad-protx-payee",
            PayeeDest => "bad-protx-payee-dest",
            PayeeReuse => "bad-protx-payee-reuse",
            OperatorPayee => "bad-protx-operator-payee",
            OperatorReward(_) => "bad-protx-operator-reward",
            IpAddress => "bad-protx-ipaddr",
            IpAddressPort => "bad-protx-ipaddr-port",
            Collateral => "bad-protx-collateral",
            CollateralIndex => "bad-protx-collateral-index",
            CollateralDest => "bad-protx-collateral-dest",
            CollateralReuse => "bad-protx-collateral-reuse",
            CollateralAmount => "bad-protx-collateral-amount",
            CollateralPkh => "bad-protx-collateral-pkh",
            Signature => "bad-protx-sig",
            InputsHash => "bad-protx-inputs-hash",
            Hash(_) => "bad-protx-hash",
            DupAddress => "bad-protx-dup-addr",
            DupIpAddressInBlock => "bad-protx-dup-IP-address",
            DupOwnerKey => "bad-protx-dup-owner-key",
            DupOperatorKey => "bad-protx-dup-operator-key",
            DupKey => "bad-protx-dup-key",
            Reason(_) => "bad-protx-reason",
            TxType => "bad-tx-type",
            TypePayload => "bad-txns-type-payload",
            TypeVersion => "bad-txns-type-version",
            SpecialCoinbase => "bad-txns-special-coinbase",
            PayloadEmpty => "bad-txns-payload-empty",
            PayloadOversize(_) => "bad-txns-payload-oversize",
            UpgradeNotActive => "bad-txns-v6-not-active",
        }
    }
}

/// A failure that honest, uncorrupted state can never produce.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// A referenced masternode vanished between checks.
    #[error("masternode {0} not in list")]
    MasternodeNotFound(ProTxHash),
    /// A diff referenced an internal id the list does not hold.
    #[error("internal id {0} not in list")]
    InternalIdNotFound(u64),
    /// Two masternodes with the same registration hash.
    #[error("duplicate registration hash {0}")]
    DuplicateProTxHash(ProTxHash),
    /// Two masternodes with the same internal id.
    #[error("duplicate internal id {0}")]
    DuplicateInternalId(u64),
    /// A unique property (address, key, collateral) was claimed twice.
    #[error("duplicate unique property of masternode {0}")]
    DuplicateUniqueProperty(ProTxHash),
    /// The unique-property index disagrees with the masternode map.
    #[error("unique property index corrupt for masternode {0}")]
    UniqueIndexCorrupt(ProTxHash),
    /// A penalty decrease was requested for a masternode without penalty.
    #[error("penalty decrease on masternode {0} without penalty")]
    PoSeDecreasePrecondition(ProTxHash),
    /// No snapshot or diff chain reaches the requested block.
    #[error("no masternode list data for block {hash} at height {height}, possible corrupt database")]
    MissingListData {
        /// The block whose list was requested.
        hash: BlockHash,
        /// The height of that block.
        height: i32,
    },
    /// The stored best-block marker disagrees with the chain tip.
    #[error("masternode store is at block {stored:?}, chain tip is {expected:?}, reindex required")]
    StoreOutOfSync {
        /// The best block recorded in the store, if any.
        stored: Option<BlockHash>,
        /// The best block the chain expects.
        expected: Option<BlockHash>,
    },
    /// The backing database failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A stored record did not decode.
    #[error("corrupt record: {0}")]
    CorruptRecord(#[from] crate::consensus::encode::Error),
}

impl From<ReadError> for InternalError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Storage(e) => InternalError::Storage(e),
            ReadError::Corrupt(e) => InternalError::CorruptRecord(e),
        }
    }
}

/// The combined failure mode of block processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessBlockError {
    /// The block contains an invalid special transaction.
    #[error("invalid special transaction: {0}")]
    Validation(#[from] ProTxValidationError),
    /// The node state is broken; processing must stop.
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}
