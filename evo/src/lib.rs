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

//! # Rust Evonode Library
//!
//! The deterministic masternode list consensus engine. It maintains a
//! chain-height-indexed registry of collateral-backed masternodes, validates
//! the four provider special transactions that mutate that registry
//! (registration, service update, registrar update, revocation), persists the
//! per-block list as snapshots plus diffs, and exposes the deterministic
//! payment-queue and quorum-selection algorithms that downstream consensus
//! code relies on.
//!
//! The crate is self-contained: it carries its own consensus encoding,
//! transaction primitives and script/address helpers, and consumes chain
//! state (UTXO lookups, block index navigation, signature verification)
//! through narrow traits so the host node stays in control of those
//! subsystems.

pub extern crate dashcore_hashes as hashes;

#[macro_use]
mod internal_macros;

pub mod address;
pub mod base58;
pub mod bls_sig_utils;
pub mod chain;
pub mod consensus;
pub mod dmn;
pub mod error;
pub mod hash_types;
pub mod params;
pub mod script;
pub mod signer;
pub mod store;
pub mod test_utils;
pub mod transaction;

pub use crate::address::ServiceAddress;
pub use crate::bls_sig_utils::{BLSPublicKey, BLSSignature};
pub use crate::chain::{Block, BlockIndex, Coin, CoinView};
pub use crate::dmn::entry::DeterministicMasternode;
pub use crate::dmn::list::{MasternodeList, MasternodeListDiff};
pub use crate::dmn::manager::{DeterministicMnManager, LegacyBridge, MasternodeListListener};
pub use crate::dmn::state::{MasternodeState, MasternodeStateDiff};
pub use crate::error::{InternalError, ProTxValidationError, ProcessBlockError};
pub use crate::hash_types::{
    BlockHash, ConfirmedHashWithProRegTxHash, InputsHash, ProTxHash, PubkeyHash,
    QuorumModifierHash, ScoreHash, SpecialTransactionPayloadHash, Txid, UniquePropertyHash,
};
pub use crate::params::{Network, Params};
pub use crate::script::ScriptBuf;
pub use crate::transaction::{OutPoint, Transaction, TxIn, TxOut};
