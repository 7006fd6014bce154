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

//! Test support.
//!
//! Deterministic builders for special transactions, blocks and chains, plus
//! stand-in signature backends and an in-memory UTXO set. Everything is
//! keyed off small integer seeds so tests stay readable.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::address::ServiceAddress;
use crate::bls_sig_utils::{BLSPublicKey, BLSSignature};
use crate::chain::{Block, BlockIndex, Coin, CoinView};
use crate::consensus::{Encodable, serialize};
use crate::hash_types::{BlockHash, ProTxHash, PubkeyHash, Txid};
use crate::hashes::Hash;
use crate::params::Params;
use crate::script::ScriptBuf;
use crate::signer::{BlsVerifier, HashSigVerifier};
use crate::transaction::special::{
    ProviderRegistrationPayload, ProviderUpdateRegistrarPayload, ProviderUpdateRevocationPayload,
    ProviderUpdateServicePayload, TransactionType,
};
use crate::transaction::special::provider_registration::PROVIDER_REGISTRATION_PAYLOAD_VERSION;
use crate::transaction::special::provider_update_registrar::PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION;
use crate::transaction::special::provider_update_revocation::PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION;
use crate::transaction::special::provider_update_service::PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION;
use crate::transaction::{OutPoint, Transaction, TxIn, TxOut};

/// Test network parameters with the upgrade active from genesis.
pub fn test_params() -> Params {
    let mut params = Params::test();
    params.activation_height = 0;
    params
}

/// A verification backend that accepts every signature. Null operator keys
/// still count as invalid, matching what a real BLS backend would say.
pub struct AcceptAllSigners;

impl HashSigVerifier for AcceptAllSigners {
    fn verify_hash(
        &self,
        _key_hash: &PubkeyHash,
        _payload_hash: &crate::hash_types::SpecialTransactionPayloadHash,
        _signature: &[u8],
    ) -> bool {
        true
    }

    fn verify_message(&self, _key_hash: &PubkeyHash, _message: &str, _signature: &[u8]) -> bool {
        true
    }
}

impl BlsVerifier for AcceptAllSigners {
    fn is_valid_public_key(&self, public_key: &BLSPublicKey) -> bool {
        !public_key.is_null()
    }

    fn verify(
        &self,
        _public_key: &BLSPublicKey,
        _payload_hash: &crate::hash_types::SpecialTransactionPayloadHash,
        _signature: &BLSSignature,
    ) -> bool {
        true
    }
}

/// A verification backend that rejects every signature.
pub struct RejectAllSigners;

impl HashSigVerifier for RejectAllSigners {
    fn verify_hash(
        &self,
        _key_hash: &PubkeyHash,
        _payload_hash: &crate::hash_types::SpecialTransactionPayloadHash,
        _signature: &[u8],
    ) -> bool {
        false
    }

    fn verify_message(&self, _key_hash: &PubkeyHash, _message: &str, _signature: &[u8]) -> bool {
        false
    }
}

impl BlsVerifier for RejectAllSigners {
    fn is_valid_public_key(&self, public_key: &BLSPublicKey) -> bool {
        !public_key.is_null()
    }

    fn verify(
        &self,
        _public_key: &BLSPublicKey,
        _payload_hash: &crate::hash_types::SpecialTransactionPayloadHash,
        _signature: &BLSSignature,
    ) -> bool {
        false
    }
}

/// An in-memory UTXO set.
#[derive(Default)]
pub struct MemoryCoins {
    coins: BTreeMap<OutPoint, Coin>,
}

impl MemoryCoins {
    /// Adds an unspent output.
    pub fn add(&mut self, outpoint: OutPoint, value: u64, script_pubkey: ScriptBuf) {
        self.coins.insert(outpoint, Coin { value, script_pubkey });
    }

    /// Removes an output, as if spent.
    pub fn spend(&mut self, outpoint: &OutPoint) {
        self.coins.remove(outpoint);
    }
}

impl CoinView for MemoryCoins {
    fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.get(outpoint).cloned()
    }
}

/// The owner key hash a registration built from `seed` carries.
pub fn owner_key(seed: u8) -> PubkeyHash {
    let mut bytes = [seed; 20];
    bytes[0] = 0x01;
    PubkeyHash::from_byte_array(bytes)
}

/// The voting key hash a registration built from `seed` carries.
pub fn voting_key(seed: u8) -> PubkeyHash {
    let mut bytes = [seed; 20];
    bytes[0] = 0x02;
    PubkeyHash::from_byte_array(bytes)
}

/// The payout key hash a registration built from `seed` carries.
pub fn payout_key(seed: u8) -> PubkeyHash {
    let mut bytes = [seed; 20];
    bytes[0] = 0x03;
    PubkeyHash::from_byte_array(bytes)
}

/// The operator key a registration built from `seed` carries.
pub fn operator_key(seed: u8) -> BLSPublicKey {
    let mut bytes = [seed; 48];
    bytes[0] = 0x04;
    BLSPublicKey::from(bytes)
}

/// The registration hash a provider registration transaction yields.
pub fn pro_tx_hash_of(tx: &Transaction) -> ProTxHash {
    ProTxHash::from_byte_array(tx.txid().to_byte_array())
}

/// A routable service address derived from `seed`, on the given port.
pub fn service(seed: u8, port: u16) -> ServiceAddress {
    ServiceAddress::new(Ipv4Addr::new(51, 52, 53, seed), port)
}

/// A provider registration with an internal collateral at output zero.
///
/// The transaction spends a funding outpoint derived from `seed`, locks the
/// collateral to a dedicated key and advertises a routable address (or the
/// one given). Keys are all distinct, the inputs hash is committed.
pub fn pro_reg_tx(params: &Params, seed: u8, address: Option<ServiceAddress>) -> Transaction {
    let funding = OutPoint::new(Txid::from_byte_array([seed.wrapping_add(0x80); 32]), 0);
    let mut collateral_key = [seed; 20];
    collateral_key[0] = 0x05;

    let mut tx = Transaction {
        version: 2,
        tx_type: TransactionType::ProviderRegistration,
        input: vec![TxIn::from_prevout(funding)],
        output: vec![TxOut {
            value: params.collateral_amount,
            script_pubkey: ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(collateral_key)),
        }],
        lock_time: 0,
        extra_payload: Vec::new(),
    };

    let payload = ProviderRegistrationPayload {
        version: PROVIDER_REGISTRATION_PAYLOAD_VERSION,
        provider_type: 0,
        provider_mode: 0,
        collateral_outpoint: OutPoint::new(Txid::all_zeros(), 0),
        service_address: address.unwrap_or_else(|| service(seed, params.default_port)),
        owner_key_hash: owner_key(seed),
        operator_public_key: operator_key(seed),
        voting_key_hash: voting_key(seed),
        script_payout: ScriptBuf::new_p2pkh(&payout_key(seed)),
        operator_reward: 0,
        script_operator_payout: ScriptBuf::new(),
        inputs_hash: tx.hash_inputs(),
        signature: Vec::new(),
    };
    tx.extra_payload = serialize(&payload);
    tx
}

/// A service update for `pro_tx_hash`, moving it onto `address`.
pub fn pro_up_serv_tx(pro_tx_hash: ProTxHash, address: ServiceAddress, seed: u8) -> Transaction {
    let funding = OutPoint::new(Txid::from_byte_array([seed.wrapping_add(0x90); 32]), 0);
    let mut tx = spending_tx(funding, TransactionType::ProviderUpdateService);
    let payload = ProviderUpdateServicePayload {
        version: PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION,
        pro_tx_hash,
        service_address: address,
        script_operator_payout: ScriptBuf::new(),
        inputs_hash: tx.hash_inputs(),
        signature: BLSSignature::null(),
    };
    tx.extra_payload = serialize(&payload);
    tx
}

/// A registrar update for `pro_tx_hash` rotating to the given keys.
pub fn pro_up_reg_tx(
    pro_tx_hash: ProTxHash,
    new_operator: BLSPublicKey,
    new_voting: PubkeyHash,
    payout: PubkeyHash,
    seed: u8,
) -> Transaction {
    let funding = OutPoint::new(Txid::from_byte_array([seed.wrapping_add(0xA0); 32]), 0);
    let mut tx = spending_tx(funding, TransactionType::ProviderUpdateRegistrar);
    let payload = ProviderUpdateRegistrarPayload {
        version: PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION,
        pro_tx_hash,
        provider_mode: 0,
        operator_public_key: new_operator,
        voting_key_hash: new_voting,
        script_payout: ScriptBuf::new_p2pkh(&payout),
        inputs_hash: tx.hash_inputs(),
        signature: Vec::new(),
    };
    tx.extra_payload = serialize(&payload);
    tx
}

/// A revocation of `pro_tx_hash` with the given reason.
pub fn pro_up_rev_tx(pro_tx_hash: ProTxHash, reason: u16, seed: u8) -> Transaction {
    let funding = OutPoint::new(Txid::from_byte_array([seed.wrapping_add(0xB0); 32]), 0);
    let mut tx = spending_tx(funding, TransactionType::ProviderUpdateRevocation);
    let payload = ProviderUpdateRevocationPayload {
        version: PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION,
        pro_tx_hash,
        reason,
        inputs_hash: tx.hash_inputs(),
        signature: BLSSignature::null(),
    };
    tx.extra_payload = serialize(&payload);
    tx
}

/// Replaces the payload of `tx` with a re-serialized `payload`.
pub fn signed_payload_tx<P: Encodable>(tx: &Transaction, payload: &P) -> Transaction {
    let mut tx = tx.clone();
    tx.extra_payload = serialize(payload);
    tx
}

/// A classic transaction spending the given outpoints.
pub fn spend_tx(prevouts: &[OutPoint]) -> Transaction {
    Transaction {
        version: 2,
        tx_type: TransactionType::Classic,
        input: prevouts.iter().copied().map(TxIn::from_prevout).collect(),
        output: vec![TxOut { value: 1000, script_pubkey: ScriptBuf::new() }],
        lock_time: 0,
        extra_payload: Vec::new(),
    }
}

/// A minimal coinbase transaction, unique per height.
pub fn coinbase_tx(height: i32) -> Transaction {
    Transaction {
        version: 1,
        tx_type: TransactionType::Classic,
        input: vec![TxIn::from_prevout(OutPoint::null())],
        output: vec![TxOut {
            value: 500 * crate::params::COIN,
            script_pubkey: ScriptBuf::from_bytes(height.to_le_bytes().to_vec()),
        }],
        lock_time: 0,
        extra_payload: Vec::new(),
    }
}

fn spending_tx(funding: OutPoint, tx_type: TransactionType) -> Transaction {
    Transaction {
        version: 2,
        tx_type,
        input: vec![TxIn::from_prevout(funding)],
        output: vec![TxOut { value: 1000, script_pubkey: ScriptBuf::new() }],
        lock_time: 0,
        extra_payload: Vec::new(),
    }
}

/// Extends `tip` with one block index. Hashes are derived from the height,
/// so two chains built this way line up block for block.
pub fn extend_chain(tip: Option<Arc<BlockIndex>>) -> Arc<BlockIndex> {
    let height = tip.as_ref().map_or(0, |index| index.height + 1);
    let hash = BlockHash::hash(&height.to_le_bytes());
    Arc::new(BlockIndex::new(hash, height, tip))
}

/// Builds a chain of `len` blocks starting at genesis, returning the tip.
pub fn build_chain(len: usize) -> Arc<BlockIndex> {
    assert!(len > 0);
    let mut tip = extend_chain(None);
    for _ in 1..len {
        tip = extend_chain(Some(tip));
    }
    tip
}

/// A block holding a coinbase plus the given transactions.
pub fn block_with(height: i32, txdata: Vec<Transaction>) -> Block {
    let mut all = vec![coinbase_tx(height)];
    all.extend(txdata);
    Block { txdata: all }
}
