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

//! Special transaction validation.
//!
//! Checks come in two flavors. Non-contextual checks depend only on the
//! transaction itself and run everywhere, including mempool admission of
//! loose transactions. Contextual checks additionally need the masternode
//! list and the UTXO set as of the previous block; they run during block
//! connection. Passing `prev_list` selects the flavor, mirroring how a
//! chain tip is either at hand or not.

use crate::address::ServiceAddress;
use crate::chain::CoinView;
use crate::dmn::list::MasternodeList;
use crate::error::ProTxValidationError;
use crate::hash_types::PubkeyHash;
use crate::hashes::Hash;
use crate::params::{Network, Params};
use crate::script::ScriptBuf;
use crate::signer::{BlsVerifier, HashSigVerifier};
use crate::transaction::Transaction;
use crate::transaction::special::{
    MAX_SPECIALTX_EXTRAPAYLOAD, ProviderRegistrationPayload, ProviderUpdateRegistrarPayload,
    ProviderUpdateRevocationPayload, ProviderUpdateServicePayload,
    SpecialTransactionBasePayloadEncodable, TransactionPayload, TransactionType,
};
use crate::transaction::special::provider_registration::{
    OPERATOR_REWARD_SHARES, PROVIDER_REGISTRATION_PAYLOAD_VERSION, PROVIDER_TYPE_REGULAR,
};
use crate::transaction::special::provider_update_registrar::PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION;
use crate::transaction::special::provider_update_revocation::{
    PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION, REASON_LAST,
};
use crate::transaction::special::provider_update_service::PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION;

/// The minimum transaction version that may carry a type tag.
pub const MIN_SPECIAL_TX_VERSION: u16 = 2;

/// The chain and crypto backends validation draws on.
pub struct ValidationContext<'a, C, H, B> {
    /// Network parameters.
    pub params: &'a Params,
    /// The UTXO set as of the previous block.
    pub coins: &'a C,
    /// ECDSA verification backend.
    pub hash_signer: &'a H,
    /// BLS verification backend.
    pub bls: &'a B,
}

/// Stateless sanity checks that apply to every transaction.
pub fn check_special_tx_basic(tx: &Transaction) -> Result<(), ProTxValidationError> {
    if tx.tx_type == TransactionType::Classic {
        if tx.has_extra_payload() {
            return Err(ProTxValidationError::TypePayload);
        }
        return Ok(());
    }

    if tx.version < MIN_SPECIAL_TX_VERSION {
        return Err(ProTxValidationError::TypeVersion);
    }
    if tx.is_coinbase() {
        return Err(ProTxValidationError::SpecialCoinbase);
    }
    if tx.extra_payload.is_empty() {
        return Err(ProTxValidationError::PayloadEmpty);
    }
    if tx.extra_payload.len() > MAX_SPECIALTX_EXTRAPAYLOAD {
        return Err(ProTxValidationError::PayloadOversize(tx.extra_payload.len()));
    }
    Ok(())
}

/// Validates a loose transaction, without chain context.
pub fn check_special_tx_no_context<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    check_special_tx_basic(tx)?;
    check_special_tx_payload(tx, None, ctx)
}

/// Validates a transaction inside a block at `height`, against the list
/// and UTXO set of the previous block.
pub fn check_special_tx<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    height: i32,
    prev_list: &MasternodeList,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    check_special_tx_basic(tx)?;
    if tx.tx_type == TransactionType::Classic {
        return Ok(());
    }
    if !ctx.params.is_active(height) {
        return Err(ProTxValidationError::UpgradeNotActive);
    }
    check_special_tx_payload(tx, Some(prev_list), ctx)
}

fn check_special_tx_payload<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    prev_list: Option<&MasternodeList>,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    match tx.tx_type {
        TransactionType::Classic => Ok(()),
        TransactionType::ProviderRegistration => check_pro_reg_tx(tx, prev_list, ctx),
        TransactionType::ProviderUpdateService => check_pro_up_serv_tx(tx, prev_list, ctx),
        TransactionType::ProviderUpdateRegistrar => check_pro_up_reg_tx(tx, prev_list, ctx),
        TransactionType::ProviderUpdateRevocation => check_pro_up_rev_tx(tx, prev_list, ctx),
    }
}

/// Validates the advertised service address under the network rules.
///
/// Only IPv4 is supported. The address must be routable outside regtest,
/// and the production default port is mandatory on the production network
/// and forbidden everywhere else.
pub fn check_service(
    addr: &ServiceAddress,
    params: &Params,
) -> Result<(), ProTxValidationError> {
    if !addr.is_valid() {
        return Err(ProTxValidationError::IpAddress);
    }
    if !params.is_regtest() && !addr.is_routable() {
        return Err(ProTxValidationError::IpAddress);
    }

    let mainnet_port = Params::main().default_port;
    if params.network == Network::Main {
        if addr.port != mainnet_port {
            return Err(ProTxValidationError::IpAddressPort);
        }
    } else if addr.port == mainnet_port {
        return Err(ProTxValidationError::IpAddressPort);
    }
    Ok(())
}

fn check_inputs_hash(
    tx: &Transaction,
    inputs_hash: &crate::hash_types::InputsHash,
) -> Result<(), ProTxValidationError> {
    if tx.hash_inputs() != *inputs_hash {
        return Err(ProTxValidationError::InputsHash);
    }
    Ok(())
}

fn extract_p2pkh(script: &ScriptBuf) -> Option<PubkeyHash> {
    script.p2pkh_pubkey_hash()
}

// Provider registration

fn check_collateral_out(
    value: u64,
    script_pubkey: &ScriptBuf,
    payload: &ProviderRegistrationPayload,
    params: &Params,
) -> Result<PubkeyHash, ProTxValidationError> {
    let dest = extract_p2pkh(script_pubkey).ok_or(ProTxValidationError::CollateralDest)?;
    // the collateral key must stay offline, so it can't double as a
    // masternode key
    if dest == payload.owner_key_hash || dest == payload.voting_key_hash {
        return Err(ProTxValidationError::CollateralReuse);
    }
    if value != params.collateral_amount {
        return Err(ProTxValidationError::CollateralAmount);
    }
    Ok(dest)
}

fn check_pro_reg_tx<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    prev_list: Option<&MasternodeList>,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    let payload = decode_pro_reg(tx)?;

    if payload.version == 0 || payload.version > PROVIDER_REGISTRATION_PAYLOAD_VERSION {
        return Err(ProTxValidationError::BadVersion(payload.version));
    }
    if payload.provider_type != PROVIDER_TYPE_REGULAR {
        return Err(ProTxValidationError::BadType);
    }
    if payload.provider_mode != 0 {
        return Err(ProTxValidationError::BadMode(payload.provider_mode));
    }

    if payload.owner_key_hash == PubkeyHash::all_zeros()
        || payload.voting_key_hash == PubkeyHash::all_zeros()
    {
        return Err(ProTxValidationError::KeyNull);
    }
    if payload.operator_public_key.is_null()
        || !ctx.bls.is_valid_public_key(&payload.operator_public_key)
    {
        return Err(ProTxValidationError::OperatorKeyInvalid);
    }
    // other script kinds may come later
    if !payload.script_payout.is_p2pkh() {
        return Err(ProTxValidationError::Payee);
    }
    if !payload.script_operator_payout.is_empty() && !payload.script_operator_payout.is_p2pkh() {
        return Err(ProTxValidationError::OperatorPayee);
    }

    let payout_dest =
        extract_p2pkh(&payload.script_payout).ok_or(ProTxValidationError::PayeeDest)?;
    // the payout key must stay offline too
    if payout_dest == payload.owner_key_hash || payout_dest == payload.voting_key_hash {
        return Err(ProTxValidationError::PayeeReuse);
    }

    // a null address is allowed; the masternode then starts PoSe-banned
    // and needs a service update before going live
    if !payload.service_address.is_null() {
        check_service(&payload.service_address, ctx.params)?;
    }

    if payload.operator_reward > OPERATOR_REWARD_SHARES {
        return Err(ProTxValidationError::OperatorReward(payload.operator_reward));
    }

    if payload.has_internal_collateral() {
        // collateral is an output of this very transaction
        if payload.collateral_outpoint.vout as usize >= tx.output.len() {
            return Err(ProTxValidationError::CollateralIndex);
        }
        let out = &tx.output[payload.collateral_outpoint.vout as usize];
        check_collateral_out(out.value, &out.script_pubkey, &payload, ctx.params)?;
        // ownership is implied, a collateral signature must not be present
        if !payload.signature.is_empty() {
            return Err(ProTxValidationError::Signature);
        }
    } else if prev_list.is_some() {
        // external collateral needs the current UTXO set, so this branch is
        // contextual only
        let coin = ctx
            .coins
            .get_coin(&payload.collateral_outpoint)
            .ok_or(ProTxValidationError::Collateral)?;
        let collateral_key =
            check_collateral_out(coin.value, &coin.script_pubkey, &payload, ctx.params)?;
        // ownership of the external collateral is proven by a signed message
        let sign_string = payload.make_sign_string(ctx.params);
        if !ctx.hash_signer.verify_message(&collateral_key, &sign_string, &payload.signature) {
            return Err(ProTxValidationError::Signature);
        }
    }

    check_inputs_hash(tx, &payload.inputs_hash)?;

    if let Some(list) = prev_list {
        // reusing an address is only allowed when it replaces the masternode
        // on the same collateral
        if let Some(holder) = list.get_mn_by_service(&payload.service_address) {
            if holder.collateral_outpoint != payload.collateral_outpoint {
                return Err(ProTxValidationError::DupIpAddressInBlock);
            }
        }
        // keys are never reusable, not even on a replacement
        if list.has_unique_property(&payload.owner_key_hash) {
            return Err(ProTxValidationError::DupOwnerKey);
        }
        if list.has_unique_property(&payload.operator_public_key) {
            return Err(ProTxValidationError::DupOperatorKey);
        }
    }

    Ok(())
}

// Provider update service

fn check_pro_up_serv_tx<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    prev_list: Option<&MasternodeList>,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    let payload = decode_pro_up_serv(tx)?;

    if payload.version == 0 || payload.version > PROVIDER_UPDATE_SERVICE_PAYLOAD_VERSION {
        return Err(ProTxValidationError::BadVersion(payload.version));
    }

    check_service(&payload.service_address, ctx.params)?;
    check_inputs_hash(tx, &payload.inputs_hash)?;

    if let Some(list) = prev_list {
        let mn = list
            .get_mn(&payload.pro_tx_hash)
            .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

        // don't allow moving onto an address already used by another
        if let Some(holder) = list.get_mn_by_service(&payload.service_address) {
            if holder.pro_tx_hash != payload.pro_tx_hash {
                return Err(ProTxValidationError::DupAddress);
            }
        }

        if !payload.script_operator_payout.is_empty() {
            if mn.operator_reward == 0 {
                // no reward share, no payout destination
                return Err(ProTxValidationError::OperatorPayee);
            }
            if !payload.script_operator_payout.is_p2pkh() {
                return Err(ProTxValidationError::OperatorPayee);
            }
        }

        if !ctx.bls.verify(
            &mn.state.operator_public_key,
            &payload.base_payload_hash(),
            &payload.signature,
        ) {
            return Err(ProTxValidationError::Signature);
        }
    }

    Ok(())
}

// Provider update registrar

fn check_pro_up_reg_tx<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    prev_list: Option<&MasternodeList>,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    let payload = decode_pro_up_reg(tx)?;

    if payload.version == 0 || payload.version > PROVIDER_UPDATE_REGISTRAR_PAYLOAD_VERSION {
        return Err(ProTxValidationError::BadVersion(payload.version));
    }
    if payload.provider_mode != 0 {
        return Err(ProTxValidationError::BadMode(payload.provider_mode));
    }

    if payload.operator_public_key.is_null()
        || !ctx.bls.is_valid_public_key(&payload.operator_public_key)
    {
        return Err(ProTxValidationError::OperatorKeyInvalid);
    }
    if payload.voting_key_hash == PubkeyHash::all_zeros() {
        return Err(ProTxValidationError::VotingKeyNull);
    }
    if !payload.script_payout.is_p2pkh() {
        return Err(ProTxValidationError::Payee);
    }

    let payout_dest =
        extract_p2pkh(&payload.script_payout).ok_or(ProTxValidationError::PayeeDest)?;
    if payout_dest == payload.voting_key_hash {
        return Err(ProTxValidationError::PayeeReuse);
    }

    check_inputs_hash(tx, &payload.inputs_hash)?;

    if let Some(list) = prev_list {
        let mn = list
            .get_mn(&payload.pro_tx_hash)
            .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

        if payout_dest == mn.state.owner_key_hash {
            return Err(ProTxValidationError::PayeeReuse);
        }

        // the collateral coin backs an existing masternode, so it must exist
        let coin = ctx
            .coins
            .get_coin(&mn.collateral_outpoint)
            .ok_or(ProTxValidationError::Collateral)?;
        let collateral_dest =
            extract_p2pkh(&coin.script_pubkey).ok_or(ProTxValidationError::CollateralDest)?;
        if collateral_dest == mn.state.owner_key_hash
            || collateral_dest == payload.voting_key_hash
        {
            return Err(ProTxValidationError::CollateralReuse);
        }

        // taking over another masternode's operator key is never allowed
        if let Some(holder) = list.get_unique_property_mn(&payload.operator_public_key) {
            if holder.pro_tx_hash != payload.pro_tx_hash {
                return Err(ProTxValidationError::DupKey);
            }
        }

        if !ctx.hash_signer.verify_hash(
            &mn.state.owner_key_hash,
            &payload.base_payload_hash(),
            &payload.signature,
        ) {
            return Err(ProTxValidationError::Signature);
        }
    }

    Ok(())
}

// Provider update revocation

fn check_pro_up_rev_tx<C: CoinView, H: HashSigVerifier, B: BlsVerifier>(
    tx: &Transaction,
    prev_list: Option<&MasternodeList>,
    ctx: &ValidationContext<'_, C, H, B>,
) -> Result<(), ProTxValidationError> {
    let payload = decode_pro_up_rev(tx)?;

    if payload.version == 0 || payload.version > PROVIDER_UPDATE_REVOCATION_PAYLOAD_VERSION {
        return Err(ProTxValidationError::BadVersion(payload.version));
    }
    if payload.reason > REASON_LAST {
        return Err(ProTxValidationError::Reason(payload.reason));
    }

    check_inputs_hash(tx, &payload.inputs_hash)?;

    if let Some(list) = prev_list {
        let mn = list
            .get_mn(&payload.pro_tx_hash)
            .ok_or(ProTxValidationError::Hash(payload.pro_tx_hash))?;

        if !ctx.bls.verify(
            &mn.state.operator_public_key,
            &payload.base_payload_hash(),
            &payload.signature,
        ) {
            return Err(ProTxValidationError::Signature);
        }
    }

    Ok(())
}

// Payload extraction helpers. Any decoding failure maps to the payload
// rejection.

pub(crate) fn decode_pro_reg(
    tx: &Transaction,
) -> Result<ProviderRegistrationPayload, ProTxValidationError> {
    decode_payload(tx)?
        .to_provider_registration_payload()
        .map_err(|_| ProTxValidationError::BadPayload)
}

pub(crate) fn decode_pro_up_serv(
    tx: &Transaction,
) -> Result<ProviderUpdateServicePayload, ProTxValidationError> {
    decode_payload(tx)?.to_update_service_payload().map_err(|_| ProTxValidationError::BadPayload)
}

pub(crate) fn decode_pro_up_reg(
    tx: &Transaction,
) -> Result<ProviderUpdateRegistrarPayload, ProTxValidationError> {
    decode_payload(tx)?.to_update_registrar_payload().map_err(|_| ProTxValidationError::BadPayload)
}

pub(crate) fn decode_pro_up_rev(
    tx: &Transaction,
) -> Result<ProviderUpdateRevocationPayload, ProTxValidationError> {
    decode_payload(tx)?.to_update_revocation_payload().map_err(|_| ProTxValidationError::BadPayload)
}

fn decode_payload(tx: &Transaction) -> Result<TransactionPayload, ProTxValidationError> {
    tx.special_transaction_payload().map_err(|_| ProTxValidationError::BadPayload)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use assert_matches::assert_matches;

    use crate::test_utils::{
        AcceptAllSigners, MemoryCoins, pro_reg_tx, signed_payload_tx, test_params,
    };
    use crate::transaction::{OutPoint, TxIn, TxOut};

    use super::*;

    fn ctx<'a>(
        params: &'a Params,
        coins: &'a MemoryCoins,
        signers: &'a AcceptAllSigners,
    ) -> ValidationContext<'a, MemoryCoins, AcceptAllSigners, AcceptAllSigners> {
        ValidationContext { params, coins, hash_signer: signers, bls: signers }
    }

    #[test]
    fn service_rules_per_network() {
        let main = Params::main();
        let test = Params::test();
        let regtest = Params::regtest();

        let good_main = ServiceAddress::new(Ipv4Addr::new(8, 8, 8, 8), main.default_port);
        assert!(check_service(&good_main, &main).is_ok());

        // the production port is mandatory on the production network only
        let wrong_port = ServiceAddress::new(Ipv4Addr::new(8, 8, 8, 8), 12345);
        assert_matches!(
            check_service(&wrong_port, &main),
            Err(ProTxValidationError::IpAddressPort)
        );
        assert!(check_service(&wrong_port, &test).is_ok());
        assert_matches!(
            check_service(&good_main, &test),
            Err(ProTxValidationError::IpAddressPort)
        );

        // routability is waived on regtest
        let local = ServiceAddress::new(Ipv4Addr::new(127, 0, 0, 1), 12345);
        assert_matches!(check_service(&local, &test), Err(ProTxValidationError::IpAddress));
        assert!(check_service(&local, &regtest).is_ok());

        let null = ServiceAddress::null();
        assert_matches!(check_service(&null, &regtest), Err(ProTxValidationError::IpAddress));
    }

    #[test]
    fn basic_checks() {
        let params = test_params();
        let mut tx = pro_reg_tx(&params, 1, None);

        // typed transactions need version 2
        tx.version = 1;
        assert_matches!(check_special_tx_basic(&tx), Err(ProTxValidationError::TypeVersion));
        tx.version = 2;

        // and a payload within bounds
        let saved = std::mem::take(&mut tx.extra_payload);
        assert_matches!(check_special_tx_basic(&tx), Err(ProTxValidationError::PayloadEmpty));
        tx.extra_payload = vec![0; MAX_SPECIALTX_EXTRAPAYLOAD + 1];
        assert_matches!(
            check_special_tx_basic(&tx),
            Err(ProTxValidationError::PayloadOversize(_))
        );
        tx.extra_payload = saved;
        assert!(check_special_tx_basic(&tx).is_ok());

        // classic transactions must not carry one
        let mut classic = tx.clone();
        classic.tx_type = TransactionType::Classic;
        assert_matches!(check_special_tx_basic(&classic), Err(ProTxValidationError::TypePayload));

        // coinbase can't be special
        let mut coinbase = tx.clone();
        coinbase.input = vec![TxIn::from_prevout(OutPoint::null())];
        let payload = decode_pro_reg(&tx).unwrap();
        let mut payload = payload;
        payload.inputs_hash = coinbase.hash_inputs();
        coinbase.extra_payload = crate::consensus::serialize(&payload);
        assert_matches!(
            check_special_tx_basic(&coinbase),
            Err(ProTxValidationError::SpecialCoinbase)
        );
    }

    #[test]
    fn pro_reg_payload_rules() {
        let params = test_params();
        let coins = MemoryCoins::default();
        let signers = AcceptAllSigners;
        let ctx = ctx(&params, &coins, &signers);

        let tx = pro_reg_tx(&params, 1, None);
        assert!(check_special_tx_no_context(&tx, &ctx).is_ok());

        // reward above the share total
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.operator_reward = OPERATOR_REWARD_SHARES + 1;
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::OperatorReward(_))
        );

        // payout script must be P2PKH
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.script_payout = ScriptBuf::new();
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::Payee)
        );

        // payout must not reuse the owner key
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.script_payout = ScriptBuf::new_p2pkh(&payload.owner_key_hash);
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::PayeeReuse)
        );

        // null owner key
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.owner_key_hash = PubkeyHash::all_zeros();
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::KeyNull)
        );

        // null operator key
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.operator_public_key = crate::bls_sig_utils::BLSPublicKey::null();
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::OperatorKeyInvalid)
        );
    }

    #[test]
    fn internal_collateral_rules() {
        let params = test_params();
        let coins = MemoryCoins::default();
        let signers = AcceptAllSigners;
        let ctx = ctx(&params, &coins, &signers);

        let tx = pro_reg_tx(&params, 1, None);

        // index past the outputs
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.collateral_outpoint.vout = tx.output.len() as u32;
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::CollateralIndex)
        );

        // wrong collateral value
        let mut bad = tx.clone();
        bad.output[0] = TxOut {
            value: params.collateral_amount - 1,
            script_pubkey: bad.output[0].script_pubkey.clone(),
        };
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.inputs_hash = bad.hash_inputs();
        bad.extra_payload = crate::consensus::serialize(&payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::CollateralAmount)
        );

        // internal collateral implies ownership, a signature is forbidden
        let mut payload = decode_pro_reg(&tx).unwrap();
        payload.signature = vec![1; 65];
        let bad = signed_payload_tx(&tx, &payload);
        assert_matches!(
            check_special_tx_no_context(&bad, &ctx),
            Err(ProTxValidationError::Signature)
        );
    }

    #[test]
    fn inputs_hash_must_match() {
        let params = test_params();
        let coins = MemoryCoins::default();
        let signers = AcceptAllSigners;
        let ctx = ctx(&params, &coins, &signers);

        let mut tx = pro_reg_tx(&params, 1, None);
        // change an input without re-committing
        tx.input.push(TxIn::from_prevout(OutPoint::new(
            crate::hash_types::Txid::from_byte_array([0xEE; 32]),
            0,
        )));
        assert_matches!(
            check_special_tx_no_context(&tx, &ctx),
            Err(ProTxValidationError::InputsHash)
        );
    }

    #[test]
    fn activation_gates_special_txes() {
        let mut params = test_params();
        params.activation_height = 500;
        let coins = MemoryCoins::default();
        let signers = AcceptAllSigners;
        let ctx = ctx(&params, &coins, &signers);
        let list = MasternodeList::default();

        let tx = pro_reg_tx(&params, 1, None);
        assert_matches!(
            check_special_tx(&tx, 499, &list, &ctx),
            Err(ProTxValidationError::UpgradeNotActive)
        );
        assert!(check_special_tx(&tx, 500, &list, &ctx).is_ok());
    }
}
