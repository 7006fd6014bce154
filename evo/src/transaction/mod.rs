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

//! Transactions.
//!
//! A minimal transaction model carrying everything the masternode subsystem
//! needs: inputs (for the collateral-spend sweep and the inputs hash),
//! outputs (for internal collaterals), the type tag, and the opaque extra
//! payload that special transactions append.

pub mod special;

use std::fmt;
use std::io::{self, Write};

use crate::consensus::{Decodable, Encodable, VarInt, encode};
use crate::hash_types::{InputsHash, Txid};
use crate::hashes::Hash;
use crate::script::ScriptBuf;
use crate::transaction::special::{TransactionPayload, TransactionType};

/// A reference to a transaction output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OutPoint {
    /// The transaction creating the output.
    pub txid: Txid,
    /// The index of the output within that transaction.
    pub vout: u32,
}

impl OutPoint {
    /// Creates a new outpoint.
    pub const fn new(txid: Txid, vout: u32) -> Self {
        OutPoint { txid, vout }
    }

    /// The "null" outpoint. A registration payload uses it (with a real
    /// index) to point at an output of its own transaction.
    pub fn null() -> Self {
        OutPoint { txid: Txid::all_zeros(), vout: u32::MAX }
    }

    /// Whether the referenced transaction hash is the null sentinel.
    pub fn has_null_txid(&self) -> bool {
        self.txid == Txid::all_zeros()
    }

    /// Whether this is the fully null outpoint.
    pub fn is_null(&self) -> bool {
        self.has_null_txid() && self.vout == u32::MAX
    }
}

impl Default for OutPoint {
    fn default() -> Self {
        OutPoint::null()
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl_consensus_encoding!(OutPoint, txid, vout);

/// A transaction input.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxIn {
    /// The output being spent.
    pub prevout: OutPoint,
    /// The unlocking script.
    pub script_sig: ScriptBuf,
    /// The sequence number.
    pub sequence: u32,
}

impl TxIn {
    /// Creates an input spending `prevout` with an empty unlocking script.
    pub fn from_prevout(prevout: OutPoint) -> Self {
        TxIn { prevout, script_sig: ScriptBuf::new(), sequence: u32::MAX }
    }
}

impl_consensus_encoding!(TxIn, prevout, script_sig, sequence);

/// A transaction output.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxOut {
    /// The value of the output, in the smallest unit.
    pub value: u64,
    /// The locking script.
    pub script_pubkey: ScriptBuf,
}

impl_consensus_encoding!(TxOut, value, script_pubkey);

/// A transaction, optionally carrying a special transaction payload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    /// The transaction format version. Special transactions require at
    /// least version 2.
    pub version: u16,
    /// The special transaction type tag.
    pub tx_type: TransactionType,
    /// The inputs.
    pub input: Vec<TxIn>,
    /// The outputs.
    pub output: Vec<TxOut>,
    /// Block height or timestamp before which the transaction is not final.
    pub lock_time: u32,
    /// The serialized special transaction payload. Empty on classic
    /// transactions, non-empty (possibly malformed) on typed ones; only
    /// typed transactions serialize it.
    pub extra_payload: Vec<u8>,
}

impl Transaction {
    /// Computes the transaction id: the double-SHA256 of the serialized
    /// transaction.
    pub fn txid(&self) -> Txid {
        let mut engine = Txid::engine();
        self.consensus_encode(&mut engine).expect("engines don't error");
        Txid::from_engine(engine)
    }

    /// Whether this is the block-subsidy transaction.
    pub fn is_coinbase(&self) -> bool {
        self.input.len() == 1 && self.input[0].prevout.is_null()
    }

    /// Whether the transaction carries a type tag other than classic.
    pub fn is_special(&self) -> bool {
        self.tx_type != TransactionType::Classic
    }

    /// Whether an extra payload is attached.
    pub fn has_extra_payload(&self) -> bool {
        !self.extra_payload.is_empty()
    }

    /// Hashes all input outpoints. Provider payloads embed this value so a
    /// signed payload cannot be replayed on a transaction with different
    /// inputs.
    pub fn hash_inputs(&self) -> InputsHash {
        let mut engine = InputsHash::engine();
        for input in &self.input {
            input
                .prevout
                .consensus_encode(&mut engine)
                .expect("engines don't error");
        }
        InputsHash::from_engine(engine)
    }

    /// Decodes the attached special transaction payload.
    ///
    /// Fails if no payload is attached, if the payload is malformed, or if
    /// decoding does not consume the payload exactly.
    pub fn special_transaction_payload(&self) -> Result<TransactionPayload, encode::Error> {
        if self.extra_payload.is_empty() {
            return Err(encode::Error::ParseFailed("special transaction without extra payload"));
        }
        TransactionPayload::decode_for_type(self.tx_type, &self.extra_payload)
    }

    /// If this is a provider registration, returns the collateral outpoint
    /// it locks: the referenced external outpoint, or the matching output of
    /// this very transaction. Used by the transaction pool to track
    /// collateral conflicts.
    pub fn pro_reg_collateral(&self) -> Option<OutPoint> {
        if self.tx_type != TransactionType::ProviderRegistration {
            return None;
        }
        let payload = self.special_transaction_payload().ok()?;
        let registration = payload.to_provider_registration_payload().ok()?;
        Some(if registration.collateral_outpoint.has_null_txid() {
            OutPoint::new(self.txid(), registration.collateral_outpoint.vout)
        } else {
            registration.collateral_outpoint
        })
    }
}

impl Encodable for Transaction {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        len += self.version.consensus_encode(writer)?;
        len += self.tx_type.consensus_encode(writer)?;
        len += VarInt(self.input.len() as u64).consensus_encode(writer)?;
        for input in &self.input {
            len += input.consensus_encode(writer)?;
        }
        len += VarInt(self.output.len() as u64).consensus_encode(writer)?;
        for output in &self.output {
            len += output.consensus_encode(writer)?;
        }
        len += self.lock_time.consensus_encode(writer)?;
        if self.tx_type != TransactionType::Classic {
            len += self.extra_payload.consensus_encode(writer)?;
        }
        Ok(len)
    }
}

impl Decodable for Transaction {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let tx_type = TransactionType::consensus_decode(reader)?;
        let input_count = VarInt::consensus_decode(reader)?.0 as usize;
        if input_count > encode::MAX_VEC_SIZE {
            return Err(encode::Error::OversizedVectorAllocation {
                requested: input_count,
                max: encode::MAX_VEC_SIZE,
            });
        }
        let mut input = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            input.push(TxIn::consensus_decode(reader)?);
        }
        let output_count = VarInt::consensus_decode(reader)?.0 as usize;
        if output_count > encode::MAX_VEC_SIZE {
            return Err(encode::Error::OversizedVectorAllocation {
                requested: output_count,
                max: encode::MAX_VEC_SIZE,
            });
        }
        let mut output = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            output.push(TxOut::consensus_decode(reader)?);
        }
        let lock_time = u32::consensus_decode(reader)?;
        let extra_payload = if tx_type != TransactionType::Classic {
            Vec::<u8>::consensus_decode(reader)?
        } else {
            Vec::new()
        };
        Ok(Transaction { version, tx_type, input, output, lock_time, extra_payload })
    }
}
