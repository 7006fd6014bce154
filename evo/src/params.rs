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

//! Network parameters.
//!
//! Everything the masternode subsystem needs to know about the chain it
//! runs on: the collateral amount, confirmation depth, the default service
//! port, the address version byte and the height the deterministic list
//! becomes consensus.

use crate::base58;
use crate::hash_types::PubkeyHash;

/// One coin in its smallest unit.
pub const COIN: u64 = 100_000_000;

/// The network a node runs on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Network {
    /// The production network.
    Main,
    /// The public test network.
    Test,
    /// Local regression test mode.
    Regtest,
}

/// Consensus and policy parameters of a network.
#[derive(Clone, Debug)]
pub struct Params {
    /// Which network these parameters describe.
    pub network: Network,
    /// The exact value a masternode collateral output must carry.
    pub collateral_amount: u64,
    /// How deep a registration must be buried before the masternode counts
    /// as confirmed (and becomes eligible for quorums).
    pub masternode_min_confirmations: i32,
    /// The port masternodes serve on. Mandatory on the production network,
    /// forbidden elsewhere.
    pub default_port: u16,
    /// The version byte of pay-to-pubkey-hash addresses.
    pub pubkey_address_prefix: u8,
    /// The height at which the deterministic masternode list upgrade
    /// enforces. Special transactions are invalid below it.
    pub activation_height: i32,
}

impl Params {
    /// Production network parameters.
    pub fn main() -> Self {
        Params {
            network: Network::Main,
            collateral_amount: 10_000 * COIN,
            masternode_min_confirmations: 15,
            default_port: 46003,
            pubkey_address_prefix: 30,
            activation_height: 1_500_000,
        }
    }

    /// Test network parameters.
    pub fn test() -> Self {
        Params {
            network: Network::Test,
            collateral_amount: 10_000 * COIN,
            masternode_min_confirmations: 15,
            default_port: 46005,
            pubkey_address_prefix: 139,
            activation_height: 1_100_000,
        }
    }

    /// Regression test parameters. The upgrade is active from the first
    /// block and confirmation takes a single block.
    pub fn regtest() -> Self {
        Params {
            network: Network::Regtest,
            collateral_amount: 10_000 * COIN,
            masternode_min_confirmations: 1,
            default_port: 46004,
            pubkey_address_prefix: 139,
            activation_height: 1,
        }
    }

    /// Whether this is the regression test network.
    pub fn is_regtest(&self) -> bool {
        self.network == Network::Regtest
    }

    /// Whether the deterministic list upgrade is enforced at `height`.
    pub fn is_active(&self, height: i32) -> bool {
        height >= self.activation_height
    }

    /// Whether `height` is exactly the enforcement height.
    pub fn is_activation_height(&self, height: i32) -> bool {
        height == self.activation_height
    }

    /// Renders a key hash as an address under this network's version byte.
    pub fn encode_p2pkh_address(&self, pubkey_hash: &PubkeyHash) -> String {
        base58::encode_p2pkh_address(self.pubkey_address_prefix, pubkey_hash)
    }
}
