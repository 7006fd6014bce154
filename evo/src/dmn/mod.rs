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

//! Deterministic masternode lists.
//!
//! The registry every node derives identically from the chain: masternode
//! entries and their mutable state, the versioned list with its unique
//! property indexes, diffs between list versions, special transaction
//! validation, and the manager that applies blocks and persists the
//! result.

pub mod entry;
pub mod list;
pub mod manager;
pub mod state;
pub mod validation;

pub use entry::DeterministicMasternode;
pub use list::{MasternodeList, MasternodeListDiff};
pub use manager::{DeterministicMnManager, LegacyBridge, MasternodeListListener};
pub use state::{MasternodeState, MasternodeStateDiff};
