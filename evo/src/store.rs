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

//! Persistent storage of masternode lists.
//!
//! The list manager writes a diff per block plus a full snapshot at a fixed
//! interval; keys are a one-byte tag paired with the block hash. Records
//! hold consensus-encoded values, so the database itself stays a dumb
//! byte store.

use std::collections::BTreeMap;
use std::fmt;

use crate::consensus::{Decodable, Encodable, encode, deserialize, serialize};
use crate::hash_types::BlockHash;

/// Record tag of a full masternode list snapshot.
pub const DB_LIST_SNAPSHOT: u8 = b'S';
/// Record tag of a per-block masternode list diff.
pub const DB_LIST_DIFF: u8 = b'D';
/// Record tag of the best-block marker.
pub const DB_BEST_BLOCK: u8 = b'B';

/// A storage failure reported by the backing database.
#[derive(Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// The key-value store backing the list manager.
///
/// Implementations must be consistent: a successful write is visible to
/// every later read until erased.
pub trait EvoDb {
    /// Reads the raw record at `(tag, block_hash)`.
    fn read(&self, tag: u8, block_hash: &BlockHash) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes the raw record at `(tag, block_hash)`.
    fn write(&mut self, tag: u8, block_hash: &BlockHash, value: Vec<u8>)
    -> Result<(), StorageError>;

    /// Erases the record at `(tag, block_hash)`, if present.
    fn erase(&mut self, tag: u8, block_hash: &BlockHash) -> Result<(), StorageError>;
}

/// Typed read helper: decodes the record at `(tag, block_hash)`.
pub fn read_record<D: EvoDb + ?Sized, T: Decodable>(
    db: &D,
    tag: u8,
    block_hash: &BlockHash,
) -> Result<Option<T>, ReadError> {
    match db.read(tag, block_hash)? {
        Some(raw) => Ok(Some(deserialize(&raw)?)),
        None => Ok(None),
    }
}

/// Typed write helper: consensus-encodes `value` into `(tag, block_hash)`.
pub fn write_record<D: EvoDb + ?Sized, T: Encodable>(
    db: &mut D,
    tag: u8,
    block_hash: &BlockHash,
    value: &T,
) -> Result<(), StorageError> {
    db.write(tag, block_hash, serialize(value))
}

/// A failed typed read: either the database failed or the record did not
/// decode.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The backing database reported a failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The record was present but malformed.
    #[error("corrupt record: {0}")]
    Corrupt(#[from] encode::Error),
}

/// An in-memory [`EvoDb`], used in tests and by hosts that keep their own
/// durability layer.
#[derive(Default)]
pub struct MemoryEvoDb {
    records: BTreeMap<(u8, BlockHash), Vec<u8>>,
}

impl MemoryEvoDb {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for MemoryEvoDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryEvoDb({} records)", self.records.len())
    }
}

impl EvoDb for MemoryEvoDb {
    fn read(&self, tag: u8, block_hash: &BlockHash) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.get(&(tag, *block_hash)).cloned())
    }

    fn write(
        &mut self,
        tag: u8,
        block_hash: &BlockHash,
        value: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.records.insert((tag, *block_hash), value);
        Ok(())
    }

    fn erase(&mut self, tag: u8, block_hash: &BlockHash) -> Result<(), StorageError> {
        self.records.remove(&(tag, *block_hash));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::hashes::Hash;

    use super::*;

    #[test]
    fn memory_db_roundtrip() {
        let mut db = MemoryEvoDb::new();
        let hash = BlockHash::hash(b"block");
        write_record(&mut db, DB_LIST_DIFF, &hash, &42u32).unwrap();
        let value: Option<u32> = read_record(&db, DB_LIST_DIFF, &hash).unwrap();
        assert_eq!(value, Some(42));

        // records are keyed by tag as well as hash
        let missing: Option<u32> = read_record(&db, DB_LIST_SNAPSHOT, &hash).unwrap();
        assert!(missing.is_none());

        db.erase(DB_LIST_DIFF, &hash).unwrap();
        let erased: Option<u32> = read_record(&db, DB_LIST_DIFF, &hash).unwrap();
        assert!(erased.is_none());
    }

    #[test]
    fn corrupt_record_is_reported() {
        let mut db = MemoryEvoDb::new();
        let hash = BlockHash::hash(b"block");
        db.write(DB_LIST_SNAPSHOT, &hash, vec![0xFF]).unwrap();
        let result: Result<Option<u32>, ReadError> = read_record(&db, DB_LIST_SNAPSHOT, &hash);
        assert!(matches!(result, Err(ReadError::Corrupt(_))));
    }
}
