//! The block storage driver.
//!
//! Encoded values larger than a scalar live in *blocks*: standalone byte
//! sequences keyed by a [`StorageId`] minted monotonically from 1 within one
//! storage instance. The identifier space is per account; the mint order is
//! part of the deterministic encoding contract, so callers must serialize
//! codec invocations against a single storage instance.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use crate::error::EncodingError;

/// Opaque 64-bit handle for a block within one storage instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(pub u64);

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageId({})", self.0)
    }
}

/// Block storage as the codec sees it.
///
/// All methods are synchronous: a codec invocation is a straight-line
/// traversal and any I/O behind these calls must complete before they
/// return. Implementations are free to serialize internally.
pub trait Storage {
    /// Mints the next block identifier. Identifiers start at 1 and are
    /// claimed in depth-first encounter order during encoding.
    fn allocate(&self) -> StorageId;

    /// Persists an encoded block under an identifier.
    fn write(&self, id: StorageId, block: Bytes) -> Result<(), EncodingError>;

    /// Fetches a block by identifier.
    fn read(&self, id: StorageId) -> Result<Bytes, EncodingError>;
}

/// In-memory block storage.
///
/// A freshly constructed storage is empty and mints identifiers from 1;
/// persisting a root value produces blocks `1..=k`.
#[derive(Debug)]
pub struct InMemoryStorage {
    blocks: DashMap<StorageId, Bytes>,
    next_id: AtomicU64,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            blocks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn contains(&self, id: StorageId) -> bool {
        self.blocks.contains_key(&id)
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn allocate(&self) -> StorageId {
        StorageId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn write(&self, id: StorageId, block: Bytes) -> Result<(), EncodingError> {
        debug!(id = %id, len = block.len(), "write block");
        self.blocks.insert(id, block);
        Ok(())
    }

    fn read(&self, id: StorageId) -> Result<Bytes, EncodingError> {
        self.blocks
            .get(&id)
            .map(|block| block.value().clone())
            .ok_or(EncodingError::MissingBlock(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_minted_from_one() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.allocate(), StorageId(1));
        assert_eq!(storage.allocate(), StorageId(2));
        assert_eq!(storage.allocate(), StorageId(3));
    }

    #[test]
    fn fresh_storage_is_empty() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.block_count(), 0);
    }

    #[test]
    fn write_then_read() {
        let storage = InMemoryStorage::new();
        let id = storage.allocate();
        storage.write(id, Bytes::from_static(&[0xf6])).unwrap();
        assert_eq!(storage.read(id).unwrap().as_ref(), &[0xf6]);
    }

    #[test]
    fn missing_block_fails() {
        let storage = InMemoryStorage::new();
        let result = storage.read(StorageId(7));
        assert!(matches!(
            result,
            Err(EncodingError::MissingBlock(StorageId(7)))
        ));
    }
}
