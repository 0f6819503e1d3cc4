//! Content-addressed node store: `hash32 -> rlp_bytes`, injected into a
//! [`crate::trie::Trie`] at construction rather than opened through a
//! process-wide singleton (see DESIGN.md, "Singleton store").

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Mutex;

use log::trace;

/// `get`/`put`/`delete` over 32-byte Keccak hashes. `put` is an idempotent
/// upsert (a node always hashes to the same key); `delete` is best-effort —
/// a missing entry is not an error. Implementations take `&self`: the store
/// may be shared by several `Trie`s, which must serialize their own writers.
pub trait NodeStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, hash: &[u8; 32]) -> Result<Option<Vec<u8>>, Self::Error>;
    fn put(&self, hash: [u8; 32], bytes: Vec<u8>) -> Result<(), Self::Error>;
    fn delete(&self, hash: &[u8; 32]) -> Result<(), Self::Error>;
}

/// A `sled`-backed [`NodeStore`]. `open`/lifetime is explicit and scoped by
/// the caller; the trie engine never opens or closes it.
#[derive(Debug, Clone)]
pub struct SledNodeStore {
    tree: sled::Tree,
}

impl SledNodeStore {
    pub fn open(path: impl AsRef<Path>, tree_name: &str) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        let tree = db.open_tree(tree_name.as_bytes())?;
        Ok(Self { tree })
    }
}

impl NodeStore for SledNodeStore {
    type Error = sled::Error;

    fn get(&self, hash: &[u8; 32]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.tree.get(hash)?.map(|ivec| ivec.to_vec()))
    }

    fn put(&self, hash: [u8; 32], bytes: Vec<u8>) -> Result<(), Self::Error> {
        trace!("store put 0x{} ({} bytes)", hex::encode(hash), bytes.len());
        self.tree.insert(hash, bytes)?;
        Ok(())
    }

    fn delete(&self, hash: &[u8; 32]) -> Result<(), Self::Error> {
        trace!("store delete 0x{}", hex::encode(hash));
        self.tree.remove(hash)?;
        Ok(())
    }
}

/// An in-memory [`NodeStore`], useful for tests and for tries that never
/// outlive a single process.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    entries: Mutex<HashMap<[u8; 32], Vec<u8>>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStore for MemoryNodeStore {
    type Error = Infallible;

    fn get(&self, hash: &[u8; 32]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.entries.lock().unwrap().get(hash).cloned())
    }

    fn put(&self, hash: [u8; 32], bytes: Vec<u8>) -> Result<(), Self::Error> {
        self.entries.lock().unwrap().insert(hash, bytes);
        Ok(())
    }

    fn delete(&self, hash: &[u8; 32]) -> Result<(), Self::Error> {
        self.entries.lock().unwrap().remove(hash);
        Ok(())
    }
}
