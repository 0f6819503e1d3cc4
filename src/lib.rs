//! A Merkle Patricia Trie implementing the Ethereum Yellow Paper's
//! authenticated key-value map: hex-prefix path encoding, RLP serialization,
//! Keccak-256 commitments, and a content-addressed node store behind the
//! [`store::NodeStore`] trait.

pub mod display;
pub mod error;
pub mod keccak;
pub mod nibble;
pub mod node;
pub mod rlp;
pub mod store;
pub mod trie;

pub use error::TrieError;
pub use node::{ChildRef, Node};
pub use store::{MemoryNodeStore, NodeStore, SledNodeStore};
pub use trie::{RootHash, Trie};
