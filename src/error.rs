//! Error taxonomy for trie operations, per the input-validation / store-corruption /
//! store-I/O split: a failing call must never leave `root_node` mutated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrieError {
    /// `key.len() > 32`. Caller bug; the trie is left unchanged.
    #[error("key length {len} exceeds the 32-byte limit")]
    InvalidKeyLength { len: usize },

    /// `Trie::open` was given a non-blank root hash that the store doesn't have.
    #[error("missing root node for hash 0x{}", hex::encode(hash))]
    MissingRoot { hash: [u8; 32] },

    /// A store entry failed to RLP-decode into a well-formed node (wrong arity,
    /// malformed path flag propagated from `InvalidNibble`, etc).
    #[error("corrupted trie node: {0}")]
    InvalidNode(String),

    /// A hex-prefix packed path had unused high bits set, or claimed even parity
    /// while padding a non-zero nibble.
    #[error("invalid hex-prefix nibble encoding")]
    InvalidNibble,

    /// Propagated from the injected `NodeStore` untouched, same atomicity as
    /// `InvalidNode`: the operation fails, `root_node` is preserved.
    #[error("node store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reserved for API parity with the source taxonomy: unreachable through
    /// this crate's typed `&[u8]` signatures, kept only so callers migrating
    /// from a dynamically-typed port have a variant to match on.
    #[error("key must be a byte string")]
    InvalidKeyType,

    /// Reserved for API parity with the source taxonomy: unreachable through
    /// this crate's typed `&[u8]` signatures, kept only so callers migrating
    /// from a dynamically-typed port have a variant to match on.
    #[error("value must be a byte string")]
    InvalidValueType,
}

impl TrieError {
    /// Wraps a [`crate::store::NodeStore`] error, e.g. for `.map_err(TrieError::store)`.
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TrieError::Store(Box::new(err))
    }
}
