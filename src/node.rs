//! The node taxonomy (§3/§4.3): `Node` (Blank/Leaf/Extension/Branch) and
//! `ChildRef` (Blank/Hash/Inline), their RLP shape, and the `encode_ref`/
//! `decode_ref` boundary that chooses between the two.

use log::{trace, warn};

use crate::error::TrieError;
use crate::keccak::keccak256;
use crate::nibble;
use crate::rlp::{self, RlpItem};
use crate::store::NodeStore;

/// A decoded trie node. Paths are unpacked nibbles (one nibble per `u8`);
/// hex-prefix packing happens only in [`Node::to_rlp_item`] / [`Node::from_rlp_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Blank,
    Leaf { path: Vec<u8>, value: Vec<u8> },
    Extension { path: Vec<u8>, child: ChildRef },
    Branch { children: Box<[ChildRef; 16]>, value: Option<Vec<u8>> },
}

/// Either the child's own RLP-encoded structure, inlined directly when it is
/// under 32 bytes, or the Keccak-256 hash of it when it is not (I5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRef {
    Blank,
    Hash([u8; 32]),
    Inline(Box<Node>),
}

impl Node {
    pub fn empty_branch() -> Node {
        Node::Branch {
            children: Box::new(std::array::from_fn(|_| ChildRef::Blank)),
            value: None,
        }
    }

    /// The node's canonical RLP shape. A child reference contributes either
    /// its 32-byte hash as a string, or its own node structure nested
    /// directly — never a string wrapping that structure's bytes, which is
    /// what lets [`ChildRef::from_rlp_item`] tell the two apart (§4.3).
    pub fn to_rlp_item(&self) -> RlpItem {
        match self {
            Node::Blank => RlpItem::String(Vec::new()),
            Node::Leaf { path, value } => RlpItem::List(vec![
                RlpItem::String(nibble::pack(path, true)),
                RlpItem::String(value.clone()),
            ]),
            Node::Extension { path, child } => RlpItem::List(vec![
                RlpItem::String(nibble::pack(path, false)),
                child.to_rlp_item(),
            ]),
            Node::Branch { children, value } => {
                let mut items: Vec<RlpItem> = children.iter().map(ChildRef::to_rlp_item).collect();
                items.push(RlpItem::String(value.clone().unwrap_or_default()));
                RlpItem::List(items)
            }
        }
    }

    pub fn from_rlp_item(item: RlpItem) -> Result<Node, TrieError> {
        match item {
            RlpItem::String(bytes) if bytes.is_empty() => Ok(Node::Blank),
            RlpItem::String(_) => Err(TrieError::InvalidNode(
                "top-level node must be the empty string (blank) or a list".into(),
            )),
            RlpItem::List(mut items) => match items.len() {
                2 => {
                    let value_or_child = items.pop().unwrap();
                    let path_item = items.pop().unwrap();
                    let path_bytes = path_item
                        .as_string()
                        .ok_or_else(|| TrieError::InvalidNode("leaf/extension path must be a string".into()))?;
                    let (path, is_leaf) = nibble::unpack(path_bytes)?;
                    if is_leaf {
                        let value = value_or_child
                            .as_string()
                            .ok_or_else(|| TrieError::InvalidNode("leaf value must be a string".into()))?
                            .to_vec();
                        Ok(Node::Leaf { path, value })
                    } else {
                        let child = ChildRef::from_rlp_item(value_or_child)?;
                        Ok(Node::Extension { path, child })
                    }
                }
                17 => {
                    let value_item = items.pop().unwrap();
                    let value = match value_item {
                        RlpItem::String(v) if v.is_empty() => None,
                        RlpItem::String(v) => Some(v),
                        RlpItem::List(_) => {
                            return Err(TrieError::InvalidNode("branch value slot must be a string".into()));
                        }
                    };
                    let mut children: [ChildRef; 16] = std::array::from_fn(|_| ChildRef::Blank);
                    for (slot, item) in children.iter_mut().zip(items.into_iter()) {
                        *slot = ChildRef::from_rlp_item(item)?;
                    }
                    Ok(Node::Branch { children: Box::new(children), value })
                }
                n => Err(TrieError::InvalidNode(format!("node list has invalid arity {n}"))),
            },
        }
    }
}

impl ChildRef {
    fn to_rlp_item(&self) -> RlpItem {
        match self {
            ChildRef::Blank => RlpItem::String(Vec::new()),
            ChildRef::Hash(h) => RlpItem::String(h.to_vec()),
            ChildRef::Inline(node) => node.to_rlp_item(),
        }
    }

    fn from_rlp_item(item: RlpItem) -> Result<ChildRef, TrieError> {
        match item {
            RlpItem::String(bytes) if bytes.is_empty() => Ok(ChildRef::Blank),
            RlpItem::String(bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                Ok(ChildRef::Hash(hash))
            }
            RlpItem::String(bytes) => Err(TrieError::InvalidNode(format!(
                "child reference string has invalid length {}",
                bytes.len()
            ))),
            RlpItem::List(items) => {
                Ok(ChildRef::Inline(Box::new(Node::from_rlp_item(RlpItem::List(items))?)))
            }
        }
    }
}

/// §4.3 `encode_ref`: RLP-encode `node`; if the encoding is under 32 bytes,
/// inline it, otherwise hash it, store the encoding under that hash, and
/// return the hash.
pub fn encode_ref<S: NodeStore>(node: &Node, store: &S) -> Result<ChildRef, TrieError> {
    if matches!(node, Node::Blank) {
        return Ok(ChildRef::Blank);
    }
    let encoded = rlp::encode(&node.to_rlp_item());
    if encoded.len() < 32 {
        Ok(ChildRef::Inline(Box::new(node.clone())))
    } else {
        let hash = keccak256(&encoded);
        trace!("encode_ref: hashing node to 0x{}", hex::encode(hash));
        store.put(hash, encoded).map_err(TrieError::store)?;
        Ok(ChildRef::Hash(hash))
    }
}

/// §4.3 `decode_ref`: the inverse of [`encode_ref`].
pub fn decode_ref<S: NodeStore>(child_ref: &ChildRef, store: &S) -> Result<Node, TrieError> {
    match child_ref {
        ChildRef::Blank => Ok(Node::Blank),
        ChildRef::Inline(node) => Ok((**node).clone()),
        ChildRef::Hash(hash) => {
            let bytes = store.get(hash).map_err(TrieError::store)?.ok_or_else(|| {
                warn!("decode_ref: no store entry for 0x{}", hex::encode(hash));
                TrieError::MissingRoot { hash: *hash }
            })?;
            let item = rlp::decode(&bytes).map_err(|e| TrieError::InvalidNode(e.to_string()))?;
            Node::from_rlp_item(item)
        }
    }
}
