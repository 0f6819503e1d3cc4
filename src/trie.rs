//! The trie engine: §4.4 `update`, §4.5 `delete`, §4.6 `get`, §4.7 `root_hash`.
//!
//! Every mutating call builds its replacement root *functionally* before
//! ever touching `self.root` — a failing operation can't leave the trie
//! half-mutated (§7).

use log::debug;

use crate::error::TrieError;
use crate::keccak::keccak256;
use crate::nibble;
use crate::node::{decode_ref, encode_ref, ChildRef, Node};
use crate::rlp;
use crate::store::NodeStore;

/// Keccak-256 of the RLP encoding of the empty string — the root hash of a
/// trie with no entries (§4.7/P4).
pub const BLANK_ROOT_HASH: [u8; 32] = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// The root hash a `Trie` is opened or reports as — `Blank` or a concrete
/// 32-byte commitment. A zero-length hash is treated as `Blank` (DESIGN.md,
/// "Type check of root_hash length").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootHash {
    Blank,
    Hash([u8; 32]),
}

impl RootHash {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrieError> {
        match bytes.len() {
            0 => Ok(RootHash::Blank),
            32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(bytes);
                Ok(RootHash::Hash(hash))
            }
            n => Err(TrieError::InvalidNode(format!("root hash must be 0 or 32 bytes, got {n}"))),
        }
    }
}

/// A Merkle Patricia Trie over an injected [`NodeStore`].
///
/// Single-threaded, non-reentrant: concurrent calls on one instance are
/// undefined, and the engine never opens, closes, or locks its store (§5).
pub struct Trie<S: NodeStore> {
    store: S,
    root: Node,
}

impl<S: NodeStore> Trie<S> {
    /// Opens a trie over `store` at `root`. If `root` is non-blank and the
    /// store doesn't have it, fails with [`TrieError::MissingRoot`].
    pub fn open(store: S, root: RootHash) -> Result<Self, TrieError> {
        let root_node = match root {
            RootHash::Blank => Node::Blank,
            RootHash::Hash(hash) => {
                let bytes = store
                    .get(&hash)
                    .map_err(TrieError::store)?
                    .ok_or(TrieError::MissingRoot { hash })?;
                let item = rlp::decode(&bytes).map_err(|e| TrieError::InvalidNode(e.to_string()))?;
                Node::from_rlp_item(item)?
            }
        };
        Ok(Trie { store, root: root_node })
    }

    /// Opens a trie over a fresh, empty `store`.
    pub fn new(store: S) -> Self {
        Trie { store, root: Node::Blank }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `len(key) <= 32`; an empty `value` is equivalent to `delete(key)`.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        check_key_len(key)?;
        if value.is_empty() {
            return self.delete(key);
        }
        let path = nibble::to_nibbles(key);
        let new_root = update_node(&self.root, &path, value, &self.store)?;
        self.root = new_root;
        debug!("update: root replaced");
        Ok(())
    }

    /// `len(key) <= 32`; deleting a missing key is a no-op.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), TrieError> {
        check_key_len(key)?;
        let path = nibble::to_nibbles(key);
        let new_root = delete_node(&self.root, &path, &self.store)?;
        self.root = new_root;
        debug!("delete: root replaced");
        Ok(())
    }

    /// Returns the empty byte string on a miss.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>, TrieError> {
        check_key_len(key)?;
        let path = nibble::to_nibbles(key);
        Ok(get_node(&self.root, &path, &self.store)?.unwrap_or_default())
    }

    pub fn root_hash(&self) -> [u8; 32] {
        let encoded = rlp::encode(&self.root.to_rlp_item());
        let hash = keccak256(&encoded);
        debug!("root_hash: 0x{}", hex::encode(hash));
        hash
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Reclaims the underlying store, e.g. to reopen it at a different root.
    pub fn into_store(self) -> S {
        self.store
    }
}

fn check_key_len(key: &[u8]) -> Result<(), TrieError> {
    if key.len() > 32 {
        Err(TrieError::InvalidKeyLength { len: key.len() })
    } else {
        Ok(())
    }
}

/// The "shorten a Leaf/Extension's remaining path" rule shared by update
/// Case C and Case D: a Leaf shortens to the tail of its own path, an
/// Extension with exactly one remaining nibble hands its child reference
/// straight to the branch slot (I3 — never build an Extension with an
/// empty path), otherwise it shortens to the tail like a Leaf.
fn shorten_current<S: NodeStore>(node: &Node, rc: &[u8], store: &S) -> Result<ChildRef, TrieError> {
    match node {
        Node::Leaf { value, .. } => {
            let shortened = Node::Leaf { path: rc[1..].to_vec(), value: value.clone() };
            encode_ref(&shortened, store)
        }
        Node::Extension { child, .. } => {
            if rc.len() == 1 {
                Ok(child.clone())
            } else {
                let shortened = Node::Extension { path: rc[1..].to_vec(), child: child.clone() };
                encode_ref(&shortened, store)
            }
        }
        _ => unreachable!("shorten_current is only called on a Leaf or Extension"),
    }
}

/// Wraps `branch` in an `Extension(cpath[..k], ..)` when the two diverging
/// paths shared a non-empty prefix, otherwise returns it unwrapped.
fn wrap_with_prefix<S: NodeStore>(branch: Node, prefix: &[u8], store: &S) -> Result<Node, TrieError> {
    if prefix.is_empty() {
        Ok(branch)
    } else {
        let child = encode_ref(&branch, store)?;
        Ok(Node::Extension { path: prefix.to_vec(), child })
    }
}

fn update_node<S: NodeStore>(node: &Node, path: &[u8], value: &[u8], store: &S) -> Result<Node, TrieError> {
    match node {
        Node::Blank => Ok(Node::Leaf { path: path.to_vec(), value: value.to_vec() }),

        Node::Branch { children, value: branch_value } => {
            let mut children = children.clone();
            let mut branch_value = branch_value.clone();
            if path.is_empty() {
                branch_value = Some(value.to_vec());
            } else {
                let i = path[0] as usize;
                let child_node = decode_ref(&children[i], store)?;
                let new_child = update_node(&child_node, &path[1..], value, store)?;
                children[i] = encode_ref(&new_child, store)?;
            }
            Ok(Node::Branch { children, value: branch_value })
        }

        Node::Leaf { path: cpath, value: cvalue } => {
            let k = nibble::common_prefix_len(cpath, path);
            let rk = &path[k..];
            let rc = &cpath[k..];

            if rk.is_empty() && rc.is_empty() {
                return Ok(Node::Leaf { path: cpath.clone(), value: value.to_vec() });
            }

            let mut branch = Node::empty_branch();
            if let Node::Branch { children, value: branch_value } = &mut branch {
                if rc.is_empty() {
                    // Case B: current path exhausted, new path continues.
                    *branch_value = Some(cvalue.clone());
                    let leaf = Node::Leaf { path: rk[1..].to_vec(), value: value.to_vec() };
                    children[rk[0] as usize] = encode_ref(&leaf, store)?;
                } else if rk.is_empty() {
                    // Case C: new path is a strict prefix of the current one.
                    *branch_value = Some(value.to_vec());
                    children[rc[0] as usize] = shorten_current(node, rc, store)?;
                } else {
                    // Case D: both remainders diverge.
                    children[rc[0] as usize] = shorten_current(node, rc, store)?;
                    let leaf = Node::Leaf { path: rk[1..].to_vec(), value: value.to_vec() };
                    children[rk[0] as usize] = encode_ref(&leaf, store)?;
                }
            }
            wrap_with_prefix(branch, &cpath[..k], store)
        }

        Node::Extension { path: cpath, child } => {
            let k = nibble::common_prefix_len(cpath, path);
            let rk = &path[k..];
            let rc = &cpath[k..];

            if rc.is_empty() {
                // Cases A/B collapse for an Extension: the whole shared
                // prefix is consumed, recurse into the child with whatever
                // remains (possibly nothing) and keep the same outer path.
                let child_node = decode_ref(child, store)?;
                let new_child = update_node(&child_node, rk, value, store)?;
                let new_ref = encode_ref(&new_child, store)?;
                return Ok(Node::Extension { path: cpath.clone(), child: new_ref });
            }

            let mut branch = Node::empty_branch();
            if let Node::Branch { children, value: branch_value } = &mut branch {
                if rk.is_empty() {
                    // Case C: new path is a strict prefix of the current one.
                    *branch_value = Some(value.to_vec());
                    children[rc[0] as usize] = shorten_current(node, rc, store)?;
                } else {
                    // Case D: both remainders diverge.
                    children[rc[0] as usize] = shorten_current(node, rc, store)?;
                    let leaf = Node::Leaf { path: rk[1..].to_vec(), value: value.to_vec() };
                    children[rk[0] as usize] = encode_ref(&leaf, store)?;
                }
            }
            wrap_with_prefix(branch, &cpath[..k], store)
        }
    }
}

fn get_node<S: NodeStore>(node: &Node, path: &[u8], store: &S) -> Result<Option<Vec<u8>>, TrieError> {
    match node {
        Node::Blank => Ok(None),
        Node::Leaf { path: cpath, value } => {
            if path == cpath.as_slice() {
                Ok(Some(value.clone()))
            } else {
                Ok(None)
            }
        }
        Node::Extension { path: cpath, child } => {
            if !path.starts_with(cpath.as_slice()) {
                return Ok(None);
            }
            let child_node = decode_ref(child, store)?;
            get_node(&child_node, &path[cpath.len()..], store)
        }
        Node::Branch { children, value } => {
            if path.is_empty() {
                return Ok(value.clone());
            }
            let child_node = decode_ref(&children[path[0] as usize], store)?;
            get_node(&child_node, &path[1..], store)
        }
    }
}

fn delete_node<S: NodeStore>(node: &Node, path: &[u8], store: &S) -> Result<Node, TrieError> {
    match node {
        Node::Blank => Ok(Node::Blank),

        Node::Leaf { path: cpath, .. } => {
            if path == cpath.as_slice() {
                Ok(Node::Blank)
            } else {
                Ok(node.clone())
            }
        }

        Node::Extension { path: cpath, child } => {
            if !path.starts_with(cpath.as_slice()) {
                return Ok(node.clone());
            }
            let child_node = decode_ref(child, store)?;
            let new_child = delete_node(&child_node, &path[cpath.len()..], store)?;

            match new_child {
                Node::Blank => Ok(Node::Blank),
                Node::Leaf { path: np, value: nv } => {
                    Ok(Node::Leaf { path: concat(cpath, &np), value: nv })
                }
                Node::Extension { path: np, child: nc } => {
                    Ok(Node::Extension { path: concat(cpath, &np), child: nc })
                }
                Node::Branch { .. } => {
                    let new_ref = encode_ref(&new_child, store)?;
                    Ok(Node::Extension { path: cpath.clone(), child: new_ref })
                }
            }
        }

        Node::Branch { children, value } => {
            let mut children = children.clone();
            let mut value = value.clone();
            if path.is_empty() {
                value = None;
            } else {
                let i = path[0] as usize;
                let child_node = decode_ref(&children[i], store)?;
                let new_child = delete_node(&child_node, &path[1..], store)?;
                children[i] = encode_ref(&new_child, store)?;
            }
            normalize_branch(*children, value, store)
        }
    }
}

fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// §4.5 "Normalize branch": enforces I1 after a branch slot turns blank.
fn normalize_branch<S: NodeStore>(
    children: [ChildRef; 16],
    value: Option<Vec<u8>>,
    store: &S,
) -> Result<Node, TrieError> {
    let non_blank: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| !matches!(c, ChildRef::Blank))
        .map(|(i, _)| i)
        .collect();
    let count = non_blank.len() + usize::from(value.is_some());

    if count > 1 {
        return Ok(Node::Branch { children: Box::new(children), value });
    }
    if count == 0 {
        return Ok(Node::Blank);
    }
    if let Some(v) = value {
        return Ok(Node::Leaf { path: Vec::new(), value: v });
    }

    let j = non_blank[0];
    let child_node = decode_ref(&children[j], store)?;
    match child_node {
        Node::Leaf { path, value } => Ok(Node::Leaf { path: concat(&[j as u8], &path), value }),
        Node::Extension { path, child } => {
            Ok(Node::Extension { path: concat(&[j as u8], &path), child })
        }
        Node::Branch { .. } => {
            let new_ref = encode_ref(&child_node, store)?;
            Ok(Node::Extension { path: vec![j as u8], child: new_ref })
        }
        Node::Blank => unreachable!("a non-blank slot decoded to a blank node"),
    }
}
