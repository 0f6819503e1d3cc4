//! Tree pretty-printing, adapted from the teacher's `utils::display` to the
//! new `Node`/`ChildRef` shape. Resolving a `ChildRef::Hash` needs a store,
//! so printing goes through a free function rather than a bare `Display` impl.

use std::fmt;

use crate::node::{ChildRef, Node};
use crate::store::NodeStore;

/// Renders `node` as an indented tree, following `Hash` children through `store`.
pub fn format_tree<S: NodeStore>(node: &Node, store: &S) -> String {
    let mut out = String::new();
    fmt_indent(node, store, &mut out, 0);
    out
}

fn fmt_indent<S: NodeStore>(node: &Node, store: &S, out: &mut String, indent: usize) {
    use fmt::Write;
    let prefix = "  ".repeat(indent);
    match node {
        Node::Blank => {
            let _ = writeln!(out, "{prefix}Blank");
        }
        Node::Leaf { path, value } => {
            let _ = writeln!(out, "{prefix}Leaf: {path:?} -> {value:?}");
        }
        Node::Extension { path, child } => {
            let _ = writeln!(out, "{prefix}Extension: {path:?}");
            fmt_child(child, store, out, indent + 1);
        }
        Node::Branch { children, value } => {
            let _ = writeln!(out, "{prefix}Branch:");
            for (i, child) in children.iter().enumerate() {
                if !matches!(child, ChildRef::Blank) {
                    let _ = writeln!(out, "{prefix}  [{i:x}]:");
                    fmt_child(child, store, out, indent + 2);
                }
            }
            if let Some(v) = value {
                let _ = writeln!(out, "{prefix}  Value: {v:?}");
            }
        }
    }
}

fn fmt_child<S: NodeStore>(child: &ChildRef, store: &S, out: &mut String, indent: usize) {
    use fmt::Write;
    match child {
        ChildRef::Blank => {
            let _ = writeln!(out, "{}Blank", "  ".repeat(indent));
        }
        ChildRef::Inline(node) => fmt_indent(node, store, out, indent),
        ChildRef::Hash(hash) => {
            let decoded = store
                .get(hash)
                .ok()
                .flatten()
                .and_then(|bytes| crate::rlp::decode(&bytes).ok())
                .and_then(|item| Node::from_rlp_item(item).ok());
            match decoded {
                Some(node) => fmt_indent(&node, store, out, indent),
                None => {
                    let _ = writeln!(out, "{}<unresolved node 0x{}>", "  ".repeat(indent), hex::encode(hash));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryNodeStore;
    use crate::trie::Trie;

    #[test]
    fn format_tree_mentions_every_inserted_key_shape() {
        let mut trie = Trie::new(MemoryNodeStore::new());
        trie.update(b"do", b"verb").unwrap();
        trie.update(b"dog", b"puppy").unwrap();
        let rendered = format_tree(trie.root(), trie.store());
        assert!(rendered.contains("Leaf") || rendered.contains("Extension") || rendered.contains("Branch"));
    }

    #[test]
    fn format_tree_of_blank_trie() {
        let trie = Trie::new(MemoryNodeStore::new());
        assert_eq!(format_tree(trie.root(), trie.store()).trim(), "Blank");
    }
}
