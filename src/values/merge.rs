// src/values/merge.rs

//! Right-biased deep merge and dotted-key expansion.

use std::collections::BTreeMap;

use crate::values::tree::{Node, Tree};

/// Override values keyed by dotted path, e.g. `"controller.logLevel"`.
pub type Overrides = BTreeMap<String, Node>;

/// Merge `source` into `destination` and return the result.
///
/// For every key in `source`: if both sides hold a map, they are merged
/// recursively; otherwise the source value replaces whatever the destination
/// had. Keys only present in `destination` are left alone.
pub fn merge(mut destination: Tree, source: Tree) -> Tree {
    merge_into(&mut destination, source);
    destination
}

/// In-place form of [`merge`].
pub fn merge_into(destination: &mut Tree, source: Tree) {
    for (key, incoming) in source {
        match incoming {
            Node::Map(incoming) => match destination.get_mut(&key) {
                Some(Node::Map(existing)) => merge_into(existing, incoming),
                _ => {
                    destination.insert(key, Node::Map(incoming));
                }
            },
            other => {
                destination.insert(key, other);
            }
        }
    }
}

/// Turn `"a.b.c" = value` into `{a: {b: {c: value}}}`.
///
/// The key is split on every `.`; empty segments are kept as empty keys.
pub fn expand_dotted(key: &str, value: Node) -> Tree {
    let mut segments = key.rsplit('.');
    // `rsplit` always yields at least one segment.
    let leaf = segments.next().unwrap_or(key);
    segments.fold(Tree::singleton(leaf, value), |inner, segment| {
        Tree::singleton(segment, Node::Map(inner))
    })
}

/// Merge every override onto `tree`, one dotted key at a time in key order.
pub fn apply_overrides(tree: &mut Tree, overrides: &Overrides) {
    for (key, value) in overrides {
        merge_into(tree, expand_dotted(key, value.clone()));
    }
}
