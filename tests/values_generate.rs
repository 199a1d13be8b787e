mod common;

use std::collections::BTreeMap;

use kubestrap::errors::KubestrapError;
use kubestrap::fs::{FileSystem, RealFileSystem};
use kubestrap::values::{Node, Overrides, Tree, expand_dotted, generate, merge};
use proptest::prelude::*;

fn overrides(pairs: &[(&str, Node)]) -> Overrides {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn writes_merged_values_to_disk() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("values.yaml");

    let tree = generate(
        &RealFileSystem,
        &out,
        Some(&overrides(&[
            ("controller.service.type", Node::from("NodePort")),
            ("controller.replicaCount", Node::from(2_i64)),
        ])),
        "controller:\n  replicaCount: 1\n  image:\n    tag: v1\n",
    )
    .unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(Tree::from_yaml_str(&written).unwrap(), tree);
    assert_eq!(
        written,
        "controller:\n  image:\n    tag: v1\n  replicaCount: 2\n  service:\n    type: NodePort\n"
    );
}

#[test]
fn controller_and_image_overrides_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("values.yaml");

    let tree = generate(
        &RealFileSystem,
        &out,
        Some(&overrides(&[
            ("controller.logLevel", Node::from("debug")),
            ("image.tag", Node::from("latest")),
        ])),
        "controller:\n  logLevel: info\n  replicas: 1\nimage:\n  repository: nginx\n",
    )
    .unwrap();

    let expected = Tree::from_yaml_str(
        "controller:\n  logLevel: debug\n  replicas: 1\n\
         image:\n  repository: nginx\n  tag: latest\n",
    )
    .unwrap();
    assert_eq!(tree, expected);
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(Tree::from_yaml_str(&written).unwrap(), expected);
}

#[test]
fn missing_output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b").join("values.yaml");

    generate(&RealFileSystem, &out, None, "").unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "{}\n");
}

#[test]
fn existing_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("values.yaml");
    std::fs::write(&out, "stale: true\nmore: stuff\n").unwrap();

    generate(&RealFileSystem, &out, None, "fresh: 1").unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "fresh: 1\n");
}

#[test]
fn malformed_defaults_leave_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("values.yaml");

    let err = generate(
        &RealFileSystem,
        &out,
        Some(&overrides(&[("a", Node::from(1_i64))])),
        "invalid: yaml: content: [unclosed",
    )
    .unwrap_err();

    assert!(matches!(err, KubestrapError::Parse(_)));
    assert!(!RealFileSystem.exists(&out));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();

    let err = generate(&RealFileSystem, &blocker.join("values.yaml"), None, "a: 1").unwrap_err();

    assert!(matches!(err, KubestrapError::Write { .. }));
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        any::<bool>().prop_map(Node::from),
        any::<i64>().prop_map(Node::from),
        "[a-z]{0,6}".prop_map(Node::from),
    ]
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let node = leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Node::from),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m: BTreeMap<String, Node>| Node::from(m.into_iter().collect::<Tree>())),
        ]
    });
    prop::collection::btree_map("[a-d]", node, 0..5).prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn merge_with_empty_is_identity(t in tree_strategy()) {
        prop_assert_eq!(merge(t.clone(), Tree::new()), t.clone());
        prop_assert_eq!(merge(Tree::new(), t.clone()), t);
    }

    #[test]
    fn merge_is_idempotent(t in tree_strategy()) {
        prop_assert_eq!(merge(t.clone(), t.clone()), t);
    }

    #[test]
    fn source_keys_always_win(dest in tree_strategy(), src in tree_strategy()) {
        let merged = merge(dest.clone(), src.clone());
        for (key, value) in src.iter() {
            match (dest.get(key), value) {
                (Some(Node::Map(_)), Node::Map(_)) => {
                    prop_assert!(matches!(merged.get(key), Some(Node::Map(_))));
                }
                _ => prop_assert_eq!(merged.get(key), Some(value)),
            }
        }
        for (key, value) in dest.iter() {
            if !src.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }

    #[test]
    fn expanded_key_round_trips_through_get_path(
        segments in prop::collection::vec("[a-z]{1,5}", 1..5),
        value in leaf(),
    ) {
        let key = segments.join(".");
        let tree = expand_dotted(&key, value.clone());
        prop_assert_eq!(tree.get_path(&key), Some(&value));
        prop_assert_eq!(tree.len(), 1);
    }
}
