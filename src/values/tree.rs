// src/values/tree.rs

//! Configuration tree model.
//!
//! YAML documents are converted into a closed set of node kinds so that the
//! merge only ever has to ask one question: "is this a map?". Scalars keep
//! their YAML number representation untouched.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::Value;

use crate::errors::{KubestrapError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Map(Tree),
}

/// String-keyed map of nodes. Keys are kept sorted, so serialization is
/// deterministic regardless of how the tree was built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree(BTreeMap<String, Node>);

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding exactly one entry.
    pub fn singleton(key: impl Into<String>, value: Node) -> Self {
        let mut tree = Self::new();
        tree.insert(key, value);
        tree
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.0.get_mut(key)
    }

    /// Follow a dotted path (`"controller.logLevel"`) through nested maps.
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.get(first)?, |node, segment| {
            node.as_map().and_then(|map| map.get(segment))
        })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        self.0.insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a YAML document.
    ///
    /// Empty, comment-only and `null` documents give an empty tree. Any other
    /// top-level value that is not a mapping is rejected.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut value: Value = serde_yaml::from_str(input)?;
        // `<<: *anchor` merge keys are resolved before conversion.
        value.apply_merge()?;
        match Node::try_from(value)? {
            Node::Map(tree) => Ok(tree),
            Node::Scalar(Scalar::Null) => Ok(Self::new()),
            other => Err(KubestrapError::Parse(format!(
                "expected a mapping at the top level, found a {}",
                other.kind()
            ))),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl IntoIterator for Tree {
    type Item = (String, Node);
    type IntoIter = std::collections::btree_map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Tree {
    fn from_iter<T: IntoIterator<Item = (K, Node)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Map(_) => "map",
        }
    }

    pub fn as_map(&self) -> Option<&Tree> {
        match self {
            Node::Map(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Scalar::String(s))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Scalar(Scalar::Number(n.into()))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Scalar(Scalar::Number(n.into()))
    }
}

impl From<Tree> for Node {
    fn from(tree: Tree) -> Self {
        Node::Map(tree)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl TryFrom<Value> for Node {
    type Error = KubestrapError;

    fn try_from(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Sequence(items) => Node::Sequence(
                items
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Mapping(mapping) => {
                let mut tree = Tree::new();
                for (key, value) in mapping {
                    let key = key_string(key)?;
                    if tree.contains_key(&key) {
                        return Err(KubestrapError::Parse(format!(
                            "duplicate key '{key}' after key normalisation"
                        )));
                    }
                    tree.insert(key, Node::try_from(value)?);
                }
                Node::Map(tree)
            }
            // Custom tags are dropped; the tagged value is kept.
            Value::Tagged(tagged) => Node::try_from(tagged.value)?,
        })
    }
}

/// Config files are TOML; their override values arrive as `toml::Value`.
impl From<toml::Value> for Node {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Node::from(s),
            toml::Value::Integer(i) => Node::from(i),
            toml::Value::Float(f) => Node::from(f),
            toml::Value::Boolean(b) => Node::from(b),
            toml::Value::Datetime(dt) => Node::from(dt.to_string()),
            toml::Value::Array(items) => {
                Node::Sequence(items.into_iter().map(Node::from).collect())
            }
            toml::Value::Table(table) => {
                Node::Map(table.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

fn key_string(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => key_string(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(KubestrapError::Parse(
            "mapping keys must be scalars".to_string(),
        )),
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Sequence(items) => items.serialize(serializer),
            Node::Map(tree) => tree.serialize(serializer),
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
