// src/values/mod.rs

//! Helm values generation.
//!
//! - [`tree`] models parsed YAML as `Scalar | Sequence | Map` nodes.
//! - [`merge`] holds the right-biased deep merge and the dotted-key
//!   expansion used for override values.
//! - [`generate`] combines a defaults document with overrides and writes the
//!   result to disk atomically.

pub mod generate;
pub mod merge;
pub mod tree;

pub use generate::generate;
pub use merge::{Overrides, apply_overrides, expand_dotted, merge, merge_into};
pub use tree::{Node, Scalar, Tree};
