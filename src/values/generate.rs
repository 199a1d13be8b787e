// src/values/generate.rs

use std::path::Path;

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::values::merge::{Overrides, apply_overrides};
use crate::values::tree::Tree;

/// Build a values file from a defaults document plus dotted-key overrides.
///
/// `defaults_yaml` may be empty. `None` overrides leave the defaults as they
/// are. The merged tree is written to `output` in one atomic step and also
/// returned. If the defaults fail to parse, nothing is written.
pub fn generate(
    fs: &dyn FileSystem,
    output: &Path,
    overrides: Option<&Overrides>,
    defaults_yaml: &str,
) -> Result<Tree> {
    let mut tree = Tree::from_yaml_str(defaults_yaml)?;
    debug!(default_keys = tree.len(), "parsed values defaults");

    if let Some(overrides) = overrides {
        apply_overrides(&mut tree, overrides);
        debug!(overrides = overrides.len(), "applied value overrides");
    }

    let yaml = tree.to_yaml_string()?;
    fs.write_atomic(output, yaml.as_bytes())?;

    info!(path = %output.display(), "wrote values file");
    Ok(tree)
}
