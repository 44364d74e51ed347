//! Rendering model composition.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered key/value data handed to renderers.
pub type RenderModel = IndexMap<String, Value>;

/// Model key holding the relative path from a rendered file back to the
/// destination root.
pub const ROOT_KEY: &str = "root";

/// Model key holding the rendered body inside a template.
pub const CONTENT_KEY: &str = "content";

/// Builds the model for one rendered file.
///
/// Layers are applied in order `root`, global, pattern-level, extracted; a key
/// set by a later layer replaces the earlier value.
pub fn compose(
    root: &str,
    global: &RenderModel,
    pattern_local: &RenderModel,
    extracted: &RenderModel,
) -> RenderModel {
    let mut model = RenderModel::with_capacity(
        1 + global.len() + pattern_local.len() + extracted.len(),
    );
    model.insert(ROOT_KEY.to_string(), Value::String(root.to_string()));
    for layer in [global, pattern_local, extracted] {
        for (key, value) in layer {
            model.insert(key.clone(), value.clone());
        }
    }
    model
}

/// Computes the `..` path leading from the directory of `dest_relative_path`
/// back to the destination root; a top-level file maps to `.`.
pub fn relative_root(dest_relative_path: &str) -> String {
    let depth = dest_relative_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .count()
        .saturating_sub(1);
    if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    }
}
