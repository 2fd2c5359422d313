//! Plugin Registry - renderer bundles keyed by schema type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::CheckError;
use crate::template::{Schema, Template};

/// Types every renderer supports without registration.
pub const BUILTIN_SCHEMA_TYPES: [&str; 2] = ["text", "image"];

pub type Plugins = BTreeMap<String, Plugin>;

/// Renderer handles are opaque to this crate; the host resolves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    #[serde(default)]
    pub pdf: Value,
    #[serde(default)]
    pub ui: Value,
    pub prop_panel: PropPanel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropPanel {
    #[serde(default)]
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Map<String, Value>>,
    pub default_value: String,
    pub default_schema: Schema,
}

pub fn is_builtin_schema_type(kind: &str) -> bool {
    BUILTIN_SCHEMA_TYPES.contains(&kind)
}

/// Checks that every non-builtin schema type has a registered plugin.
pub fn check_plugins(plugins: &Plugins, template: &Template) -> Result<(), CheckError> {
    let missing: Vec<String> = template
        .schema_types()
        .into_iter()
        .filter(|kind| !is_builtin_schema_type(kind))
        .filter(|kind| !plugins.contains_key(*kind))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(CheckError::MissingPluginForType(missing));
    }

    debug!(plugins = plugins.len(), "plugin registry covers template");
    Ok(())
}
