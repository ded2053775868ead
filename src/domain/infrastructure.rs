use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

pub const TRANSFORMERS_KEY: &str = "transformateurs";
pub const CHARGERS_KEY: &str = "chargeurs";
pub const PLUGS_KEY: &str = "prises";

/// Externally described charging infrastructure.
///
/// Sources are kept as raw JSON so they reach the run document exactly as
/// written, whatever keys or number types they carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    pub sources: Vec<Value>,
}

/// A plug together with the charger it hangs off
#[derive(Debug, Clone, Copy)]
pub struct PlugSlot<'a> {
    pub charger: &'a Map<String, Value>,
    pub plug: &'a Map<String, Value>,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Object children listed under `key`; anything that is not an object is skipped
fn children<'a>(node: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    node.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

impl PlugSlot<'_> {
    pub fn plug_id(&self) -> String {
        self.plug.get("id").and_then(scalar_text).unwrap_or_default()
    }

    /// Charger model, when set to something non-empty
    pub fn charger_type(&self) -> Option<String> {
        self.charger
            .get("typeChargeur")
            .and_then(scalar_text)
            .filter(|t| !t.is_empty())
    }

    /// Plug type whenever the key holds a value, blank text included
    pub fn plug_type(&self) -> Option<String> {
        self.plug.get("typePrise").and_then(scalar_text)
    }
}

impl Infrastructure {
    /// Load from JSON, or YAML when the extension is `.yaml` / `.yml`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(&text),
            _ => Ok(serde_json::from_str(&text)?),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: Option<Self> = serde_yaml::from_str(text)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Load failures of any kind mean "no infrastructure"
    pub fn load_lenient(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(infra) => {
                debug!(path = %path.display(), sources = infra.sources.len(), "loaded infrastructure");
                Some(infra)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable infrastructure description");
                None
            }
        }
    }

    /// Every plug of every charger, across all sources and transformers
    pub fn plug_slots(&self) -> Vec<PlugSlot<'_>> {
        self.sources
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|s| children(s, TRANSFORMERS_KEY))
            .flat_map(|t| children(t, CHARGERS_KEY))
            .flat_map(|charger| {
                children(charger, PLUGS_KEY).map(move |plug| PlugSlot { charger, plug })
            })
            .collect()
    }
}
