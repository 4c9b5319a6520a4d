use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::ParameterSchema;

/// An analysis algorithm exposed by the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plugin {
    /// Unique plugin name; empty when the service omitted it
    #[serde(default)]
    pub name: String,
    /// Plugin kind (e.g. `sentimentPlugin`), used to group selectors
    #[serde(rename = "@type", default, deserialize_with = "type_label")]
    pub plugin_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub is_activated: bool,
    /// Plugin-specific parameters layered on top of the basic ones
    #[serde(default)]
    pub extra_params: ParameterSchema,
}

impl Plugin {
    /// Whether the plugin carries a usable name.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

// `@type` is a string for plugins but JSON-LD allows a list; keep the first
// entry so grouping stays stable.
fn type_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(label)) => label,
        Some(Value::Array(items)) => items
            .into_iter()
            .find_map(|item| item.as_str().map(str::to_string))
            .unwrap_or_default(),
        _ => String::new(),
    })
}

/// Body of `GET /api/plugins/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginList {
    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

/// A dataset the service can evaluate plugins against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /api/datasets/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plugin_minimal_payload_uses_defaults() {
        let plugin: Plugin = serde_json::from_value(json!({
            "name": "sentiment140",
            "@type": "sentimentPlugin"
        }))
        .expect("deserialize plugin");

        assert_eq!(plugin.name, "sentiment140");
        assert_eq!(plugin.plugin_type, "sentimentPlugin");
        assert!(!plugin.is_activated);
        assert!(plugin.extra_params.is_empty());
        assert!(plugin.url.is_none());
    }

    #[test]
    fn plugin_type_list_keeps_first_label() {
        let plugin: Plugin = serde_json::from_value(json!({
            "name": "split",
            "@type": ["analysisPlugin", "plugin"]
        }))
        .expect("deserialize plugin");
        assert_eq!(plugin.plugin_type, "analysisPlugin");
    }

    #[test]
    fn dataset_keeps_unknown_fields() {
        let datasets: DatasetList = serde_json::from_value(json!({
            "datasets": [{ "@id": "vader", "stats": { "instances": 4200 } }]
        }))
        .expect("deserialize datasets");

        assert_eq!(datasets.datasets[0].id, "vader");
        assert!(datasets.datasets[0].extra.contains_key("stats"));
    }
}
