//! Parameter schema types as served by the analysis service.
//!
//! The service describes every tunable parameter with a small descriptor
//! (`options`, `default`, `description`, plus a few bookkeeping keys). The
//! same shape is used for a plugin's `extra_params` and for the
//! `valid_parameters` of a `help=true` response.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mapping from parameter name to its descriptor, in server order.
pub type ParameterSchema = IndexMap<String, ParameterDescriptor>;

/// Sentinel option list meaning "a boolean switch".
pub const BOOLEAN_SENTINEL: &str = "boolean";

/// A single closed-choice option. The service mixes strings and JSON
/// booleans (and occasionally numbers) in the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Number(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
        }
    }
}

/// Describes one parameter accepted by a plugin or by the service itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Closed set of accepted values. `None` means free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionValue>>,
    /// Value used when the caller does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternative names the service accepts for this parameter
    #[serde(default, deserialize_with = "nullable_list", skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Whether the service rejects requests lacking this parameter
    #[serde(default, deserialize_with = "nullable_bool")]
    pub required: bool,
}

impl ParameterDescriptor {
    /// Returns the option labels a choice control should offer.
    ///
    /// An option list that is exactly `["boolean"]` expands to
    /// `["true", "false"]`. Returns `None` for free-text parameters.
    pub fn effective_options(&self) -> Option<Vec<String>> {
        let options = self.options.as_ref()?;
        if let [OptionValue::Text(only)] = options.as_slice()
            && only == BOOLEAN_SENTINEL
        {
            return Some(vec!["true".to_string(), "false".to_string()]);
        }
        Some(options.iter().map(ToString::to_string).collect())
    }

    /// Default value rendered as the text a form control would hold.
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a `help=true` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelpResponse {
    #[serde(default)]
    pub valid_parameters: ParameterSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_sentinel_expands_to_true_and_false() {
        let descriptor: ParameterDescriptor = serde_json::from_value(json!({
            "options": ["boolean"],
            "default": false
        }))
        .expect("deserialize descriptor");

        assert_eq!(descriptor.effective_options(), Some(vec!["true".to_string(), "false".to_string()]));
        assert_eq!(descriptor.default_text().as_deref(), Some("false"));
    }

    #[test]
    fn mixed_option_values_render_as_text() {
        let descriptor: ParameterDescriptor = serde_json::from_value(json!({
            "options": [true, "auto", 3]
        }))
        .expect("deserialize descriptor");

        assert_eq!(
            descriptor.effective_options(),
            Some(vec!["true".to_string(), "auto".to_string(), "3".to_string()])
        );
        assert!(descriptor.default_text().is_none());
    }

    #[test]
    fn server_bookkeeping_keys_are_tolerated() {
        let schema: ParameterSchema = serde_json::from_value(json!({
            "language": {
                "@id": "lang_sentiment140",
                "aliases": null,
                "required": null,
                "default": null,
                "description": "language of the input"
            }
        }))
        .expect("deserialize schema");

        let language = &schema["language"];
        assert!(language.options.is_none());
        assert!(language.default.is_none());
        assert!(language.aliases.is_empty());
        assert!(!language.required);
    }
}
