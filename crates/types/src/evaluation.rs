use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of evaluating one plugin against one dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Name of the evaluated plugin
    #[serde(default, alias = "senpy:evaluates")]
    pub evaluates: String,
    /// Dataset identifier
    #[serde(rename = "evaluatesOn", default, alias = "senpy:evaluatesOn")]
    pub evaluates_on: String,
    #[serde(default, alias = "senpy:metrics")]
    pub metrics: Vec<Metric>,
}

/// A single named score inside an [`Evaluation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "@type", default)]
    pub metric_type: Option<String>,
    /// Usually a number; the service writes `"Not Available"` when a score
    /// could not be computed.
    #[serde(default)]
    pub value: Option<Value>,
}

impl Metric {
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }
}
