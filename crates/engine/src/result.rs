//! Routing of service answers to the right display surface.

use senpy_types::{Evaluation, Metric};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Keys under which the service lists evaluations, in lookup order.
const EVALUATION_KEYS: [&str; 2] = ["senpy:evaluations", "evaluations"];

/// Where a response body is shown.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Parsed JSON for the structured viewer
    Structured(Value),
    /// Anything else (Turtle, N-Triples, HTML error pages)
    Raw(String),
}

impl ResultView {
    pub fn is_structured(&self) -> bool {
        matches!(self, ResultView::Structured(_))
    }
}

/// Send `body` to the structured viewer when it parses as JSON, otherwise to
/// the raw text view.
pub fn route_response(body: &str) -> ResultView {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => ResultView::Structured(value),
        Err(error) => {
            debug!(%error, "response is not JSON; showing raw text");
            ResultView::Raw(body.to_string())
        }
    }
}

/// The `message` of a service error document, if `body` is one.
pub fn service_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("message").and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("the response has no '{0}' field")]
    MissingField(&'static str),
    #[error("the response is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("unexpected evaluation entry: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Read the evaluations out of an evaluation response.
///
/// A single object is treated as a list of one.
pub fn parse_evaluations(body: &str) -> Result<Vec<Evaluation>, ResultError> {
    let value: Value = serde_json::from_str(body).map_err(ResultError::NotJson)?;
    normalize_evaluations(&value)
}

pub fn normalize_evaluations(response: &Value) -> Result<Vec<Evaluation>, ResultError> {
    let found = EVALUATION_KEYS
        .iter()
        .find_map(|key| response.get(*key))
        .ok_or(ResultError::MissingField(EVALUATION_KEYS[0]))?;

    let entries = match found {
        Value::Array(items) => items.clone(),
        single => vec![single.clone()],
    };
    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(ResultError::Shape))
        .collect()
}

/// Round to four decimals, the precision of the metrics table.
pub fn round_metric(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Table cell for a metric: four fixed decimals, or the service's text
/// verbatim.
pub fn metric_cell(metric: &Metric) -> String {
    match (&metric.value, metric.numeric_value()) {
        (_, Some(number)) => format!("{:.4}", round_metric(number)),
        (Some(Value::String(text)), None) => text.clone(),
        (Some(other), None) => other.to_string(),
        (None, None) => String::new(),
    }
}

/// One row of the metrics table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub evaluates: String,
    pub evaluates_on: String,
    pub cells: Vec<String>,
}

pub fn metric_rows(evaluations: &[Evaluation]) -> Vec<MetricRow> {
    evaluations
        .iter()
        .map(|evaluation| MetricRow {
            evaluates: evaluation.evaluates.clone(),
            evaluates_on: evaluation.evaluates_on.clone(),
            cells: evaluation.metrics.iter().map(metric_cell).collect(),
        })
        .collect()
}

/// Metric names for the table header, taken from the first evaluation.
pub fn metric_headers(evaluations: &[Evaluation]) -> Vec<String> {
    evaluations
        .first()
        .map(|evaluation| {
            evaluation
                .metrics
                .iter()
                .map(|metric| metric.metric_type.clone().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}
