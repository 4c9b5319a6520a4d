//! Request assembly for analysis and evaluation calls.
//!
//! The URL produced here is both the one shown to the user and the one sent,
//! so query values are percent-encoded exactly once, here.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use senpy_types::{OutFormat, ParameterSchema};
use thiserror::Error;

use crate::form::FormValues;

/// Names the client always sets itself; never forwarded from a form.
pub const RESERVED_PARAMETERS: [&str; 4] = ["input", "algorithm", "outformat", "help"];

/// Characters left as-is in query values: the `encodeURIComponent` set
/// plus `,`, which separates plugin and dataset lists.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b',');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("no plugin selected")]
    NoPluginSelected,
    #[error("select at least one dataset to evaluate on")]
    NoDatasetsSelected,
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_PARAMETERS.contains(&name)
}

/// Copy of `schema` without the reserved parameters.
pub fn strip_reserved(schema: &ParameterSchema) -> ParameterSchema {
    schema
        .iter()
        .filter(|(name, _)| !is_reserved(name))
        .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
        .collect()
}

/// Percent-encode one query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn push_pair(url: &mut String, first: &mut bool, key: &str, value: &str) {
    url.push(if *first { '?' } else { '&' });
    *first = false;
    url.push_str(&encode_component(key));
    url.push('=');
    url.push_str(&encode_component(value));
}

/// A fully assembled `GET /api` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Serialized pipeline (`A,B,C`)
    pub algo: String,
    pub input: String,
    pub outformat: OutFormat,
    /// Form parameters, reserved names already removed
    pub parameters: FormValues,
}

impl AnalysisRequest {
    pub fn new(algo: impl Into<String>, input: impl Into<String>, outformat: OutFormat, mut parameters: FormValues) -> Self {
        parameters.retain(|name, _| !is_reserved(name));
        Self {
            algo: algo.into(),
            input: input.into(),
            outformat,
            parameters,
        }
    }

    /// Same request in another serialization.
    pub fn with_outformat(&self, outformat: OutFormat) -> Self {
        Self {
            outformat,
            ..self.clone()
        }
    }

    /// Absolute URL under `base` (with or without a trailing slash).
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}/api", base.trim_end_matches('/'));
        let mut first = true;
        push_pair(&mut url, &mut first, "algo", &self.algo);
        push_pair(&mut url, &mut first, "i", &self.input);
        push_pair(&mut url, &mut first, "outformat", self.outformat.as_str());
        for (name, value) in &self.parameters {
            push_pair(&mut url, &mut first, name, value);
        }
        url
    }
}

/// A `GET /api/evaluate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub algo: String,
    /// Dataset ids in checklist order
    pub datasets: Vec<String>,
}

impl EvaluationRequest {
    pub fn new(algo: Option<&str>, datasets: Vec<String>) -> Result<Self, RequestError> {
        let algo = algo.filter(|name| !name.is_empty()).ok_or(RequestError::NoPluginSelected)?;
        if datasets.is_empty() {
            return Err(RequestError::NoDatasetsSelected);
        }
        Ok(Self {
            algo: algo.to_string(),
            datasets,
        })
    }

    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}/api/evaluate", base.trim_end_matches('/'));
        let mut first = true;
        push_pair(&mut url, &mut first, "algo", &self.algo);
        push_pair(&mut url, &mut first, "dataset", &self.datasets.join(","));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog, plugin};
    use crate::form::FormState;
    use crate::pipeline::Pipeline;

    #[test]
    fn single_plugin_analysis_url() {
        let catalog = catalog(vec![plugin("sentiment140", "sentimentPlugin", true, &[("language", &["en", "es"], Some("en"))])], Some("sentiment140"));
        let pipeline = Pipeline::new();
        let selected = catalog.default_selection();
        let form = FormState::from_schema(&pipeline.merged_schema(selected, &catalog));

        let request = AnalysisRequest::new(
            pipeline.serialized_argument(selected.expect("default plugin")),
            "hello",
            OutFormat::JsonLd,
            form.extract_values(),
        );
        let url = request.url("http://localhost:5000/");

        assert!(url.starts_with("http://localhost:5000/api?"));
        assert!(url.contains("algo=sentiment140"));
        assert!(url.contains("i=hello"));
        assert!(url.contains("language=en"));
        assert!(url.contains("outformat=json-ld"));
    }

    #[test]
    fn values_are_encoded_but_lists_keep_commas() {
        let request = AnalysisRequest::new("split,sentiment140", "I love Madrid & tapas?", OutFormat::Turtle, FormValues::new());
        assert_eq!(
            request.url("http://h"),
            "http://h/api?algo=split,sentiment140&i=I%20love%20Madrid%20%26%20tapas%3F&outformat=turtle"
        );
        assert_eq!(encode_component("ñ"), "%C3%B1");
        assert_eq!(encode_component("it's (ok)!"), "it's%20(ok)!");
    }

    #[test]
    fn reserved_names_are_never_forwarded() {
        let parameters = FormValues::from([
            ("input".to_string(), "sneaky".to_string()),
            ("outformat".to_string(), "turtle".to_string()),
            ("help".to_string(), "true".to_string()),
            ("algorithm".to_string(), "x".to_string()),
            ("language".to_string(), "es".to_string()),
        ]);
        let request = AnalysisRequest::new("sentiment140", "hola", OutFormat::JsonLd, parameters);
        assert_eq!(request.parameters.keys().collect::<Vec<_>>(), vec!["language"]);
        assert_eq!(
            request.url("http://h"),
            "http://h/api?algo=sentiment140&i=hola&outformat=json-ld&language=es"
        );
    }

    #[test]
    fn graph_variant_only_changes_outformat() {
        let request = AnalysisRequest::new("vader", "good", OutFormat::JsonLd, FormValues::new());
        let graph = request.with_outformat(OutFormat::NTriples);
        assert_eq!(graph.algo, request.algo);
        assert!(graph.url("http://h").contains("outformat=ntriples"));
    }

    #[test]
    fn evaluation_url_joins_datasets() {
        let request = EvaluationRequest::new(Some("vader"), vec!["vader".into(), "sts".into()]).expect("request");
        assert_eq!(request.url("http://h/"), "http://h/api/evaluate?algo=vader&dataset=vader,sts");
    }

    #[test]
    fn evaluation_requires_plugin_and_datasets() {
        assert_eq!(EvaluationRequest::new(None, vec!["sts".into()]), Err(RequestError::NoPluginSelected));
        assert_eq!(EvaluationRequest::new(Some("vader"), vec![]), Err(RequestError::NoDatasetsSelected));
    }
}
