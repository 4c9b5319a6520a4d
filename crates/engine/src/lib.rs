//! # Senpy Engine
//!
//! Terminal-independent core of the senpy console. It turns the service's
//! metadata into forms, keeps the processing pipeline, assembles request
//! URLs and decides how answers are displayed.
//!
//! ## Usage
//!
//! ```rust
//! use senpy_engine::{FormState, Pipeline, PluginCatalog};
//! use senpy_engine::request::AnalysisRequest;
//! use senpy_types::{CatalogSnapshot, OutFormat, Plugin};
//!
//! let plugin: Plugin = serde_json::from_value(serde_json::json!({
//!     "name": "sentiment140",
//!     "@type": "sentimentPlugin",
//!     "is_activated": true,
//!     "extra_params": { "language": { "options": ["en", "es"], "default": "en" } }
//! }))?;
//! let catalog = PluginCatalog::from_snapshot(CatalogSnapshot {
//!     plugins: vec![plugin],
//!     ..Default::default()
//! });
//!
//! let pipeline = Pipeline::new();
//! let form = FormState::from_schema(&pipeline.merged_schema(Some("sentiment140"), &catalog));
//! let request = AnalysisRequest::new(
//!     pipeline.serialized_argument("sentiment140"),
//!     "hello",
//!     OutFormat::JsonLd,
//!     form.extract_values(),
//! );
//! assert_eq!(
//!     request.url("http://localhost:5000"),
//!     "http://localhost:5000/api?algo=sentiment140&i=hello&outformat=json-ld&language=en"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`catalog`**: plugins, groups, default selection, datasets
//! - **`form`**: schema to form description, edits, value extraction
//! - **`pipeline`**: extra stages, merged schema, `algo` argument
//! - **`request`**: URL assembly and percent-encoding
//! - **`result`**: response routing, evaluation tables
//! - **`graph`**: N-Triples to node/edge graph
//! - **`session`**: the whole client state and its reducer

pub mod catalog;
pub mod form;
pub mod graph;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod session;

pub use catalog::{PluginCatalog, PluginGroup};
pub use form::{Control, FormDescription, FormField, FormState, FormValues, NO_PARAMETERS_MESSAGE, describe, merge_values};
pub use graph::{GraphEdge, GraphNode, NodeKind, Triple, TripleGraph};
pub use pipeline::Pipeline;
pub use request::{AnalysisRequest, EvaluationRequest, RESERVED_PARAMETERS, RequestError};
pub use result::{MetricRow, ResultError, ResultView, metric_headers, metric_rows, parse_evaluations, route_response};
pub use session::{
    Action, AnalysisResult, CatalogStatus, EvaluationResult, FormKind, RequestState, SessionState, reduce,
};
