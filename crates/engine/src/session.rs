//! Client session state and its reducer.
//!
//! Everything the UI displays lives in [`SessionState`]. State only changes
//! through [`reduce`], which is pure: network calls are started by the caller
//! after it sees a request move to [`RequestState::Pending`], and their
//! answers come back as [`Action::ResponseReceived`] or
//! [`Action::NetworkFailed`] tagged with the request id. An answer whose id
//! is no longer the pending one is dropped.

use std::collections::HashSet;

use senpy_types::{CatalogSnapshot, Evaluation, OutFormat, RequestKind, ServiceResponse};
use tracing::{debug, warn};

use crate::catalog::PluginCatalog;
use crate::form::{FormState, merge_values};
use crate::graph::TripleGraph;
use crate::pipeline::Pipeline;
use crate::request::{AnalysisRequest, EvaluationRequest};
use crate::result::{ResultView, parse_evaluations, route_response, service_message};

/// Lifecycle of one user-triggered request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Pending {
        request_id: u64,
        url: String,
    },
    Succeeded {
        request_id: u64,
        url: String,
        result: T,
    },
    Failed {
        request_id: u64,
        url: String,
        message: String,
    },
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    /// Id of the request currently in flight.
    pub fn pending_id(&self) -> Option<u64> {
        match self {
            RequestState::Pending { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            RequestState::Idle => None,
            RequestState::Pending { url, .. } | RequestState::Succeeded { url, .. } | RequestState::Failed { url, .. } => {
                Some(url)
            }
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            RequestState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A displayed analysis answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub status_code: u16,
    pub view: ResultView,
    /// Indented JSON for the structured viewer, built once on arrival
    pub pretty: Option<String>,
    /// Body exactly as received, for the raw tab
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub evaluations: Vec<Evaluation>,
    pub body: String,
}

/// Startup metadata status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Which parameter container an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Service-wide parameters
    Basic,
    /// Merged pipeline parameters
    Extra,
}

#[derive(Debug, Clone)]
pub enum Action {
    CatalogLoaded(Box<CatalogSnapshot>),
    CatalogFailed(String),
    SelectPlugin(String),
    StepPlugin { forward: bool },
    AddStage(String),
    RemoveStage(String),
    ClearStages,
    SetInput(String),
    SetOutFormat(OutFormat),
    CycleChoice { form: FormKind, name: String, forward: bool },
    SetText { form: FormKind, name: String, value: String },
    SubmitAnalysis,
    /// Re-request the last analysis as N-Triples
    RequestGraph,
    StepEvaluationPlugin { forward: bool },
    ToggleDataset(String),
    SubmitEvaluation,
    ResponseReceived { request_id: u64, kind: RequestKind, response: ServiceResponse },
    NetworkFailed { request_id: u64, kind: RequestKind, message: String },
    /// Abandon whatever request of this kind is pending
    Cancel(RequestKind),
    DismissAlert,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub api_base: String,
    pub catalog: PluginCatalog,
    pub catalog_status: CatalogStatus,
    pub selected: Option<String>,
    pub pipeline: Pipeline,
    pub basic_form: FormState,
    pub extra_form: FormState,
    pub input: String,
    pub outformat: OutFormat,
    pub analysis: RequestState<AnalysisResult>,
    pub graph: RequestState<TripleGraph>,
    pub evaluation_plugin: Option<String>,
    pub checked_datasets: HashSet<String>,
    pub evaluation: RequestState<EvaluationResult>,
    /// Blocking message for the user
    pub alert: Option<String>,
    last_analysis: Option<AnalysisRequest>,
    next_request_id: u64,
}

impl SessionState {
    pub fn new(api_base: impl Into<String>, outformat: OutFormat) -> Self {
        Self {
            api_base: api_base.into(),
            catalog: PluginCatalog::default(),
            catalog_status: CatalogStatus::Loading,
            selected: None,
            pipeline: Pipeline::new(),
            basic_form: FormState::default(),
            extra_form: FormState::default(),
            input: String::new(),
            outformat,
            analysis: RequestState::Idle,
            graph: RequestState::Idle,
            evaluation_plugin: None,
            checked_datasets: HashSet::new(),
            evaluation: RequestState::Idle,
            alert: None,
            last_analysis: None,
            next_request_id: 1,
        }
    }

    /// The analysis request the current form would send.
    pub fn analysis_request(&self) -> Option<AnalysisRequest> {
        let selected = self.selected.as_deref()?;
        let values = merge_values(self.basic_form.extract_values(), self.extra_form.extract_values());
        Some(AnalysisRequest::new(
            self.pipeline.serialized_argument(selected),
            self.input.clone(),
            self.outformat,
            values,
        ))
    }

    /// Checked dataset ids in catalog order.
    pub fn checked_dataset_ids(&self) -> Vec<String> {
        self.catalog
            .datasets()
            .iter()
            .filter(|dataset| self.checked_datasets.contains(&dataset.id))
            .map(|dataset| dataset.id.clone())
            .collect()
    }

    pub fn form(&self, kind: FormKind) -> &FormState {
        match kind {
            FormKind::Basic => &self.basic_form,
            FormKind::Extra => &self.extra_form,
        }
    }

    fn form_mut(&mut self, kind: FormKind) -> &mut FormState {
        match kind {
            FormKind::Basic => &mut self.basic_form,
            FormKind::Extra => &mut self.extra_form,
        }
    }

    fn refresh_extra_form(&mut self) {
        let schema = self.pipeline.merged_schema(self.selected.as_deref(), &self.catalog);
        self.extra_form.rebuild(&schema);
    }

    fn issue_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    fn accepts(&self, kind: RequestKind, request_id: u64) -> bool {
        let pending = match kind {
            RequestKind::Analysis => self.analysis.pending_id(),
            RequestKind::Graph => self.graph.pending_id(),
            RequestKind::Evaluation => self.evaluation.pending_id(),
        };
        pending == Some(request_id)
    }

    fn pending_url(&self, kind: RequestKind) -> String {
        let url = match kind {
            RequestKind::Analysis => self.analysis.url(),
            RequestKind::Graph => self.graph.url(),
            RequestKind::Evaluation => self.evaluation.url(),
        };
        url.unwrap_or_default().to_string()
    }
}

/// Apply `action` to `state`.
pub fn reduce(mut state: SessionState, action: Action) -> SessionState {
    match action {
        Action::CatalogLoaded(snapshot) => {
            state.catalog = PluginCatalog::from_snapshot(*snapshot);
            state.catalog_status = CatalogStatus::Ready;
            state.selected = state.catalog.default_selection().map(str::to_string);
            state.evaluation_plugin = state.selected.clone();
            state.basic_form.rebuild(state.catalog.basic_schema());
            state.refresh_extra_form();
            state
                .checked_datasets
                .retain(|id| state.catalog.datasets().iter().any(|dataset| &dataset.id == id));
        }
        Action::CatalogFailed(message) => {
            state.alert = Some(format!("Could not load plugins: {message}"));
            state.catalog_status = CatalogStatus::Failed(message);
        }
        Action::SelectPlugin(name) => {
            if state.catalog.is_selectable(&name) {
                state.selected = Some(name);
                state.refresh_extra_form();
            } else {
                debug!(%name, "ignoring selection of unavailable plugin");
            }
        }
        Action::StepPlugin { forward } => {
            state.selected = state
                .catalog
                .step_selection(state.selected.as_deref(), forward)
                .map(str::to_string);
            state.refresh_extra_form();
        }
        Action::AddStage(name) => {
            state.pipeline.add_stage(name);
            state.refresh_extra_form();
        }
        Action::RemoveStage(name) => {
            if state.pipeline.remove_stage(&name) {
                state.refresh_extra_form();
            }
        }
        Action::ClearStages => {
            state.pipeline.clear();
            state.refresh_extra_form();
        }
        Action::SetInput(input) => state.input = input,
        Action::SetOutFormat(outformat) => state.outformat = outformat,
        Action::CycleChoice { form, name, forward } => {
            state.form_mut(form).cycle_choice(&name, forward);
        }
        Action::SetText { form, name, value } => {
            state.form_mut(form).set_text(&name, value);
        }
        Action::SubmitAnalysis => match state.analysis_request() {
            Some(request) => {
                let request_id = state.issue_id();
                let url = request.url(&state.api_base);
                debug!(request_id, %url, "submitting analysis");
                state.analysis = RequestState::Pending { request_id, url };
                state.graph = RequestState::Idle;
                state.last_analysis = Some(request);
            }
            None => state.alert = Some("Select a plugin before analysing".to_string()),
        },
        Action::RequestGraph => match state.last_analysis.as_ref() {
            Some(request) => {
                let url = request.with_outformat(OutFormat::NTriples).url(&state.api_base);
                let request_id = state.issue_id();
                debug!(request_id, %url, "requesting graph");
                state.graph = RequestState::Pending { request_id, url };
            }
            None => state.alert = Some("Run an analysis before opening the graph".to_string()),
        },
        Action::StepEvaluationPlugin { forward } => {
            state.evaluation_plugin = state
                .catalog
                .step_selection(state.evaluation_plugin.as_deref(), forward)
                .map(str::to_string);
        }
        Action::ToggleDataset(id) => {
            if !state.checked_datasets.remove(&id) {
                state.checked_datasets.insert(id);
            }
        }
        Action::SubmitEvaluation => {
            match EvaluationRequest::new(state.evaluation_plugin.as_deref(), state.checked_dataset_ids()) {
                Ok(request) => {
                    let request_id = state.issue_id();
                    let url = request.url(&state.api_base);
                    debug!(request_id, %url, "submitting evaluation");
                    state.evaluation = RequestState::Pending { request_id, url };
                }
                Err(error) => state.alert = Some(error.to_string()),
            }
        }
        Action::ResponseReceived {
            request_id,
            kind,
            response,
        } => {
            if !state.accepts(kind, request_id) {
                debug!(request_id, ?kind, "dropping stale response");
                return state;
            }
            let url = state.pending_url(kind);
            apply_response(&mut state, kind, request_id, url, response);
        }
        Action::NetworkFailed {
            request_id,
            kind,
            message,
        } => {
            if !state.accepts(kind, request_id) {
                debug!(request_id, ?kind, "dropping stale failure");
                return state;
            }
            let url = state.pending_url(kind);
            warn!(%url, %message, "request failed");
            state.alert = Some(format!("Could not reach the service: {message}"));
            let failed = (request_id, url, message);
            match kind {
                RequestKind::Analysis => state.analysis = failed_state(failed),
                RequestKind::Graph => state.graph = failed_state(failed),
                RequestKind::Evaluation => state.evaluation = failed_state(failed),
            }
        }
        Action::Cancel(kind) => match kind {
            RequestKind::Analysis if state.analysis.is_pending() => state.analysis = RequestState::Idle,
            RequestKind::Graph if state.graph.is_pending() => state.graph = RequestState::Idle,
            RequestKind::Evaluation if state.evaluation.is_pending() => state.evaluation = RequestState::Idle,
            _ => {}
        },
        Action::DismissAlert => state.alert = None,
    }
    state
}

fn failed_state<T>((request_id, url, message): (u64, String, String)) -> RequestState<T> {
    RequestState::Failed {
        request_id,
        url,
        message,
    }
}

fn apply_response(state: &mut SessionState, kind: RequestKind, request_id: u64, url: String, response: ServiceResponse) {
    match kind {
        RequestKind::Analysis => {
            let view = route_response(&response.body);
            let pretty = match &view {
                ResultView::Structured(value) => serde_json::to_string_pretty(value).ok(),
                ResultView::Raw(_) => None,
            };
            state.analysis = RequestState::Succeeded {
                request_id,
                url,
                result: AnalysisResult {
                    status_code: response.status_code,
                    view,
                    pretty,
                    body: response.body,
                },
            };
        }
        RequestKind::Graph => {
            if !response.is_success() {
                let message = service_message(&response.body)
                    .unwrap_or_else(|| format!("the service answered HTTP {}", response.status_code));
                state.graph = failed_state((request_id, url, message));
                return;
            }
            state.graph = RequestState::Succeeded {
                request_id,
                url,
                result: TripleGraph::from_ntriples(&response.body),
            };
        }
        RequestKind::Evaluation => match parse_evaluations(&response.body) {
            Ok(evaluations) => {
                state.evaluation = RequestState::Succeeded {
                    request_id,
                    url,
                    result: EvaluationResult {
                        evaluations,
                        body: response.body,
                    },
                };
            }
            Err(error) => {
                let message = service_message(&response.body).unwrap_or_else(|| error.to_string());
                state.alert = Some(format!("Evaluation failed: {message}"));
                state.evaluation = failed_state((request_id, url, message));
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::plugin;
    use senpy_types::Dataset;
    use serde_json::{Map, json};

    fn loaded() -> SessionState {
        let snapshot = CatalogSnapshot {
            plugins: vec![
                plugin("sentiment140", "sentimentPlugin", true, &[("language", &["en", "es"], Some("en"))]),
                plugin("split", "analysisPlugin", true, &[("delimiter", &["sentence", "paragraph"], Some("sentence"))]),
                plugin("broken", "sentimentPlugin", false, &[]),
            ],
            default_plugin: Some(plugin("sentiment140", "sentimentPlugin", true, &[])),
            datasets: ["vader", "sts"]
                .into_iter()
                .map(|id| Dataset {
                    id: id.to_string(),
                    extra: Map::new(),
                })
                .collect(),
            basic_parameters: serde_json::from_value(json!({
                "input": { "aliases": ["i"] },
                "informat": { "options": ["text", "json-ld"], "default": "text" }
            }))
            .expect("schema"),
        };
        reduce(SessionState::new("http://localhost:5000", OutFormat::JsonLd), Action::CatalogLoaded(Box::new(snapshot)))
    }

    fn ok(body: &str) -> ServiceResponse {
        ServiceResponse {
            status_code: 200,
            content_type: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn catalog_load_selects_default_and_builds_forms() {
        let state = loaded();
        assert_eq!(state.catalog_status, CatalogStatus::Ready);
        assert_eq!(state.selected.as_deref(), Some("sentiment140"));
        assert_eq!(state.evaluation_plugin.as_deref(), Some("sentiment140"));
        assert!(state.extra_form.field("language").is_some());
        assert!(state.basic_form.field("informat").is_some());
        assert!(state.basic_form.field("input").is_none());
    }

    #[test]
    fn stages_feed_the_extra_form_and_algo() {
        let mut state = reduce(loaded(), Action::AddStage("split".into()));
        assert!(state.extra_form.field("delimiter").is_some());
        state = reduce(state, Action::SetInput("hello".into()));
        let request = state.analysis_request().expect("request");
        assert_eq!(request.algo, "split,sentiment140");

        state = reduce(state, Action::RemoveStage("split".into()));
        assert!(state.extra_form.field("delimiter").is_none());
        let state = reduce(state, Action::RemoveStage("split".into()));
        assert!(state.pipeline.is_empty());
    }

    #[test]
    fn switching_plugins_applies_the_new_defaults() {
        let snapshot = CatalogSnapshot {
            plugins: vec![
                plugin("sentiment140", "sentimentPlugin", true, &[("language", &["en", "es"], Some("en"))]),
                plugin("sentiment-es", "sentimentPlugin", true, &[("language", &["en", "es"], Some("es"))]),
                plugin("translate", "analysisPlugin", true, &[("language", &["en", "es"], Some("es"))]),
            ],
            ..Default::default()
        };
        let mut state = reduce(SessionState::new("http://h", OutFormat::JsonLd), Action::CatalogLoaded(Box::new(snapshot)));
        let language = |state: &SessionState| {
            state
                .analysis_request()
                .and_then(|request| request.parameters.get("language").cloned())
        };
        assert_eq!(language(&state).as_deref(), Some("en"));

        state = reduce(state, Action::SelectPlugin("sentiment-es".into()));
        assert_eq!(
            state.analysis_request().map(|request| request.url("http://h")).as_deref(),
            Some("http://h/api?algo=sentiment-es&i=&outformat=json-ld&language=es")
        );

        state = reduce(state, Action::SelectPlugin("sentiment140".into()));
        assert_eq!(language(&state).as_deref(), Some("en"));

        // The selected plugin is merged last, so its default wins over the stage's.
        state = reduce(state, Action::AddStage("translate".into()));
        assert_eq!(language(&state).as_deref(), Some("en"));

        state = reduce(
            state,
            Action::CycleChoice {
                form: FormKind::Extra,
                name: "language".into(),
                forward: true,
            },
        );
        state = reduce(state, Action::SelectPlugin("sentiment-es".into()));
        assert_eq!(language(&state).as_deref(), Some("es"));
        state = reduce(state, Action::SelectPlugin("sentiment140".into()));
        assert_eq!(language(&state).as_deref(), Some("es"), "edited value is kept");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn request_urls_are_logged_on_submit_only() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let state = reduce(loaded(), Action::SetInput("hello".into()));
            let request = state.analysis_request().expect("request");
            for _ in 0..3 {
                request.url(&state.api_base);
            }
            assert!(!logs.text().contains("hello"), "rendering the URL must not log");

            reduce(state, Action::SubmitAnalysis);
            let text = logs.text();
            assert_eq!(text.matches("submitting analysis").count(), 1);
            assert!(text.contains("i=hello"));
        });
    }

    #[test]
    fn deactivated_plugins_cannot_be_selected() {
        let state = reduce(loaded(), Action::SelectPlugin("broken".into()));
        assert_eq!(state.selected.as_deref(), Some("sentiment140"));
        let state = reduce(state, Action::StepPlugin { forward: true });
        assert_eq!(state.selected.as_deref(), Some("split"));
    }

    #[test]
    fn submit_then_response_routes_body() {
        let mut state = reduce(loaded(), Action::SetInput("hello".into()));
        state = reduce(state, Action::SubmitAnalysis);
        let request_id = state.analysis.pending_id().expect("pending");
        let url = state.analysis.url().expect("url").to_string();
        assert!(url.contains("algo=sentiment140") && url.contains("i=hello") && url.contains("language=en"));
        assert!(url.contains("informat=text"));

        state = reduce(
            state,
            Action::ResponseReceived {
                request_id,
                kind: RequestKind::Analysis,
                response: ok(r#"{"@type": "Results"}"#),
            },
        );
        let result = state.analysis.result().expect("result");
        assert!(result.view.is_structured());
        assert_eq!(result.pretty.as_deref(), Some("{\n  \"@type\": \"Results\"\n}"));
        assert_eq!(state.analysis.url(), Some(url.as_str()));
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut state = reduce(loaded(), Action::SubmitAnalysis);
        let first = state.analysis.pending_id().expect("first");
        state = reduce(state, Action::SubmitAnalysis);
        let second = state.analysis.pending_id().expect("second");
        assert_ne!(first, second);

        state = reduce(
            state,
            Action::ResponseReceived {
                request_id: first,
                kind: RequestKind::Analysis,
                response: ok("old"),
            },
        );
        assert_eq!(state.analysis.pending_id(), Some(second));

        state = reduce(state, Action::Cancel(RequestKind::Analysis));
        state = reduce(
            state,
            Action::ResponseReceived {
                request_id: second,
                kind: RequestKind::Analysis,
                response: ok("late"),
            },
        );
        assert_eq!(state.analysis, RequestState::Idle);
    }

    #[test]
    fn network_failure_raises_an_alert() {
        let state = reduce(loaded(), Action::SubmitAnalysis);
        let request_id = state.analysis.pending_id().expect("pending");
        let state = reduce(
            state,
            Action::NetworkFailed {
                request_id,
                kind: RequestKind::Analysis,
                message: "connection refused".into(),
            },
        );
        assert_eq!(state.analysis.error(), Some("connection refused"));
        assert!(state.alert.as_deref().is_some_and(|alert| alert.contains("connection refused")));
        assert!(reduce(state, Action::DismissAlert).alert.is_none());
    }

    #[test]
    fn graph_reuses_last_analysis_as_ntriples() {
        let state = reduce(loaded(), Action::RequestGraph);
        assert!(state.alert.is_some());

        let state = reduce(reduce(state, Action::DismissAlert), Action::SubmitAnalysis);
        let state = reduce(state, Action::RequestGraph);
        let request_id = state.graph.pending_id().expect("graph pending");
        assert!(state.graph.url().is_some_and(|url| url.contains("outformat=ntriples")));

        let state = reduce(
            state,
            Action::ResponseReceived {
                request_id,
                kind: RequestKind::Graph,
                response: ok("<a> <b> <c> .\n"),
            },
        );
        assert_eq!(state.graph.result().map(|graph| graph.triples.len()), Some(1));
    }

    #[test]
    fn evaluation_requires_datasets_and_parses_results() {
        let state = reduce(loaded(), Action::SubmitEvaluation);
        assert!(state.alert.as_deref().is_some_and(|alert| alert.contains("dataset")));
        assert!(!state.evaluation.is_pending());

        let mut state = reduce(state, Action::DismissAlert);
        state = reduce(state, Action::ToggleDataset("sts".into()));
        state = reduce(state, Action::ToggleDataset("vader".into()));
        assert_eq!(state.checked_dataset_ids(), vec!["vader", "sts"]);
        state = reduce(state, Action::SubmitEvaluation);
        let request_id = state.evaluation.pending_id().expect("pending");
        assert!(state.evaluation.url().is_some_and(|url| url.ends_with("algo=sentiment140&dataset=vader,sts")));

        let body = json!({
            "senpy:evaluations": { "evaluates": "sentiment140", "evaluatesOn": "vader", "metrics": [] }
        })
        .to_string();
        state = reduce(
            state,
            Action::ResponseReceived {
                request_id,
                kind: RequestKind::Evaluation,
                response: ok(&body),
            },
        );
        assert_eq!(state.evaluation.result().map(|result| result.evaluations.len()), Some(1));
    }

    #[test]
    fn evaluation_without_results_alerts() {
        let mut state = reduce(loaded(), Action::ToggleDataset("sts".into()));
        state = reduce(state, Action::SubmitEvaluation);
        let request_id = state.evaluation.pending_id().expect("pending");
        state = reduce(
            state,
            Action::ResponseReceived {
                request_id,
                kind: RequestKind::Evaluation,
                response: ok(r#"{"@type": "Results"}"#),
            },
        );
        assert!(state.evaluation.error().is_some());
        assert!(state.alert.is_some());
    }
}
