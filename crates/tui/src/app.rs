//! Application state for the senpy TUI.
//!
//! [`App`] owns the engine's [`SessionState`] plus the view state that only
//! matters to the terminal (focus, cursors, scroll offsets, logs). All
//! session changes go through [`App::dispatch`], which runs the engine
//! reducer and then brings the view state back in line with the new forms.

use std::sync::Arc;

use senpy_api::SenpyClient;
use senpy_engine::{Action, SessionState, reduce};
use senpy_types::{Effect, ExecOutcome, Modal, Msg, OutFormat, RequestKind, Route};
use senpy_util::UserPreferences;

use crate::ui::components::analyse::AnalyseState;
use crate::ui::components::evaluate::EvaluateState;
use crate::ui::components::logs::LogsState;
use crate::ui::components::nav_bar::VerticalNavBarState;
use crate::ui::components::plugins::PluginsState;
use crate::ui::components::results::ResultsTab;
use crate::ui::theme::{LoadedTheme, Theme};

const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Cross-cutting objects shared by every component.
pub struct SharedCtx {
    pub client: SenpyClient,
    pub theme: Box<dyn Theme>,
    pub theme_name: &'static str,
    pub preferences: Arc<UserPreferences>,
}

impl SharedCtx {
    pub fn new(client: SenpyClient, theme: LoadedTheme, preferences: Arc<UserPreferences>) -> Self {
        Self {
            client,
            theme: theme.theme,
            theme_name: theme.name,
            preferences,
        }
    }
}

/// Which region of the main view receives keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MainFocus {
    Navigation,
    #[default]
    Content,
    Logs,
}

pub struct App {
    pub ctx: SharedCtx,
    pub session: SessionState,
    pub current_route: Route,
    pub open_modal_kind: Option<Modal>,
    pub main_focus: MainFocus,
    pub nav_bar: VerticalNavBarState,
    pub logs: LogsState,
    pub analyse: AnalyseState,
    pub plugins: PluginsState,
    pub evaluate: EvaluateState,
    /// Whether background requests are in flight
    pub executing: bool,
    pub throbber_idx: usize,
}

impl App {
    pub fn new(ctx: SharedCtx, outformat: OutFormat) -> Self {
        let session = SessionState::new(ctx.client.base_url(), outformat);
        let mut logs = LogsState::new();
        logs.append(format!("Using {} ({} theme)", session.api_base, ctx.theme_name));
        Self {
            ctx,
            session,
            current_route: Route::Analyse,
            open_modal_kind: None,
            main_focus: MainFocus::Content,
            nav_bar: VerticalNavBarState::defaults_for_views(),
            logs,
            analyse: AnalyseState::default(),
            plugins: PluginsState::default(),
            evaluate: EvaluateState::default(),
            executing: false,
            throbber_idx: 0,
        }
    }

    /// Run `action` through the session reducer and reconcile view state.
    pub fn dispatch(&mut self, action: Action) {
        let reload_editor = !matches!(action, Action::SetText { .. } | Action::SetInput(_));
        let placeholder = SessionState::new(String::new(), OutFormat::default());
        let session = std::mem::replace(&mut self.session, placeholder);
        self.session = reduce(session, action);
        self.analyse.reconcile(&self.session, reload_editor);
    }

    pub fn throbber_frame(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }

    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.executing {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
            }
            Msg::Resize(..) => {}
            Msg::ExecCompleted(outcome) => self.apply_outcome(outcome.as_ref().clone()),
        }
        Vec::new()
    }

    fn apply_outcome(&mut self, outcome: ExecOutcome) {
        match outcome {
            ExecOutcome::CatalogLoaded(snapshot) => {
                self.logs.append(format!(
                    "Loaded {} plugins and {} datasets",
                    snapshot.plugins.len(),
                    snapshot.datasets.len()
                ));
                self.dispatch(Action::CatalogLoaded(snapshot));
                self.plugins.ensure_selection(&self.session.catalog);
            }
            ExecOutcome::CatalogFailed(message) => {
                self.logs.append(format!("Catalog failed: {message}"));
                self.dispatch(Action::CatalogFailed(message));
            }
            ExecOutcome::Response {
                request_id,
                kind,
                url,
                response,
            } => {
                self.logs.append(format!("{} {url}", response.status_code));
                self.dispatch(Action::ResponseReceived {
                    request_id,
                    kind,
                    response,
                });
                if kind == RequestKind::Analysis
                    && self.session.analysis.pending_id().is_none()
                    && let Some(result) = self.session.analysis.result()
                {
                    let tab = if result.view.is_structured() { ResultsTab::Viewer } else { ResultsTab::Raw };
                    self.analyse.results.select_tab(tab);
                }
            }
            ExecOutcome::NetworkFailure {
                request_id,
                kind,
                url,
                message,
            } => {
                self.logs.append(format!("Network error for {url}: {message}"));
                self.dispatch(Action::NetworkFailed {
                    request_id,
                    kind,
                    message,
                });
            }
            ExecOutcome::Log(line) => self.logs.append(line),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ui::theme;
    use senpy_types::{CatalogSnapshot, Plugin, ServiceResponse};
    use serde_json::json;

    pub(crate) fn test_app() -> App {
        let client = SenpyClient::new("http://localhost:5000").unwrap();
        let ctx = SharedCtx::new(client, theme::load(Some("dracula")), Arc::new(UserPreferences::ephemeral()));
        App::new(ctx, OutFormat::JsonLd)
    }

    pub(crate) fn snapshot() -> CatalogSnapshot {
        let plugins: Vec<Plugin> = serde_json::from_value(json!([
            {
                "name": "sentiment140",
                "@type": "sentimentPlugin",
                "is_activated": true,
                "extra_params": { "language": { "options": ["en", "es"], "default": "en" } }
            }
        ]))
        .unwrap();
        CatalogSnapshot {
            plugins,
            ..Default::default()
        }
    }

    fn completed(outcome: ExecOutcome) -> Msg {
        Msg::ExecCompleted(Box::new(outcome))
    }

    #[test]
    fn catalog_outcome_populates_session_and_logs() {
        let mut app = test_app();
        app.update(&completed(ExecOutcome::CatalogLoaded(Box::new(snapshot()))));
        assert_eq!(app.session.selected.as_deref(), Some("sentiment140"));
        assert_eq!(app.plugins.selected_plugin(&app.session.catalog).as_deref(), Some("sentiment140"));
        assert!(app.logs.entries().iter().any(|line| line.contains("Loaded 1 plugins")));
    }

    #[test]
    fn analysis_response_picks_the_matching_tab() {
        let mut app = test_app();
        app.update(&completed(ExecOutcome::CatalogLoaded(Box::new(snapshot()))));
        app.dispatch(Action::SetInput("hello".into()));
        app.dispatch(Action::SubmitAnalysis);
        let request_id = app.session.analysis.pending_id().unwrap();
        let url = app.session.analysis.url().unwrap().to_string();

        app.update(&completed(ExecOutcome::Response {
            request_id,
            kind: RequestKind::Analysis,
            url,
            response: ServiceResponse {
                status_code: 200,
                content_type: Some("text/turtle".into()),
                body: "<a> <b> <c> .".into(),
            },
        }));
        assert_eq!(app.analyse.results.tab, ResultsTab::Raw);
    }

    #[test]
    fn stale_response_after_cancel_is_ignored() {
        let mut app = test_app();
        app.update(&completed(ExecOutcome::CatalogLoaded(Box::new(snapshot()))));
        app.dispatch(Action::SubmitAnalysis);
        let request_id = app.session.analysis.pending_id().unwrap();
        app.dispatch(Action::Cancel(RequestKind::Analysis));

        app.update(&completed(ExecOutcome::NetworkFailure {
            request_id,
            kind: RequestKind::Analysis,
            url: "http://localhost:5000/api".into(),
            message: "connection refused".into(),
        }));
        assert!(app.session.alert.is_none());
        assert!(app.session.analysis.result().is_none());
    }

    #[test]
    fn throbber_only_moves_while_executing() {
        let mut app = test_app();
        app.update(&Msg::Tick);
        assert_eq!(app.throbber_idx, 0);
        app.executing = true;
        app.update(&Msg::Tick);
        assert_eq!(app.throbber_frame(), THROBBER_FRAMES[1]);
    }
}
