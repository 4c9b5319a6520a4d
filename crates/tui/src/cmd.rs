//! # Command Execution Layer
//!
//! Translates [`Effect`]s into imperative [`Cmd`]s and runs them. This is the
//! boundary where the pure session reducer meets the clipboard and the
//! network:
//! - [`from_effects`] dispatches the submitting action so the session issues a
//!   request id, then emits a [`Cmd::Fetch`] for the pending URL.
//! - [`run_cmds`] executes commands. Clipboard writes finish immediately;
//!   HTTP calls are spawned and joined by the runtime.

use senpy_api::SenpyClient;
use senpy_engine::{Action, RequestState};
use senpy_types::{Effect, ExecOutcome, RequestKind};
use tokio::task::{JoinHandle, spawn};
use tracing::debug;

use crate::app::App;

/// Side-effectful commands executed outside of the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Fetch plugins, default plugin, datasets and basic parameters.
    LoadCatalog,
    /// GET a URL the session has already marked pending.
    Fetch { request_id: u64, kind: RequestKind, url: String },
    /// Write text into the system clipboard.
    ClipboardSet(String),
}

/// Outcomes available right away plus handles for work still running.
#[derive(Debug, Default)]
pub struct CommandBatch {
    pub immediate: Vec<ExecOutcome>,
    pub pending: Vec<JoinHandle<ExecOutcome>>,
}

/// Convert application [`Effect`]s into [`Cmd`]s.
///
/// Navigation effects are handled by the runtime and produce nothing here.
pub fn from_effects(app: &mut App, effects: Vec<Effect>) -> Vec<Cmd> {
    let mut commands = Vec::new();
    for effect in effects {
        let command = match effect {
            Effect::LoadCatalog => Some(Cmd::LoadCatalog),
            Effect::SubmitAnalysis => submit(app, Action::SubmitAnalysis, RequestKind::Analysis),
            Effect::RequestGraph => submit(app, Action::RequestGraph, RequestKind::Graph),
            Effect::SubmitEvaluation => submit(app, Action::SubmitEvaluation, RequestKind::Evaluation),
            Effect::CopyToClipboard(text) => Some(Cmd::ClipboardSet(text)),
            Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal | Effect::Quit => None,
        };
        commands.extend(command);
    }
    commands
}

fn submit(app: &mut App, action: Action, kind: RequestKind) -> Option<Cmd> {
    app.dispatch(action);
    let (request_id, url) = match kind {
        RequestKind::Analysis => pending(&app.session.analysis),
        RequestKind::Graph => pending(&app.session.graph),
        RequestKind::Evaluation => pending(&app.session.evaluation),
    }?;
    Some(Cmd::Fetch { request_id, kind, url })
}

fn pending<T>(state: &RequestState<T>) -> Option<(u64, String)> {
    match state {
        RequestState::Pending { request_id, url } => Some((*request_id, url.clone())),
        _ => None,
    }
}

/// Execute `commands`, spawning network work on the Tokio runtime.
pub fn run_cmds(app: &mut App, commands: Vec<Cmd>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in commands {
        match command {
            Cmd::ClipboardSet(text) => batch.immediate.push(execute_clipboard_set(text)),
            Cmd::LoadCatalog => batch.pending.push(spawn(load_catalog(app.ctx.client.clone()))),
            Cmd::Fetch { request_id, kind, url } => {
                app.logs.append(format!("GET {url}"));
                batch.pending.push(spawn(fetch(app.ctx.client.clone(), request_id, kind, url)));
            }
        }
    }
    batch
}

pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let commands = from_effects(app, effects);
    run_cmds(app, commands)
}

fn execute_clipboard_set(text: String) -> ExecOutcome {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => ExecOutcome::Log("Copied request URL to the clipboard".to_string()),
        Err(error) => ExecOutcome::Log(format!("Clipboard error: {error}")),
    }
}

async fn load_catalog(client: SenpyClient) -> ExecOutcome {
    match client.catalog().await {
        Ok(snapshot) => ExecOutcome::CatalogLoaded(Box::new(snapshot)),
        Err(error) => ExecOutcome::CatalogFailed(error.to_string()),
    }
}

async fn fetch(client: SenpyClient, request_id: u64, kind: RequestKind, url: String) -> ExecOutcome {
    debug!(request_id, ?kind, %url, "sending request");
    match client.fetch(&url).await {
        Ok(response) => ExecOutcome::Response {
            request_id,
            kind,
            url,
            response,
        },
        Err(error) => ExecOutcome::NetworkFailure {
            request_id,
            kind,
            url,
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{snapshot, test_app};
    use senpy_types::{ExecOutcome, Msg, Route};

    #[test]
    fn submit_effects_become_fetches_for_the_pending_url() {
        let mut app = test_app();
        app.update(&Msg::ExecCompleted(Box::new(ExecOutcome::CatalogLoaded(Box::new(snapshot())))));
        app.dispatch(Action::SetInput("good day".into()));

        let commands = from_effects(&mut app, vec![Effect::SubmitAnalysis, Effect::SwitchTo(Route::Plugins)]);
        let request_id = app.session.analysis.pending_id().unwrap();
        assert_eq!(
            commands,
            vec![Cmd::Fetch {
                request_id,
                kind: RequestKind::Analysis,
                url: "http://localhost:5000/api?algo=sentiment140&i=good%20day&outformat=json-ld&language=en".into(),
            }]
        );
    }

    #[test]
    fn rejected_submissions_raise_an_alert_instead_of_a_fetch() {
        let mut app = test_app();
        app.update(&Msg::ExecCompleted(Box::new(ExecOutcome::CatalogLoaded(Box::new(snapshot())))));

        let commands = from_effects(&mut app, vec![Effect::SubmitEvaluation, Effect::RequestGraph]);
        assert!(commands.is_empty());
        assert!(app.session.alert.is_some());
    }

    #[test]
    fn clipboard_and_catalog_map_directly() {
        let mut app = test_app();
        let commands = from_effects(&mut app, vec![Effect::LoadCatalog, Effect::CopyToClipboard("x".into())]);
        assert_eq!(commands, vec![Cmd::LoadCatalog, Cmd::ClipboardSet("x".into())]);
    }
}
