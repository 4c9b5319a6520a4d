//! # Senpy Console TUI
//!
//! Terminal front end for a senpy sentiment and emotion analysis service.
//! Three views share one session: **Analyse** (input, pipeline, generated
//! parameter forms and results), **Plugins** (catalog browser) and
//! **Evaluate** (plugin against datasets, metrics table).
//!
//! ## Architecture
//!
//! Components translate input into engine actions or [`senpy_types::Effect`]s.
//! The runtime turns effects into commands, runs network calls on Tokio and
//! feeds completed requests back as messages. All session logic lives in
//! `senpy-engine`.

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use senpy_api::SenpyClient;
use senpy_types::OutFormat;
use senpy_util::UserPreferences;

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures and rendering errors.
pub async fn run(client: SenpyClient, preferences: Arc<UserPreferences>, outformat: OutFormat) -> Result<()> {
    ui::runtime::run_app(client, preferences, outformat).await
}
