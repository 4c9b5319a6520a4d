//! Shared types for the senpy console: service payloads, output formats and
//! the message/effect vocabulary exchanged between the terminal UI and its
//! command layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod evaluation;
pub mod plugin;
pub mod schema;

pub use evaluation::{Evaluation, Metric};
pub use plugin::{Dataset, DatasetList, Plugin, PluginList};
pub use schema::{HelpResponse, OptionValue, ParameterDescriptor, ParameterSchema};

/// Serialization requested from the service through `outformat`.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum OutFormat {
    #[default]
    #[serde(rename = "json-ld")]
    JsonLd,
    #[serde(rename = "turtle")]
    Turtle,
    #[serde(rename = "ntriples")]
    NTriples,
}

impl OutFormat {
    pub const ALL: [OutFormat; 3] = [OutFormat::JsonLd, OutFormat::Turtle, OutFormat::NTriples];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLd => "json-ld",
            Self::Turtle => "turtle",
            Self::NTriples => "ntriples",
        }
    }

    /// The next format in [`OutFormat::ALL`], wrapping around.
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|format| format == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for OutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutFormat {
    type Err = ParseOutFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json-ld" | "jsonld" => Ok(Self::JsonLd),
            "turtle" | "ttl" => Ok(Self::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            _ => Err(ParseOutFormatError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}'; expected json-ld, turtle or ntriples")]
pub struct ParseOutFormatError(pub String);

/// Raw answer from the service: whatever came back, undecoded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Everything the client loads from the service at startup.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub plugins: Vec<Plugin>,
    pub default_plugin: Option<Plugin>,
    pub datasets: Vec<Dataset>,
    /// Service-wide parameters from `GET /api?help=true`
    pub basic_parameters: ParameterSchema,
}

/// Which user action a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Analysis,
    Graph,
    Evaluation,
}

/// Result of an asynchronous command execution.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// Startup metadata arrived
    CatalogLoaded(Box<CatalogSnapshot>),
    /// Startup metadata could not be loaded
    CatalogFailed(String),
    /// The service answered (any status)
    Response {
        request_id: u64,
        kind: RequestKind,
        url: String,
        response: ServiceResponse,
    },
    /// No response at all
    NetworkFailure {
        request_id: u64,
        kind: RequestKind,
        url: String,
        message: String,
    },
    /// Informational line for the log panel
    Log(String),
}

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (e.g., throbbers)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Background execution completed with outcome
    ExecCompleted(Box<ExecOutcome>),
}

/// Side effects that can be triggered by state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch plugins, default plugin, datasets and basic parameters
    LoadCatalog,
    /// Send the analysis assembled from the current form
    SubmitAnalysis,
    /// Re-request the current analysis as N-Triples for the graph view
    RequestGraph,
    /// Evaluate the selected plugin on the checked datasets
    SubmitEvaluation,
    /// Put text on the system clipboard
    CopyToClipboard(String),
    // Change the main view
    SwitchTo(Route),
    // Display a modal view
    ShowModal(Modal),
    // Hide any open modals
    CloseModal,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Analyse,
    Plugins,
    Evaluate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Help,
    Alert,
}
