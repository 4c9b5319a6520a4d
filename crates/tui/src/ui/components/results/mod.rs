//! Result pane of the analysis view: structured viewer, raw text and graph.

mod results_component;
mod state;

pub use results_component::ResultsComponent;
pub use state::{ResultsState, ResultsTab};
