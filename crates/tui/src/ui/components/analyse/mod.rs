//! Analysis form: input text, plugin and pipeline selectors, output format,
//! the generated parameter forms and the result pane.

mod analyse_component;
mod state;

pub use analyse_component::AnalyseComponent;
pub use state::{AnalyseFocus, AnalyseState};
