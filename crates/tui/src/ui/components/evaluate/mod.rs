//! Evaluation view: plugin selector, dataset checklist and the metrics table.

mod evaluate_component;
mod state;

pub use evaluate_component::EvaluateComponent;
pub use state::{EvaluateFocus, EvaluateState};
