//! Plugin catalog browser: grouped list on the left, details on the right.

mod plugins_component;
mod state;

pub use plugins_component::PluginsComponent;
pub use state::{PluginRow, PluginsState};
