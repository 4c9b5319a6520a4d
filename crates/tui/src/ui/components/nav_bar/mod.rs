//! Vertical navigation bar component.
//!
//! A column of icon buttons, one per top-level view. Keyboard navigation
//! (Up/Down/Enter) moves between items while the bar has focus, and a left
//! click anywhere on an item switches to its view.

mod nav_bar_component;
mod state;

pub use nav_bar_component::VerticalNavBarComponent;
pub use state::{NavItem, VerticalNavBarState};
