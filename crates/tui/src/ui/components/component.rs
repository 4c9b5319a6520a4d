//! Component system for the senpy TUI.
//!
//! Components are stateless views over [`App`]: they translate input into
//! reducer actions or [`Effect`]s and draw themselves from the current state.
//! Anything that must survive a redraw lives in `App`.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect, text::Span};
use senpy_types::{Effect, Msg};

use crate::app::App;

/// A UI element with its own event handling and rendering.
///
/// # Component Lifecycle
///
/// 1. **Routing**: `on_route_enter` runs when the view becomes the main
///    content, `on_route_exit` when it is replaced
/// 2. **Event Handling**: keys and mouse events arrive while the component has
///    focus
/// 3. **Rendering**: `render` draws into the provided area
pub(crate) trait Component {
    /// Handle an application message. `App::update` has already run.
    fn handle_message(&mut self, _app: &mut App, _msg: Msg) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    fn on_route_exit(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into `rect`.
    ///
    /// Rendering may record layout (hit-test areas, viewport heights) in `App`
    /// but must not change what the user sees elsewhere.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the hints bar while the component has focus.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }

    /// Sub-areas the component draws into, in a component-defined order.
    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        vec![area]
    }
}

/// Index of the area in `areas` containing `(x, y)`, if it falls inside
/// `container`.
pub fn find_target_index_by_mouse_position(container: &Rect, areas: &[Rect], x: u16, y: u16) -> Option<usize> {
    let position = ratatui::layout::Position::new(x, y);
    if !container.contains(position) {
        return None;
    }
    areas.iter().position(|area| area.contains(position))
}
