use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::Span,
    widgets::{Block, Borders, Paragraph},
};
use senpy_types::Effect;

use crate::app::{App, MainFocus};
use crate::ui::components::{Component, find_target_index_by_mouse_position};
use crate::ui::theme::theme_helpers as th;

/// Renders a vertical column of icon buttons with selection and focus
/// styling, and maps activation to `Effect::SwitchTo`.
#[derive(Debug, Default)]
pub struct VerticalNavBarComponent;

impl VerticalNavBarComponent {
    pub fn new() -> Self {
        Self
    }
}

impl Component for VerticalNavBarComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let state = &mut app.nav_bar;
        match key.code {
            KeyCode::Down => state.cycle_cursor(true),
            KeyCode::Up => state.cycle_cursor(false),
            KeyCode::Enter => {
                if let Some(item) = state.item_under_cursor() {
                    return vec![Effect::SwitchTo(item.route)];
                }
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Esc => app.main_focus = MainFocus::Content,
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let state = &app.nav_bar;
        let hit = find_target_index_by_mouse_position(&state.last_area, &state.per_item_areas, mouse.column, mouse.row);
        match hit.and_then(|index| state.items.get(index)) {
            Some(item) => vec![Effect::SwitchTo(item.route)],
            None => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.main_focus == MainFocus::Navigation;
        frame.render_widget(th::block(theme, Some("Views"), focused).borders(Borders::ALL), area);

        if app.nav_bar.items.is_empty() {
            return;
        }

        let rects = self.get_preferred_layout(app, area);
        for (index, item) in app.nav_bar.items.iter().enumerate() {
            let Some(row_area) = rects.get(index).copied() else {
                continue;
            };
            let is_selected = index == app.nav_bar.selected_index;
            let under_cursor = focused && index == app.nav_bar.cursor_index;
            let mut style = if is_selected {
                theme.accent_emphasis_style()
            } else {
                theme.text_secondary_style()
            };
            if under_cursor {
                style = theme.selection_style().add_modifier(Modifier::BOLD);
            }
            let button = Paragraph::new(item.icon.as_str())
                .alignment(Alignment::Center)
                .style(style)
                .block(Block::default().borders(if under_cursor { Borders::ALL } else { Borders::NONE }).border_style(theme.border_style(true)));
            frame.render_widget(button, row_area);
        }
        app.nav_bar.last_area = area;
        app.nav_bar.per_item_areas = rects;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" Enter", " Select view "), (" ↑/↓", " Navigate "), (" Tab", " Content ")])
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let row_count = app.nav_bar.items.len();
        let mut constraints = vec![Constraint::Length(3); row_count];
        constraints.push(Constraint::Min(0));
        let mut layout = Layout::vertical(constraints).margin(1).split(area).to_vec();
        layout.truncate(row_count);
        layout
    }
}
