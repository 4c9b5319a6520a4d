use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use senpy_types::Effect;

use crate::app::{App, MainFocus};
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

/// Side panel listing the activity log, newest entries at the bottom.
#[derive(Debug, Default)]
pub struct LogsComponent;

impl Component for LogsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => app.logs.scroll(true, 1),
            KeyCode::Down => app.logs.scroll(false, 1),
            KeyCode::PageUp => app.logs.scroll(true, 10),
            KeyCode::PageDown => app.logs.scroll(false, 10),
            KeyCode::Esc | KeyCode::Tab => app.main_focus = MainFocus::Content,
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.main_focus == MainFocus::Logs;
        let block = th::block(theme, Some("Logs"), focused);
        let inner_height = block.inner(area).height as usize;

        let entries = app.logs.entries();
        let end = entries.len().saturating_sub(app.logs.scroll_from_bottom);
        let start = end.saturating_sub(inner_height);
        let lines: Vec<Line> = entries[start..end]
            .iter()
            .map(|entry| {
                let (stamp, text) = entry.split_once(' ').unwrap_or(("", entry.as_str()));
                Line::from(vec![
                    Span::styled(stamp, theme.text_muted_style()),
                    Span::raw(" "),
                    Span::styled(text, theme.text_primary_style()),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" ↑/↓", " Scroll "), (" Esc", " Back ")])
    }
}
