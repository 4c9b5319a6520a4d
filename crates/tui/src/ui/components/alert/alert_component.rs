use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use senpy_engine::Action;
use senpy_types::Effect;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

/// Blocking message for failures the user must acknowledge.
#[derive(Debug, Default)]
pub struct AlertComponent;

impl Component for AlertComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => {
                app.dispatch(Action::DismissAlert);
                vec![Effect::CloseModal]
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let message = app.session.alert.as_deref().unwrap_or_default();
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(message, theme.status_error())),
            Line::default(),
            Line::from(Span::styled("[ OK ]", theme.selection_style())),
        ];
        let block = th::block(theme, Some("Alert"), true).border_style(theme.status_error());
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(block),
            rect,
        );
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" Enter", " Dismiss ")])
    }
}
