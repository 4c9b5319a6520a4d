use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use senpy_types::Effect;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("F1", "Show this help"),
            ("Ctrl+L", "Toggle the logs panel"),
            ("Esc", "Cancel a pending request, then focus the views bar"),
            ("Ctrl+C / Ctrl+Q", "Quit"),
        ],
    ),
    (
        "Analyse",
        &[
            ("Tab / Shift+Tab", "Move between fields"),
            ("←/→", "Change plugin, output format or option"),
            ("+ / -", "Add or remove the candidate stage in the pipeline"),
            ("x", "Clear the pipeline"),
            ("Ctrl+R", "Send the analysis"),
            ("Ctrl+Y", "Copy the request URL"),
            ("[ / ]", "Switch result tab (Viewer, Raw, Graph)"),
        ],
    ),
    (
        "Plugins",
        &[
            ("↑/↓", "Browse plugins"),
            ("Enter", "Use the plugin for analysis"),
            ("a", "Add the plugin as a pipeline stage"),
        ],
    ),
    (
        "Evaluate",
        &[
            ("←/→", "Change the evaluated plugin"),
            ("Space", "Toggle the dataset under the cursor"),
            ("Ctrl+R", "Run the evaluation"),
        ],
    ),
];

/// Key binding reference.
#[derive(Debug, Default)]
pub struct HelpComponent;

impl Component for HelpComponent {
    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) => vec![Effect::CloseModal],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let mut lines = Vec::new();
        for (title, bindings) in SECTIONS {
            lines.push(Line::from(Span::styled(*title, theme.accent_emphasis_style())));
            for (keys, description) in *bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<18}"), theme.text_primary_style().add_modifier(Modifier::BOLD)),
                    Span::styled(*description, theme.text_secondary_style()),
                ]));
            }
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            format!("Service: {}", app.session.api_base),
            theme.text_muted_style(),
        )));

        let block = th::block(theme, Some("Help"), true);
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), rect);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" Esc", " Close ")])
    }
}
