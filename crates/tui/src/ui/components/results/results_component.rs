use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use senpy_engine::{AnalysisResult, RequestState, ResultView, TripleGraph};
use senpy_types::Effect;

use super::{ResultsState, ResultsTab};
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::common::{highlight_pretty_json_lines, highlight_url_lines};
use crate::ui::theme::roles::Theme;
use crate::ui::theme::theme_helpers as th;

/// Result pane. Owns no state; reads `app.session` and `app.analyse.results`.
#[derive(Debug, Default)]
pub struct ResultsComponent {
    pub focused: bool,
}

impl ResultsComponent {
    /// Switch tab; entering the graph tab loads the triples of the last
    /// analysis once.
    pub fn select_tab(app: &mut App, tab: ResultsTab) -> Vec<Effect> {
        app.analyse.results.select_tab(tab);
        let wants_graph = tab == ResultsTab::Graph
            && matches!(app.session.graph, RequestState::Idle)
            && app.session.analysis.result().is_some();
        if wants_graph { vec![Effect::RequestGraph] } else { Vec::new() }
    }
}

impl Component for ResultsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let results = &mut app.analyse.results;
        match key.code {
            KeyCode::Up => results.scroll_by(-1),
            KeyCode::Down => results.scroll_by(1),
            KeyCode::PageUp => results.scroll_by(-(results.viewport_height.max(1) as i32)),
            KeyCode::PageDown => results.scroll_by(results.viewport_height.max(1) as i32),
            KeyCode::Home => results.scroll_to_top(),
            KeyCode::Left => {
                let tab = results.tab.step(false);
                return Self::select_tab(app, tab);
            }
            KeyCode::Right => {
                let tab = results.tab.step(true);
                return Self::select_tab(app, tab);
            }
            KeyCode::Char('r') if results.tab == ResultsTab::Graph && app.session.analysis.result().is_some() => {
                return vec![Effect::RequestGraph];
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Results"), self.focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let areas = self.get_preferred_layout(app, inner);
        let throbber = app.throbber_frame();
        frame.render_widget(Paragraph::new(status_line(&app.session.analysis, throbber, theme)), areas[0]);

        let titles = ResultsTab::ALL.iter().map(|tab| Span::raw(tab.title())).collect();
        frame.render_widget(th::tabs(theme, titles, app.analyse.results.tab.index()), areas[1]);

        let body_area = areas[2];
        let lines: Vec<Line> = match app.analyse.results.tab {
            ResultsTab::Viewer => match app.session.analysis.result() {
                Some(result) => match (&result.view, result.pretty.as_deref()) {
                    (ResultView::Structured(_), Some(pretty)) => highlight_pretty_json_lines(pretty, theme),
                    _ => vec![muted_line("The response is not JSON; it is shown in the Raw tab.", theme)],
                },
                None => placeholder_lines(&app.session.analysis, theme),
            },
            ResultsTab::Raw => match app.session.analysis.result() {
                Some(result) if result.body.is_empty() => vec![muted_line("The response body is empty.", theme)],
                Some(result) => highlight_url_lines(&result.body, theme),
                None => placeholder_lines(&app.session.analysis, theme),
            },
            ResultsTab::Graph => match &app.session.graph {
                RequestState::Succeeded { result, .. } => graph_lines(result, theme),
                RequestState::Pending { url, .. } => vec![Line::from(vec![
                    Span::styled(format!("{throbber} Loading triples "), theme.status_info()),
                    Span::styled(url.as_str(), theme.text_muted_style()),
                ])],
                RequestState::Failed { message, .. } => vec![Line::from(Span::styled(message.as_str(), theme.status_error()))],
                RequestState::Idle => vec![muted_line("Run an analysis, then open this tab to load its triples.", theme)],
            },
        };

        let results = &mut app.analyse.results;
        results.viewport_height = body_area.height;
        results.line_count = lines.len();
        results.scroll_by(0);
        let wrap = if results.tab == ResultsTab::Raw { Some(Wrap { trim: false }) } else { None };
        let mut paragraph = Paragraph::new(lines).scroll((results.scroll, 0));
        if let Some(wrap) = wrap {
            paragraph = paragraph.wrap(wrap);
        }
        frame.render_widget(paragraph, body_area);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hints = vec![(" ←/→", " Tab "), (" ↑/↓", " Scroll ")];
        if app.analyse.results.tab == ResultsTab::Graph {
            hints.push((" r", " Reload graph "));
        }
        th::build_hint_spans(&*app.ctx.theme, &hints)
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(area)
            .to_vec()
    }
}

fn muted_line<'a>(text: &'a str, theme: &dyn Theme) -> Line<'a> {
    Line::from(Span::styled(text, theme.text_muted_style()))
}

fn status_line<'a>(state: &'a RequestState<AnalysisResult>, throbber: &str, theme: &dyn Theme) -> Line<'a> {
    match state {
        RequestState::Idle => muted_line("No analysis yet.", theme),
        RequestState::Pending { url, .. } => Line::from(vec![
            Span::styled(format!("{throbber} GET "), theme.status_info()),
            Span::styled(url.as_str(), theme.text_secondary_style()),
        ]),
        RequestState::Succeeded { url, result, .. } => {
            let code = result.status_code;
            let style = if (200..300).contains(&code) {
                theme.status_success()
            } else {
                theme.status_warning()
            };
            Line::from(vec![
                Span::styled(format!("HTTP {code} "), style.add_modifier(Modifier::BOLD)),
                Span::styled(url.as_str(), theme.text_secondary_style()),
            ])
        }
        RequestState::Failed { url, .. } => Line::from(vec![
            Span::styled("Failed ", theme.status_error().add_modifier(Modifier::BOLD)),
            Span::styled(url.as_str(), theme.text_secondary_style()),
        ]),
    }
}

fn placeholder_lines<'a, T>(state: &'a RequestState<T>, theme: &dyn Theme) -> Vec<Line<'a>> {
    match state {
        RequestState::Pending { .. } => vec![muted_line("Waiting for the service…", theme)],
        RequestState::Failed { message, .. } => vec![Line::from(Span::styled(message.as_str(), theme.status_error()))],
        _ => vec![muted_line("Fill in the form and press Ctrl+R to analyse.", theme)],
    }
}

fn graph_lines<'a>(graph: &'a TripleGraph, theme: &dyn Theme) -> Vec<Line<'a>> {
    if graph.is_empty() {
        return vec![muted_line("The service returned no triples.", theme)];
    }
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{} triples, {} nodes, {} edges",
                graph.triples.len(),
                graph.nodes.len(),
                graph.edges.len()
            ),
            theme.text_muted_style(),
        )),
        Line::default(),
    ];
    for (subject, statements) in graph.adjacency() {
        lines.push(Line::from(Span::styled(subject, theme.accent_emphasis_style())));
        for (predicate, object) in statements {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(predicate, theme.syntax_keyword_style()),
                Span::styled(" → ", theme.text_muted_style()),
                Span::styled(object, theme.text_primary_style()),
            ]));
        }
    }
    lines
}
