use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
};
use senpy_engine::{Action, RequestState, metric_headers, metric_rows};
use senpy_types::{Effect, RequestKind};

use super::EvaluateFocus;
use crate::app::{App, MainFocus};
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct EvaluateComponent;

impl EvaluateComponent {
    fn escape(app: &mut App) {
        if app.session.evaluation.is_pending() {
            app.dispatch(Action::Cancel(RequestKind::Evaluation));
            app.logs.append("Evaluation cancelled");
        } else {
            app.main_focus = MainFocus::Navigation;
        }
    }

    fn toggle_dataset(app: &mut App) {
        let id = app
            .session
            .catalog
            .datasets()
            .get(app.evaluate.dataset_cursor)
            .map(|dataset| dataset.id.clone());
        if let Some(id) = id {
            app.dispatch(Action::ToggleDataset(id));
        }
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let content_focused = app.main_focus == MainFocus::Content;
        let focus = app.evaluate.focus;
        let [plugin_area, datasets_area, submit_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)]).areas(area);

        let plugin_focused = content_focused && focus == EvaluateFocus::Plugin;
        let plugin_block = th::block(theme, Some("Plugin"), plugin_focused);
        let plugin_text = match app.session.evaluation_plugin.as_deref() {
            Some(name) => Span::styled(format!("‹ {name} ›"), th::focusable_style(theme, plugin_focused)),
            None => Span::styled("← → to choose a plugin", theme.text_muted_style()),
        };
        frame.render_widget(Paragraph::new(plugin_text).block(plugin_block), plugin_area);

        let datasets_focused = content_focused && focus == EvaluateFocus::Datasets;
        let datasets_block = th::block(theme, Some("Datasets"), datasets_focused);
        let datasets = app.session.catalog.datasets();
        let lines: Vec<Line> = if datasets.is_empty() {
            vec![Line::from(Span::styled("The service lists no datasets.", theme.text_muted_style()))]
        } else {
            datasets
                .iter()
                .enumerate()
                .map(|(index, dataset)| {
                    let mark = if app.session.checked_datasets.contains(&dataset.id) { "[x] " } else { "[ ] " };
                    let under_cursor = datasets_focused && index == app.evaluate.dataset_cursor;
                    Line::from(vec![
                        Span::styled(mark, theme.accent_emphasis_style()),
                        Span::styled(dataset.id.as_str(), th::focusable_style(theme, under_cursor)),
                    ])
                })
                .collect()
        };
        let inner_height = datasets_block.inner(datasets_area).height as usize;
        let skip = (app.evaluate.dataset_cursor + 1).saturating_sub(inner_height);
        let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
        frame.render_widget(Paragraph::new(visible).block(datasets_block), datasets_area);

        let submit_focused = content_focused && focus == EvaluateFocus::Submit;
        let submit = Span::styled("[ Evaluate ]", th::focusable_style(theme, submit_focused).add_modifier(Modifier::BOLD));
        frame.render_widget(Paragraph::new(submit), submit_area);
    }

    fn render_metrics(&self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.main_focus == MainFocus::Content && app.evaluate.focus == EvaluateFocus::Metrics;
        let block = th::block(theme, Some("Metrics"), focused);

        let message = match &app.session.evaluation {
            RequestState::Idle => Some(Line::from(Span::styled(
                "Check one or more datasets and press Ctrl+R.",
                theme.text_muted_style(),
            ))),
            RequestState::Pending { url, .. } => Some(Line::from(vec![
                Span::styled(format!("{} ", app.throbber_frame()), theme.status_info()),
                Span::styled(format!("Evaluating {url}"), theme.text_secondary_style()),
            ])),
            RequestState::Failed { message, .. } => Some(Line::from(Span::styled(message.clone(), theme.status_error()))),
            RequestState::Succeeded { result, .. } if result.evaluations.is_empty() => Some(Line::from(Span::styled(
                "The service returned no evaluations.",
                theme.text_muted_style(),
            ))),
            RequestState::Succeeded { .. } => None,
        };
        if let Some(message) = message {
            frame.render_widget(Paragraph::new(message).wrap(Wrap { trim: true }).block(block), area);
            return;
        }
        let Some(result) = app.session.evaluation.result() else {
            return;
        };

        let headers = metric_headers(&result.evaluations);
        let rows = metric_rows(&result.evaluations);
        let header = Row::new(
            ["Plugin".to_string(), "Dataset".to_string()]
                .into_iter()
                .chain(headers.iter().cloned())
                .map(|title| Cell::from(title).style(th::table_header_style(theme))),
        )
        .style(th::table_header_row_style(theme));
        let body = rows.into_iter().enumerate().map(|(index, row)| {
            Row::new(
                [row.evaluates, row.evaluates_on]
                    .into_iter()
                    .chain(row.cells)
                    .map(Cell::from),
            )
            .style(th::table_row_style(theme, index))
        });
        let mut widths = vec![Constraint::Min(14), Constraint::Min(12)];
        widths.extend(headers.iter().map(|title| Constraint::Length((title.chars().count() as u16).max(13) + 1)));
        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .row_highlight_style(th::table_selected_style(theme));
        frame.render_stateful_widget(table, area, &mut app.evaluate.metrics_table);
    }
}

impl Component for EvaluateComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Effect::SubmitEvaluation];
        }
        match key.code {
            KeyCode::Esc => {
                Self::escape(app);
                return Vec::new();
            }
            KeyCode::Tab => {
                app.evaluate.focus = app.evaluate.focus.step(true);
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.evaluate.focus = app.evaluate.focus.step(false);
                return Vec::new();
            }
            _ => {}
        }

        match app.evaluate.focus {
            EvaluateFocus::Plugin => match key.code {
                KeyCode::Left => app.dispatch(Action::StepEvaluationPlugin { forward: false }),
                KeyCode::Right | KeyCode::Char(' ') => app.dispatch(Action::StepEvaluationPlugin { forward: true }),
                KeyCode::Down | KeyCode::Enter => app.evaluate.focus = EvaluateFocus::Datasets,
                _ => {}
            },
            EvaluateFocus::Datasets => {
                let count = app.session.catalog.datasets().len();
                match key.code {
                    KeyCode::Up if app.evaluate.dataset_cursor == 0 => app.evaluate.focus = EvaluateFocus::Plugin,
                    KeyCode::Up => app.evaluate.move_dataset_cursor(count, false),
                    KeyCode::Down if app.evaluate.dataset_cursor + 1 >= count => app.evaluate.focus = EvaluateFocus::Submit,
                    KeyCode::Down => app.evaluate.move_dataset_cursor(count, true),
                    KeyCode::Char(' ') | KeyCode::Enter => Self::toggle_dataset(app),
                    _ => {}
                }
            }
            EvaluateFocus::Submit => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => return vec![Effect::SubmitEvaluation],
                KeyCode::Up => app.evaluate.focus = EvaluateFocus::Datasets,
                KeyCode::Down => app.evaluate.focus = EvaluateFocus::Metrics,
                _ => {}
            },
            EvaluateFocus::Metrics => match key.code {
                KeyCode::Up => app.evaluate.metrics_table.select_previous(),
                KeyCode::Down => app.evaluate.metrics_table.select_next(),
                _ => {}
            },
        }
        Vec::new()
    }

    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        if app.session.evaluation_plugin.is_none() {
            app.dispatch(Action::StepEvaluationPlugin { forward: true });
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let areas = self.get_preferred_layout(app, rect);
        self.render_controls(frame, areas[0], app);
        self.render_metrics(frame, areas[1], app);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hints = vec![(" Ctrl+R", " Evaluate "), (" Tab", " Next ")];
        match app.evaluate.focus {
            EvaluateFocus::Plugin => hints.push((" ←/→", " Plugin ")),
            EvaluateFocus::Datasets => hints.push((" Space", " Toggle ")),
            EvaluateFocus::Submit | EvaluateFocus::Metrics => {}
        }
        hints.push((" Esc", " Cancel/back "));
        th::build_hint_spans(&*app.ctx.theme, &hints)
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area)
            .to_vec()
    }
}
