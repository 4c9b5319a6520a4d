use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use senpy_engine::{Action, CatalogStatus, Control, FormDescription, FormField, FormKind};
use senpy_types::{Effect, OutFormat, RequestKind};
use senpy_util::truncate_to_width;

use super::{AnalyseFocus, AnalyseState};
use crate::app::{App, MainFocus};
use crate::ui::components::Component;
use crate::ui::components::common::render_text_input;
use crate::ui::components::results::ResultsComponent;
use crate::ui::theme::roles::Theme;
use crate::ui::theme::theme_helpers as th;

const LABEL_WIDTH: u16 = 18;

/// One line of the form.
struct FormRow<'a> {
    focus: Option<AnalyseFocus>,
    label: String,
    value: Vec<Span<'a>>,
}

impl<'a> FormRow<'a> {
    fn new(focus: Option<AnalyseFocus>, label: impl Into<String>, value: Vec<Span<'a>>) -> Self {
        Self {
            focus,
            label: label.into(),
            value,
        }
    }

    fn heading(title: &'a str, theme: &dyn Theme) -> Self {
        Self::new(None, String::new(), vec![Span::styled(title, theme.accent_primary_style().add_modifier(Modifier::BOLD))])
    }
}

#[derive(Debug, Default)]
pub struct AnalyseComponent {
    results: ResultsComponent,
}

impl AnalyseComponent {
    fn submit(app: &mut App) -> Vec<Effect> {
        app.analyse.results.scroll_to_top();
        vec![Effect::SubmitAnalysis]
    }

    fn copy_url(app: &mut App) -> Vec<Effect> {
        match app.session.analysis_request() {
            Some(request) => vec![Effect::CopyToClipboard(request.url(&app.session.api_base))],
            None => {
                app.logs.append("Nothing to copy: no plugin is selected");
                Vec::new()
            }
        }
    }

    fn escape(app: &mut App) -> Vec<Effect> {
        if app.session.analysis.is_pending() {
            app.dispatch(Action::Cancel(RequestKind::Analysis));
            app.logs.append("Analysis cancelled");
        } else if app.session.graph.is_pending() {
            app.dispatch(Action::Cancel(RequestKind::Graph));
            app.logs.append("Graph request cancelled");
        } else {
            app.main_focus = MainFocus::Navigation;
        }
        Vec::new()
    }

    fn edit_input(app: &mut App, key: KeyEvent) {
        if app.analyse.input.handle_key(key) == Some(true) {
            let input = app.analyse.input.input().to_string();
            app.dispatch(Action::SetInput(input));
        }
    }

    fn edit_field(app: &mut App, kind: FormKind, key: KeyEvent) {
        let Some((_, field)) = app.analyse.focused_field(&app.session) else {
            return;
        };
        let name = field.name.clone();
        if field.control.is_choice() {
            let forward = match key.code {
                KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter => true,
                KeyCode::Left => false,
                _ => return,
            };
            app.dispatch(Action::CycleChoice { form: kind, name, forward });
        } else if app.analyse.field_editor.handle_key(key) == Some(true) {
            let value = app.analyse.field_editor.input().to_string();
            app.dispatch(Action::SetText { form: kind, name, value });
        }
    }

    fn edit_pipeline(app: &mut App, key: KeyEvent) {
        match key.code {
            KeyCode::Left => app.analyse.step_candidate(&app.session, false),
            KeyCode::Right => app.analyse.step_candidate(&app.session, true),
            KeyCode::Char('+') | KeyCode::Enter => {
                if let Some(name) = app.analyse.stage_candidate.clone() {
                    app.dispatch(Action::AddStage(name));
                }
            }
            KeyCode::Char('-') | KeyCode::Backspace | KeyCode::Delete => {
                if let Some(name) = app.analyse.stage_candidate.clone() {
                    app.dispatch(Action::RemoveStage(name));
                }
            }
            KeyCode::Char('x') => app.dispatch(Action::ClearStages),
            _ => {}
        }
    }

    fn is_text_entry(state: &AnalyseState, app: &App) -> bool {
        match state.focus {
            AnalyseFocus::Input => true,
            AnalyseFocus::Field(..) => state
                .focused_field(&app.session)
                .is_some_and(|(_, field)| !field.control.is_choice()),
            _ => false,
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let content_focused = app.main_focus == MainFocus::Content;
        let focus = app.analyse.focus;
        let block = th::block(theme, Some("Analyse"), content_focused && focus != AnalyseFocus::Results);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [input_area, rows_area, help_area, url_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .areas(inner);

        let input_focused = content_focused && focus == AnalyseFocus::Input;
        let input_block = th::block(theme, Some("Input"), input_focused);
        let input_inner = input_block.inner(input_area);
        frame.render_widget(input_block, input_area);
        render_text_input(frame, input_inner, &app.analyse.input, "Text to analyse", input_focused, theme);

        let rows = form_rows(app, theme);
        let focused_row = rows.iter().position(|row| row.focus == Some(focus));
        let height = rows_area.height as usize;
        let mut offset = app.analyse.form_offset.min(rows.len().saturating_sub(1));
        if let Some(row) = focused_row {
            if row < offset {
                offset = row;
            } else if row >= offset + height {
                offset = row + 1 - height;
            }
        }

        let mut editor_area = None;
        for (line_index, row) in rows.iter().skip(offset).take(height).enumerate() {
            let y = rows_area.y + line_index as u16;
            let label_area = Rect::new(rows_area.x, y, LABEL_WIDTH.min(rows_area.width), 1);
            let value_area = Rect::new(
                rows_area.x + label_area.width,
                y,
                rows_area.width.saturating_sub(label_area.width),
                1,
            );
            let row_focused = content_focused && row.focus.is_some() && row.focus == Some(focus);
            let label = truncate_to_width(&row.label, LABEL_WIDTH.saturating_sub(1) as usize);
            frame.render_widget(Paragraph::new(Span::styled(label, th::focusable_style(theme, row_focused))), label_area);

            let editing_text = row_focused && matches!(focus, AnalyseFocus::Field(..)) && Self::is_text_entry(&app.analyse, app);
            if editing_text {
                editor_area = Some(value_area);
            } else {
                frame.render_widget(Paragraph::new(Line::from(row.value.clone())), value_area);
            }
        }
        if let Some(value_area) = editor_area {
            render_text_input(frame, value_area, &app.analyse.field_editor, "", true, theme);
        }

        frame.render_widget(Paragraph::new(help_line(app, theme)).wrap(Wrap { trim: true }), help_area);

        let url_line = match app.session.analysis_request() {
            Some(request) => Line::from(vec![
                Span::styled("GET ", theme.text_secondary_style().add_modifier(Modifier::BOLD)),
                Span::styled(request.url(&app.session.api_base), theme.text_muted_style()),
            ]),
            None => Line::from(Span::styled("Select a plugin to build the request.", theme.text_muted_style())),
        };
        frame.render_widget(Paragraph::new(url_line).wrap(Wrap { trim: false }), url_area);

        app.analyse.form_offset = offset;
    }
}

impl Component for AnalyseComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if control => return Self::submit(app),
            KeyCode::Char('y') if control => return Self::copy_url(app),
            KeyCode::Esc => return Self::escape(app),
            KeyCode::Tab => {
                app.analyse.move_focus(&app.session, true);
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.analyse.move_focus(&app.session, false);
                return Vec::new();
            }
            KeyCode::Char(bracket @ ('[' | ']')) if !Self::is_text_entry(&app.analyse, app) => {
                let tab = app.analyse.results.tab.step(bracket == ']');
                return ResultsComponent::select_tab(app, tab);
            }
            _ => {}
        }

        let focus = app.analyse.focus;
        if focus != AnalyseFocus::Results && matches!(key.code, KeyCode::Up | KeyCode::Down) {
            app.analyse.move_focus(&app.session, key.code == KeyCode::Down);
            return Vec::new();
        }

        match focus {
            AnalyseFocus::Input => {
                if key.code == KeyCode::Enter {
                    return Self::submit(app);
                }
                Self::edit_input(app, key);
            }
            AnalyseFocus::Plugin => match key.code {
                KeyCode::Left => app.dispatch(Action::StepPlugin { forward: false }),
                KeyCode::Right | KeyCode::Char(' ') => app.dispatch(Action::StepPlugin { forward: true }),
                _ => {}
            },
            AnalyseFocus::Pipeline => Self::edit_pipeline(app, key),
            AnalyseFocus::OutFormat => {
                let outformat = match key.code {
                    KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter => Some(app.session.outformat.next()),
                    KeyCode::Left => Some(previous_outformat(app.session.outformat)),
                    _ => None,
                };
                if let Some(outformat) = outformat {
                    app.dispatch(Action::SetOutFormat(outformat));
                    if let Err(error) = app.ctx.preferences.set_default_outformat(Some(outformat)) {
                        tracing::warn!(%error, "could not save the output format");
                    }
                }
            }
            AnalyseFocus::Field(kind, _) => Self::edit_field(app, kind, key),
            AnalyseFocus::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    return Self::submit(app);
                }
            }
            AnalyseFocus::Results => return self.results.handle_key_events(app, key),
        }
        Vec::new()
    }

    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.analyse.reconcile(&app.session, true);
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let areas = self.get_preferred_layout(app, rect);
        self.render_form(frame, areas[0], app);
        self.results.focused = app.main_focus == MainFocus::Content && app.analyse.focus == AnalyseFocus::Results;
        self.results.render(frame, areas[1], app);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme = &*app.ctx.theme;
        let mut hints = vec![(" Ctrl+R", " Analyse "), (" Tab", " Next field ")];
        match app.analyse.focus {
            AnalyseFocus::Plugin | AnalyseFocus::OutFormat => hints.push((" ←/→", " Change ")),
            AnalyseFocus::Pipeline => hints.extend([(" ←/→", " Stage "), (" +/-", " Add/remove "), (" x", " Clear ")]),
            AnalyseFocus::Field(..) if !Self::is_text_entry(&app.analyse, app) => hints.push((" ←/→", " Option ")),
            AnalyseFocus::Results => {
                let mut spans: Vec<Span<'_>> = th::build_hint_spans(theme, &hints);
                spans.extend(self.results.get_hint_spans(app));
                return spans;
            }
            _ => {}
        }
        hints.extend([(" Ctrl+Y", " Copy URL "), (" Esc", " Cancel/back ")]);
        th::build_hint_spans(theme, &hints)
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        let layout = if area.width >= 100 {
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        } else {
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
        };
        layout.split(area).to_vec()
    }
}

fn previous_outformat(current: OutFormat) -> OutFormat {
    let all = OutFormat::ALL;
    let index = all.iter().position(|format| *format == current).unwrap_or(0);
    all[(index + all.len() - 1) % all.len()]
}

fn selector<'a>(text: impl Into<String>, theme: &dyn Theme) -> Span<'a> {
    Span::styled(format!("‹ {} ›", text.into()), theme.text_primary_style().add_modifier(Modifier::BOLD))
}

fn form_rows<'a>(app: &'a App, theme: &dyn Theme) -> Vec<FormRow<'a>> {
    let session = &app.session;
    let mut rows = Vec::new();

    let plugin_value = match (&session.catalog_status, session.selected.as_deref()) {
        (_, Some(name)) => {
            let plugin_type = session.catalog.get(name).map(|plugin| plugin.plugin_type.as_str()).unwrap_or_default();
            vec![selector(name, theme), Span::styled(format!("  {plugin_type}"), theme.text_muted_style())]
        }
        (CatalogStatus::Loading, None) => vec![Span::styled("loading plugins…", theme.text_muted_style())],
        (CatalogStatus::Failed(_), None) => vec![Span::styled("plugins unavailable", theme.status_error())],
        (CatalogStatus::Ready, None) => vec![Span::styled("no plugin can be selected", theme.status_warning())],
    };
    rows.push(FormRow::new(Some(AnalyseFocus::Plugin), "Plugin", plugin_value));

    let mut chain: Vec<Span> = Vec::new();
    for stage in session.pipeline.stages() {
        chain.push(Span::styled(stage.as_str(), theme.text_primary_style()));
        chain.push(Span::styled(" → ", theme.text_muted_style()));
    }
    chain.push(Span::styled(
        session.selected.as_deref().unwrap_or("?"),
        theme.accent_emphasis_style(),
    ));
    rows.push(FormRow::new(None, "Pipeline", chain));
    let candidate = app.analyse.stage_candidate.as_deref().unwrap_or("none");
    rows.push(FormRow::new(
        Some(AnalyseFocus::Pipeline),
        "  Stage",
        vec![selector(candidate, theme), Span::styled("  + add  - remove  x clear", theme.text_muted_style())],
    ));

    rows.push(FormRow::new(
        Some(AnalyseFocus::OutFormat),
        "Output format",
        vec![selector(session.outformat.as_str(), theme)],
    ));

    for (kind, title) in [(FormKind::Basic, "Basic parameters"), (FormKind::Extra, "Plugin parameters")] {
        rows.push(FormRow::new(None, String::new(), Vec::new()));
        rows.push(FormRow::heading(title, theme));
        match session.form(kind).description() {
            FormDescription::Placeholder(message) => {
                rows.push(FormRow::new(None, String::new(), vec![Span::styled(*message, theme.text_muted_style())]));
            }
            FormDescription::Fields(fields) => {
                rows.extend(
                    fields
                        .iter()
                        .enumerate()
                        .map(|(index, field)| field_row(kind, index, field, theme)),
                );
            }
        }
    }

    rows.push(FormRow::new(None, String::new(), Vec::new()));
    rows.push(FormRow::new(
        Some(AnalyseFocus::Submit),
        "",
        vec![Span::styled("[ Analyse ]", theme.accent_emphasis_style())],
    ));
    rows
}

fn field_row<'a>(kind: FormKind, index: usize, field: &'a FormField, theme: &dyn Theme) -> FormRow<'a> {
    let label = if field.required { format!("{}*", field.name) } else { field.name.clone() };
    let value = match &field.control {
        Control::Choice { .. } => vec![selector(field.control.value().unwrap_or("—"), theme)],
        Control::Text { value } if value.is_empty() => vec![Span::styled("(empty)", theme.text_muted_style())],
        Control::Text { value } => vec![Span::styled(value.as_str(), theme.text_primary_style())],
    };
    FormRow::new(Some(AnalyseFocus::Field(kind, index)), label, value)
}

fn help_line<'a>(app: &'a App, theme: &dyn Theme) -> Line<'a> {
    let text: &str = match app.analyse.focus {
        AnalyseFocus::Field(..) => app
            .analyse
            .focused_field(&app.session)
            .and_then(|(_, field)| field.help.as_deref())
            .unwrap_or(""),
        AnalyseFocus::Input => "The text sent as the `i` parameter.",
        AnalyseFocus::Plugin => "The last plugin of the pipeline. Deactivated plugins are skipped.",
        AnalyseFocus::Pipeline => "Stages run in order before the selected plugin.",
        AnalyseFocus::OutFormat => "Serialization requested from the service.",
        AnalyseFocus::Submit | AnalyseFocus::Results => "",
    };
    Line::from(Span::styled(text, theme.text_muted_style()))
}
