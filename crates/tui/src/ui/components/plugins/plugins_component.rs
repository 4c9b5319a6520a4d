use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
};
use senpy_engine::{Action, CatalogStatus};
use senpy_types::{Effect, Plugin, Route};

use super::{PluginRow, PluginsState};
use crate::app::{App, MainFocus};
use crate::ui::components::Component;
use crate::ui::theme::roles::Theme;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct PluginsComponent {
    list_area: Rect,
}

impl PluginsComponent {
    fn choose(app: &mut App) -> Vec<Effect> {
        let Some(name) = app.plugins.selected_plugin(&app.session.catalog) else {
            return Vec::new();
        };
        if !app.session.catalog.is_selectable(&name) {
            app.logs.append(format!("{name} is not activated"));
            return Vec::new();
        }
        app.dispatch(Action::SelectPlugin(name));
        vec![Effect::SwitchTo(Route::Analyse)]
    }

    fn add_stage(app: &mut App) {
        if let Some(name) = app.plugins.selected_plugin(&app.session.catalog) {
            app.dispatch(Action::AddStage(name.clone()));
            app.logs.append(format!("Added {name} to the pipeline"));
        }
    }
}

impl Component for PluginsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Down => app.plugins.move_cursor(&app.session.catalog, true),
            KeyCode::Up => app.plugins.move_cursor(&app.session.catalog, false),
            KeyCode::Enter => return Self::choose(app),
            KeyCode::Char('a') => Self::add_stage(app),
            KeyCode::Esc | KeyCode::BackTab => app.main_focus = MainFocus::Navigation,
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let position = Position::new(mouse.column, mouse.row);
        if !self.list_area.contains(position) {
            return Vec::new();
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let row = (mouse.row - self.list_area.y) as usize + app.plugins.list_state.offset();
                if matches!(PluginsState::rows(&app.session.catalog).get(row), Some(PluginRow::Plugin(_))) {
                    app.plugins.list_state.select(Some(row));
                }
            }
            MouseEventKind::ScrollDown => app.plugins.move_cursor(&app.session.catalog, true),
            MouseEventKind::ScrollUp => app.plugins.move_cursor(&app.session.catalog, false),
            _ => {}
        }
        Vec::new()
    }

    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.plugins.ensure_selection(&app.session.catalog);
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let areas = self.get_preferred_layout(app, rect);
        let theme = &*app.ctx.theme;
        let focused = app.main_focus == MainFocus::Content;
        let catalog = &app.session.catalog;

        let list_block = th::block(theme, Some("Plugins"), focused);
        let list_inner = list_block.inner(areas[0]);
        frame.render_widget(list_block, areas[0]);

        if catalog.is_empty() {
            let message = match &app.session.catalog_status {
                CatalogStatus::Loading => Span::styled("Loading plugins…", theme.text_muted_style()),
                CatalogStatus::Failed(error) => Span::styled(format!("Could not load plugins: {error}"), theme.status_error()),
                CatalogStatus::Ready => Span::styled("The service reports no plugins.", theme.text_muted_style()),
            };
            frame.render_widget(Paragraph::new(message).wrap(Wrap { trim: true }), list_inner);
            self.list_area = Rect::default();
            return;
        }

        let items: Vec<ListItem> = PluginsState::rows(catalog)
            .into_iter()
            .map(|row| match row {
                PluginRow::Header(plugin_type) => ListItem::new(Line::from(Span::styled(
                    plugin_type,
                    theme.accent_primary_style().add_modifier(Modifier::BOLD),
                ))),
                PluginRow::Plugin(name) => {
                    let style = if catalog.is_selectable(&name) {
                        theme.text_primary_style()
                    } else {
                        theme.text_muted_style().add_modifier(Modifier::CROSSED_OUT)
                    };
                    let marker = if app.session.selected.as_deref() == Some(name.as_str()) { "● " } else { "  " };
                    ListItem::new(Line::from(vec![Span::raw(marker), Span::styled(name, style)]))
                }
            })
            .collect();
        let list = List::new(items).highlight_style(th::table_selected_style(theme));
        frame.render_stateful_widget(list, list_inner, &mut app.plugins.list_state);
        self.list_area = list_inner;

        let detail_block = th::block(theme, Some("Details"), false);
        let detail_inner = detail_block.inner(areas[1]);
        frame.render_widget(detail_block, areas[1]);
        let selected = app.plugins.selected_plugin(catalog);
        if let Some(plugin) = selected.as_deref().and_then(|name| catalog.get(name)) {
            let lines = detail_lines(plugin, detail_inner.width, theme);
            frame.render_widget(Paragraph::new(lines), detail_inner);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[(" ↑/↓", " Move "), (" Enter", " Use plugin "), (" a", " Add stage "), (" Esc", " Back ")],
        )
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area)
            .to_vec()
    }
}

fn field<'a>(label: &'a str, value: String, theme: &dyn Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), theme.text_secondary_style().add_modifier(Modifier::BOLD)),
        Span::styled(value, theme.text_primary_style()),
    ])
}

fn detail_lines(plugin: &Plugin, width: u16, theme: &dyn Theme) -> Vec<Line<'static>> {
    let width = (width as usize).max(20);
    let mut lines = vec![
        field("Name", plugin.name.clone(), theme),
        field("Type", plugin.plugin_type.clone(), theme),
        field("Version", plugin.version.clone().unwrap_or_else(|| "-".into()), theme),
    ];
    if let Some(url) = &plugin.url {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", "URL"), theme.text_secondary_style().add_modifier(Modifier::BOLD)),
            Span::styled(url.clone(), theme.link_style()),
        ]));
    }
    let status = if plugin.is_activated {
        Span::styled("activated", theme.status_success())
    } else {
        Span::styled("not activated", theme.status_warning())
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{:<12}", "Status"), theme.text_secondary_style().add_modifier(Modifier::BOLD)),
        status,
    ]));

    if let Some(description) = plugin.description.as_deref().filter(|text| !text.trim().is_empty()) {
        lines.push(Line::default());
        lines.extend(
            textwrap::wrap(description.trim(), width)
                .into_iter()
                .map(|line| Line::from(Span::styled(line.into_owned(), theme.text_primary_style()))),
        );
    }

    lines.push(Line::default());
    if plugin.extra_params.is_empty() {
        lines.push(Line::from(Span::styled("No extra parameters.", theme.text_muted_style())));
        return lines;
    }
    lines.push(Line::from(Span::styled(
        "Extra parameters",
        theme.accent_primary_style().add_modifier(Modifier::BOLD),
    )));
    for (name, descriptor) in &plugin.extra_params {
        let mut header = vec![Span::styled(format!("  {name}"), theme.syntax_keyword_style())];
        if descriptor.required {
            header.push(Span::styled(" (required)", theme.status_warning()));
        }
        if let Some(default) = descriptor.default_text() {
            header.push(Span::styled(format!(" = {default}"), theme.syntax_string_style()));
        }
        lines.push(Line::from(header));
        if let Some(options) = descriptor.effective_options() {
            let joined = options.join(", ");
            lines.extend(
                textwrap::wrap(&joined, width.saturating_sub(6).max(10))
                    .into_iter()
                    .map(|line| Line::from(Span::styled(format!("    {line}"), theme.text_muted_style()))),
            );
        }
        if let Some(description) = descriptor.description.as_deref() {
            lines.extend(
                textwrap::wrap(description, width.saturating_sub(4).max(10))
                    .into_iter()
                    .map(|line| Line::from(Span::styled(format!("    {line}"), theme.text_secondary_style()))),
            );
        }
    }
    lines
}
