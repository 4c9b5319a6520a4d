use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::widgets::Clear;
use ratatui::{
    prelude::*,
    style::Style,
    widgets::{Block, Paragraph},
};
use senpy_types::{Effect, Modal, Msg, Route};

use super::components::{
    AlertComponent, AnalyseComponent, Component, EvaluateComponent, HelpComponent, LogsComponent, PluginsComponent,
    VerticalNavBarComponent,
};
use super::theme::theme_helpers as th;
use super::utils::centered_rect;
use crate::app::{App, MainFocus};

pub struct ModalLayout(Box<dyn Fn(Rect) -> Rect>);

impl std::fmt::Debug for ModalLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModalLayout")
    }
}

type ModalView = (Box<dyn Component>, ModalLayout);

#[derive(Default)]
pub struct MainView {
    /// Current main view component
    pub content_view: Option<Box<dyn Component>>,
    pub nav_bar_view: VerticalNavBarComponent,
    /// Currently open modal component
    pub modal_view: Option<ModalView>,
    pub logs_view: LogsComponent,
}

impl MainView {
    pub fn new(content_view: Option<Box<dyn Component>>) -> Self {
        Self {
            content_view,
            nav_bar_view: VerticalNavBarComponent::new(),
            modal_view: None,
            logs_view: LogsComponent,
        }
    }

    /// Swap the content view for `route`. Use `Effect::SwitchTo` rather than
    /// calling this directly so route hooks run.
    pub fn set_current_route(&mut self, app: &mut App, route: Route) {
        let view: Box<dyn Component> = match route {
            Route::Analyse => Box::new(AnalyseComponent::default()),
            Route::Plugins => Box::new(PluginsComponent::default()),
            Route::Evaluate => Box::new(EvaluateComponent),
        };
        app.current_route = app.nav_bar.set_route(route);
        app.main_focus = MainFocus::Content;
        self.content_view = Some(view);
    }

    /// Update the open modal kind (use None to clear).
    pub fn set_open_modal_kind(&mut self, app: &mut App, modal: Option<Modal>) {
        self.modal_view = modal.map(|kind| -> ModalView {
            match kind {
                Modal::Help => (
                    Box::new(HelpComponent),
                    ModalLayout(Box::new(|rect| centered_rect(80, 70, rect))),
                ),
                Modal::Alert => (
                    Box::new(AlertComponent),
                    ModalLayout(Box::new(|rect| centered_rect(60, 30, rect))),
                ),
            }
        });
        app.open_modal_kind = modal;
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        let mut effects = app.update(&msg);
        match self.modal_view.as_mut() {
            Some((modal, _)) => effects.extend(modal.handle_message(app, msg)),
            None => {
                if let Some(content) = self.content_view.as_mut() {
                    effects.extend(content.handle_message(app, msg));
                }
            }
        }
        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if let Some((modal, _)) = self.modal_view.as_mut() {
            return modal.handle_key_events(app, key);
        }

        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(1) => return vec![Effect::ShowModal(Modal::Help)],
            KeyCode::Char('q') if control => return vec![Effect::Quit],
            KeyCode::Char('l') if control => {
                app.logs.toggle_visible();
                app.main_focus = if app.logs.is_visible { MainFocus::Logs } else { MainFocus::Content };
                return Vec::new();
            }
            _ => {}
        }

        match app.main_focus {
            MainFocus::Navigation => self.nav_bar_view.handle_key_events(app, key),
            MainFocus::Logs if app.logs.is_visible => self.logs_view.handle_key_events(app, key),
            MainFocus::Logs | MainFocus::Content => match self.content_view.as_mut() {
                Some(content) => content.handle_key_events(app, key),
                None => Vec::new(),
            },
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if let Some((modal, _)) = self.modal_view.as_mut() {
            return modal.handle_mouse_events(app, mouse);
        }

        let mut effects = self.nav_bar_view.handle_mouse_events(app, mouse);
        if let Some(content) = self.content_view.as_mut() {
            effects.extend(content.handle_mouse_events(app, mouse));
        }
        effects.extend(self.logs_view.handle_mouse_events(app, mouse));
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let bg_fill = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(bg_fill, area);

        let layout = self.get_preferred_layout(app, area);
        self.nav_bar_view.render(frame, layout[0], app);
        if let Some(current) = self.content_view.as_mut() {
            current.render(frame, layout[2], app);
        }

        if app.logs.is_visible {
            self.logs_view.render(frame, layout[3], app);
        }

        let hint_spans: Vec<Span> = self.get_hint_spans(app);
        let hints_widget = Paragraph::new(Line::from(hint_spans)).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints_widget, layout[1]);

        if let Some((modal, position)) = self.modal_view.as_mut() {
            render_overlay(frame, app);
            let modal_area = position.0(area);
            frame.render_widget(Clear, modal_area);

            let modal_hints = modal.get_hint_spans(app);
            if modal_hints.is_empty() {
                modal.render(frame, modal_area, app);
            } else {
                let splits = Layout::vertical([Constraint::Percentage(100), Constraint::Length(1)]).split(modal_area);
                let hints_widget = Paragraph::new(Line::from(modal_hints))
                    .style(app.ctx.theme.text_muted_style())
                    .bg(app.ctx.theme.roles().background);
                frame.render_widget(hints_widget, splits[1]);
                modal.render(frame, splits[0], app);
            }
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans: Vec<Span> = vec![Span::styled("Hints: ", app.ctx.theme.text_muted_style())];

        match app.main_focus {
            MainFocus::Navigation => hint_spans.extend(self.nav_bar_view.get_hint_spans(app)),
            MainFocus::Logs if app.logs.is_visible => hint_spans.extend(self.logs_view.get_hint_spans(app)),
            _ => {
                if let Some(content) = self.content_view.as_ref() {
                    hint_spans.extend(content.get_hint_spans(app));
                }
            }
        }

        hint_spans.extend(th::build_hint_spans(
            &*app.ctx.theme,
            &[(" F1", " Help "), (" Ctrl+L", " Toggle logs "), (" Ctrl+C", " Quit ")],
        ));
        hint_spans
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let outer_areas = Layout::horizontal([
            Constraint::Length(9), // Nav bar width
            Constraint::Min(1),
        ])
        .split(area);
        let content_areas = Layout::vertical([
            Constraint::Percentage(100), // Main view
            Constraint::Min(1),          // Hints
        ])
        .split(outer_areas[1]);

        let main_view_areas = if content_areas[0].width >= 141 {
            let constraints = if app.logs.is_visible {
                [Constraint::Percentage(75), Constraint::Fill(1)]
            } else {
                [Constraint::Percentage(100), Constraint::Length(0)]
            };
            Layout::horizontal(constraints).split(content_areas[0])
        } else {
            let constraints = if app.logs.is_visible {
                [Constraint::Percentage(80), Constraint::Fill(1)]
            } else {
                [Constraint::Percentage(100), Constraint::Length(0)]
            };
            Layout::vertical(constraints).split(content_areas[0])
        };

        vec![
            outer_areas[0],     // navigation
            content_areas[1],   // hints bar
            main_view_areas[0], // main view
            main_view_areas[1], // logs (if open)
        ]
    }
}

fn render_overlay(frame: &mut Frame, app: &mut App) {
    frame.render_widget(Block::default().style(app.ctx.theme.modal_background_style()).dim(), frame.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{snapshot, test_app};
    use ratatui::{Terminal, backend::TestBackend};
    use senpy_types::ExecOutcome;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn loaded_catalog_renders_in_every_view() {
        let mut app = test_app();
        let mut main_view = MainView::new(None);
        main_view.set_current_route(&mut app, Route::Analyse);
        main_view.handle_message(&mut app, Msg::ExecCompleted(Box::new(ExecOutcome::CatalogLoaded(Box::new(snapshot())))));

        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        for route in [Route::Analyse, Route::Plugins, Route::Evaluate] {
            main_view.set_current_route(&mut app, route);
            if let Some(view) = main_view.content_view.as_mut() {
                view.on_route_enter(&mut app);
            }
            terminal.draw(|frame| main_view.render(frame, frame.area(), &mut app)).unwrap();
            assert!(buffer_text(&terminal).contains("sentiment140"), "{route:?} should show the plugin");
        }
    }

    #[test]
    fn modal_captures_keys_until_closed() {
        let mut app = test_app();
        let mut main_view = MainView::new(None);
        main_view.set_current_route(&mut app, Route::Analyse);

        let effects = main_view.handle_key_events(&mut app, KeyEvent::from(KeyCode::F(1)));
        assert_eq!(effects, vec![Effect::ShowModal(Modal::Help)]);
        main_view.set_open_modal_kind(&mut app, Some(Modal::Help));

        let effects = main_view.handle_key_events(&mut app, KeyEvent::from(KeyCode::Esc));
        assert_eq!(effects, vec![Effect::CloseModal]);
    }

    #[test]
    fn ctrl_l_toggles_logs_focus() {
        let mut app = test_app();
        let mut main_view = MainView::new(None);
        main_view.handle_key_events(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(app.logs.is_visible);
        assert_eq!(app.main_focus, MainFocus::Logs);
    }
}
