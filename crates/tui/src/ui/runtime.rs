//! Runtime: unified event loop and input routing for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop that handles input, background requests and
//!   the throbber animation.
//! - Route keys to the main view and execute returned `Effect`s.
//!
//! Unified Event Loop Strategy
//! - A dedicated input task blocks on `crossterm::event::read()` and forwards
//!   events over a channel.
//! - Smart ticking: fast interval (100 ms) while requests are in flight or
//!   effects are queued; long interval (5 s) when idle.
//! - Finished requests are joined from a `FuturesUnordered` and fed back as
//!   `Msg::ExecCompleted`.
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use senpy_api::SenpyClient;
use senpy_types::{Effect, ExecOutcome, Modal, Msg, OutFormat, Route};
use senpy_util::UserPreferences;
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::app::{App, SharedCtx};
use crate::cmd;
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;
use crate::ui::theme;

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Spawn the input task that forwards `crossterm` events over a Tokio
/// channel. Mouse moves are throttled to one per 16 ms.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    let mut last_mouse_move = Instant::now();

    tokio::task::spawn_blocking(move || {
        let sixteen_ms = Duration::from_millis(16);
        loop {
            match event::poll(sixteen_ms) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(error) => {
                    tracing::warn!("Failed to poll events: {}", error);
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    let is_mouse_move = event.as_mouse_event().is_some_and(|mouse| mouse.kind == MouseEventKind::Moved);
                    if is_mouse_move {
                        if last_mouse_move.elapsed() < sixteen_ms {
                            continue;
                        }
                        last_mouse_move = Instant::now();
                    }
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!("Failed to read event: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Term, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Queue the alert modal when the session holds an alert nobody shows yet.
fn sync_alert(app: &App, effects: &mut Vec<Effect>) {
    let queued = effects.iter().any(|effect| matches!(effect, Effect::ShowModal(Modal::Alert)));
    if app.session.alert.is_some() && app.open_modal_kind.is_none() && !queued {
        effects.push(Effect::ShowModal(Modal::Alert));
    }
}

/// Entry point for the TUI runtime: sets up the terminal, spawns the input
/// task, runs the event loop, and restores the terminal on exit.
pub async fn run_app(client: SenpyClient, preferences: Arc<UserPreferences>, outformat: OutFormat) -> Result<()> {
    let mut input_receiver = spawn_input_thread();

    let loaded_theme = theme::load(preferences.preferred_theme().as_deref());
    let mut app = App::new(SharedCtx::new(client, loaded_theme, preferences), outformat);
    let mut main_view = MainView::new(None);
    main_view.set_current_route(&mut app, Route::Analyse);

    let mut terminal = setup_terminal()?;

    let mut pending_execs: FuturesUnordered<JoinHandle<ExecOutcome>> = FuturesUnordered::new();
    let mut effects: Vec<Effect> = vec![Effect::LoadCatalog];

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = fast_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    loop {
        let needs_animation = app.executing || !effects.is_empty();
        let target_interval = if needs_animation { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                effects.extend(handle_input_event(&mut app, &mut main_view, event));
                needs_render = true;
            }

            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(&mut app, Msg::Tick));
                sync_alert(&app, &mut effects);
                needs_render = needs_animation || !effects.is_empty();
                if effects.iter().any(|effect| matches!(effect, Effect::Quit)) {
                    break;
                }
                if !effects.is_empty() {
                    // Effects produced while processing are queued for the next tick.
                    let mut effects_to_process = Vec::with_capacity(effects.len());
                    effects_to_process.append(&mut effects);

                    handle_navigation_effects(&mut app, &mut main_view, &mut effects_to_process, &mut effects);
                    process_effects(&mut app, &mut main_view, effects_to_process, &mut pending_execs, &mut effects);
                    sync_alert(&app, &mut effects);
                }
            }

            Some(joined) = pending_execs.next(), if !pending_execs.is_empty() => {
                let outcome = joined.unwrap_or_else(|error| ExecOutcome::Log(format!("Execution task failed: {error}")));
                effects.extend(main_view.handle_message(&mut app, Msg::ExecCompleted(Box::new(outcome))));
                sync_alert(&app, &mut effects);
                app.executing = !pending_execs.is_empty();
                if !app.executing {
                    app.throbber_idx = 0;
                }
                needs_render = true;
            }

            _ = signal::ctrl_c() => { break; }
        }

        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}

fn handle_navigation_effects(app: &mut App, main_view: &mut MainView, effects: &mut Vec<Effect>, queued_effects: &mut Vec<Effect>) {
    let navigation_effects = effects
        .extract_if(0.., |effect| {
            matches!(effect, Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal)
        })
        .collect::<Vec<Effect>>();

    for effect in navigation_effects {
        match effect {
            Effect::SwitchTo(route) => {
                if let Some(mut view) = main_view.content_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_current_route(app, route);
                if let Some(view) = main_view.content_view.as_mut() {
                    queued_effects.extend(view.on_route_enter(app));
                }
            }
            Effect::ShowModal(modal) => {
                main_view.set_open_modal_kind(app, Some(modal));
                if let Some((view, _)) = main_view.modal_view.as_mut() {
                    queued_effects.extend(view.on_route_enter(app));
                }
            }
            Effect::CloseModal => {
                if let Some((mut view, _)) = main_view.modal_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_open_modal_kind(app, None);
            }
            _ => {}
        }
    }
}

fn process_effects(
    app: &mut App,
    main_view: &mut MainView,
    effects: Vec<Effect>,
    pending_execs: &mut FuturesUnordered<JoinHandle<ExecOutcome>>,
    effects_out: &mut Vec<Effect>,
) {
    if effects.is_empty() {
        return;
    }

    let command_batch = cmd::run_from_effects(app, effects);
    if !command_batch.pending.is_empty() {
        if !app.executing {
            app.throbber_idx = 0;
        }
        pending_execs.extend(command_batch.pending);
        app.executing = true;
    }

    for outcome in command_batch.immediate {
        effects_out.extend(main_view.handle_message(app, Msg::ExecCompleted(Box::new(outcome))));
    }
}
