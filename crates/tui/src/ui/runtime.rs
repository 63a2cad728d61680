//! Runtime: event loop and input routing for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Route keys to the screen component and execute returned `Effect`s.
//! - Feed finished background tasks back to the screen as `Msg`s.
//! - Render only after something visible changed.
//!
//! A dedicated input thread blocks on `crossterm::event::read()` and
//! forwards events over a channel, so the async loop never blocks on the
//! terminal. Ticks run fast while tasks are pending (throbber animation) and
//! slowly otherwise.
use std::io::Stdout;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use conform_api::ConsoleApi;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::app::{App, Effect, Msg, Screen, ScreenOutcome};
use crate::cmd;
use crate::ui::components::{self, Component};
use crate::ui::theme;

const FAST_TICK: Duration = Duration::from_millis(100);
const IDLE_TICK: Duration = Duration::from_millis(1000);
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Spawn a dedicated input thread that blocks on terminal input and forwards
/// `crossterm` events over a Tokio channel.
///
/// The thread exits once the receiver is dropped.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    thread::spawn(move || {
        while !sender.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(error) => {
                    warn!("Failed to poll terminal events: {}", error);
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!("Failed to read event: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn is_interrupt(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}

/// Starts the tasks behind `effects` and records whether any are running.
fn process_effects(app: &mut App, effects: &mut Vec<Effect>, pending: &mut FuturesUnordered<JoinHandle<Msg>>) {
    if effects.is_empty() {
        return;
    }
    let batch = cmd::run_from_effects(app, std::mem::take(effects));
    if !batch.pending.is_empty() && !app.executing {
        app.throbber_idx = 0;
    }
    pending.extend(batch.pending);
    app.executing = !pending.is_empty();
}

/// Delivers a message to the app and then to the screen.
fn dispatch(app: &mut App, view: &mut dyn Component, msg: &Msg) -> Vec<Effect> {
    app.update(msg);
    view.update(app, msg)
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    view: &mut dyn Component,
    mut effects: Vec<Effect>,
) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();

    let mut current_interval = IDLE_TICK;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut needs_render = true;

    loop {
        process_effects(app, &mut effects, &mut pending);
        if app.is_finished() {
            break;
        }
        if needs_render {
            terminal.draw(|frame| {
                let area = frame.area();
                view.render(frame, area, app);
            })?;
        }

        let target_interval = if app.executing { FAST_TICK } else { IDLE_TICK };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    // Input channel closed; shut down cleanly.
                    break;
                };
                if is_interrupt(&event) {
                    break;
                }
                needs_render = match event {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        effects.extend(view.handle_key_events(app, key));
                        true
                    }
                    Event::Resize(..) => true,
                    _ => false,
                };
            }

            _ = ticker.tick() => {
                effects.extend(dispatch(app, view, &Msg::Tick));
                needs_render = app.executing || !effects.is_empty();
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => effects.extend(dispatch(app, view, &msg)),
                    Err(error) => warn!("Background task failed: {}", error),
                }
                app.executing = !pending.is_empty();
                needs_render = true;
            }

            _ = signal::ctrl_c() => { break; }
        }
    }
    Ok(())
}

/// Entry point for the TUI runtime: builds the screen, sets up the terminal,
/// runs the event loop, and restores the terminal even when the loop fails.
pub async fn run_app(api: Arc<dyn ConsoleApi>, screen: Screen) -> Result<ScreenOutcome> {
    let mut app = App::new(api, theme::load_from_env());
    let mut view = components::for_screen(screen)?;
    view.init()?;
    let effects = view.on_route_enter(&mut app);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, view.as_mut(), effects).await;
    let cleanup = cleanup_terminal(&mut terminal);
    result?;
    cleanup?;

    let outcome = app.take_outcome().unwrap_or(ScreenOutcome::Cancelled);
    debug!(?outcome, "tui finished");
    Ok(outcome)
}
