//! Runtime: event loop and effect handling for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single loop over terminal input, fetch result changes, and
//!   finished fetch tasks.
//! - Execute the `Effect`s returned by `App::update`: fetches run as
//!   detached tasks, interval changes are persisted and handed to the
//!   polling scheduler.
//! - Render via `ui::main::draw` after every handled event.
//!
//! Entry Point
//! - `run_app(settings, transport)` is called from `lib::run` and performs
//!   setup, event processing, and teardown.
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use resttable_api::HttpTransport;
use resttable_engine::{FetchController, FetchResult, PollingScheduler, WidgetSettings};
use resttable_types::EndpointConfig;
use tokio::{signal, sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::app::{App, Effect, Msg};
use crate::ui::{main::draw, theme};

type TuiTerminal = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<TuiTerminal> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Everything the loop needs besides `App`.
struct Session {
    settings: WidgetSettings,
    controller: Arc<FetchController>,
    scheduler: PollingScheduler,
    pending_fetches: FuturesUnordered<JoinHandle<()>>,
}

impl Session {
    fn spawn_fetch(&mut self, config: EndpointConfig) {
        let controller = Arc::clone(&self.controller);
        self.pending_fetches.push(tokio::spawn(async move {
            // Failures are recorded in the shared result and shown in the banner.
            let _ = controller.fetch(&config).await;
        }));
    }

    /// Run effects; returns `false` when the app should exit.
    fn process_effects(&mut self, app: &App, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::Fetch => self.spawn_fetch(app.config.clone()),
                Effect::SetInterval(interval) => {
                    if let Err(error) = self.settings.set_refresh_interval(interval) {
                        warn!(error = %error, "failed to persist refresh interval");
                    }
                    self.scheduler.set_interval(interval);
                    debug!(interval = %interval, "refresh interval changed");
                }
                Effect::Quit => return false,
            }
        }
        true
    }
}

/// Entry point for the TUI runtime: sets up the terminal, starts polling and
/// the initial fetch, runs the event loop, and performs cleanup on exit.
pub async fn run_app(settings: WidgetSettings, transport: Arc<dyn HttpTransport>) -> Result<()> {
    let controller = Arc::new(FetchController::new(transport));
    let results = controller.subscribe();
    let config = settings.config().clone();
    let interval = settings.refresh_interval();

    let mut scheduler = PollingScheduler::new(Arc::clone(&controller), config.clone());
    scheduler.set_interval(interval);
    let mut session = Session {
        settings,
        controller,
        scheduler,
        pending_fetches: FuturesUnordered::new(),
    };
    let mut app = App::new(config.clone(), interval, session.controller.snapshot());
    session.spawn_fetch(config);

    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, &mut session, results).await;
    session.scheduler.stop();
    cleanup_terminal(&mut terminal)?;
    outcome
}

async fn event_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    session: &mut Session,
    mut results: watch::Receiver<FetchResult>,
) -> Result<()> {
    let theme = theme::load();
    let mut events = EventStream::new();
    terminal.draw(|frame| draw(frame, app, theme.as_ref()))?;

    loop {
        let mut effects = Vec::new();
        tokio::select! {
            // Terminal input events
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(msg) = app.message_for_key(key) {
                        effects.extend(app.update(msg));
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(error = %error, "failed to read terminal event");
                    break;
                }
                // Input stream closed; shut down cleanly.
                None => break,
            },

            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = results.borrow_and_update().clone();
                effects.extend(app.update(Msg::FetchUpdated(snapshot)));
            }

            Some(joined) = session.pending_fetches.next(), if !session.pending_fetches.is_empty() => {
                if let Err(error) = joined {
                    warn!(error = %error, "fetch task failed");
                }
            }

            // Handle Ctrl+C delivered as a signal rather than a key press
            _ = signal::ctrl_c() => break,
        }

        if !session.process_effects(app, effects) {
            break;
        }
        terminal.draw(|frame| draw(frame, app, theme.as_ref()))?;
    }
    Ok(())
}
