//! concierge-tui: Terminal UI for the investment assistant
//!
//! This crate provides the TUI layer for concierge, including:
//! - The two-pane screen (property details, chat panel)
//! - Key handling for the chat input and quick actions
//! - The event loop joining terminal input with deferred replies

mod app;
mod event;
mod input;
mod theme;
mod ui;
mod widgets;

pub use app::App;
pub use event::{key_to_action, Action, Event, EventHandler};
pub use concierge_engine;

use concierge_engine::Config;
use crossterm::{
    cursor::Show as ShowCursor,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. Pending replies are cancelled when the loop ends.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(250);

    info!(
        conversation_id = %app.controller.store().conversation_id(),
        mode = %app.controller.reply_mode(),
        "Chat panel opened"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.controller.teardown();
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gate = ui::RedrawGate::new(&app.controller);
    let mut dirty = true;

    loop {
        dirty |= gate.take_changed();
        if dirty {
            terminal.draw(|frame| {
                let area = frame.area();
                ui::render(app, area, frame.buffer_mut());
            })?;
            dirty = false;
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) => {
                    app.handle_action(key_to_action(key));
                    // Cursor and scroll moves touch neither watched value.
                    dirty = true;
                }
                Some(Event::Resize(_, _)) => dirty = true,
                // Keeps the typing indicator fresh
                Some(Event::Tick) => dirty |= app.controller.has_pending_replies(),
                None => break,
            },
            Some(turn_event) = app.controller.next_event() => {
                app.on_turn_event(&turn_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
