//! Screen layout: property pane, chat pane, input bar and key hints.

use concierge_engine::TurnController;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use tokio::sync::watch;

use crate::app::App;
use crate::widgets::{ChatPanel, InputBar, PropertyPanel};

/// Tallest the input bar grows (including borders).
const MAX_INPUT_HEIGHT: u16 = 7;

const KEY_HINTS: [(&str, &str); 6] = [
    ("Enter", "send"),
    ("Shift+Enter", "newline"),
    ("F1-F4", "quick actions"),
    ("PgUp/PgDn", "scroll"),
    ("Ctrl+L", "new chat"),
    ("Esc", "quit"),
];

/// Watches the conversation and the pending input for changes since the
/// last draw.
pub struct RedrawGate {
    messages: watch::Receiver<u64>,
    pending_input: watch::Receiver<u64>,
}

impl RedrawGate {
    pub fn new(controller: &TurnController) -> Self {
        Self {
            messages: controller.store().subscribe(),
            pending_input: controller.subscribe_input(),
        }
    }

    /// Whether either value changed since the previous call.
    pub fn take_changed(&mut self) -> bool {
        let changed = self.messages.has_changed().unwrap_or(false)
            | self.pending_input.has_changed().unwrap_or(false);
        if changed {
            self.messages.borrow_and_update();
            self.pending_input.borrow_and_update();
        }
        changed
    }
}

/// Render the whole screen.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[0]);

    PropertyPanel::new(&app.property, &app.theme).render(panes[0], buf);
    render_chat(app, panes[1], buf);
    render_hints(app, rows[1], buf);
}

fn render_chat(app: &App, area: Rect, buf: &mut Buffer) {
    let input_lines = u16::try_from(app.input.content().split('\n').count()).unwrap_or(u16::MAX);
    let input_height = input_lines.saturating_add(2).clamp(3, MAX_INPUT_HEIGHT);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(input_height)])
        .split(area);

    ChatPanel::new(app.controller.store(), &app.theme)
        .empty_hint(&app.empty_hint)
        .typing(app.controller.has_pending_replies())
        .scroll_back(app.scroll_back)
        .render(chunks[0], buf);

    InputBar::new(&app.input, &app.theme)
        .placeholder(&app.input_placeholder)
        .render(chunks[1], buf);
}

fn render_hints(app: &App, area: Rect, buf: &mut Buffer) {
    let mut spans = Vec::with_capacity(KEY_HINTS.len() * 2);
    for (key, label) in KEY_HINTS {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(app.theme.base).bg(app.theme.primary),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(app.theme.subtext),
        ));
    }
    Paragraph::new(Line::from(spans)).render(area, buf);
}
