//! Chat panel widget.
//!
//! Header, transcript and typing indicator. Assistant bubbles sit on the
//! left, user bubbles on the right, oldest message first.
//!
//! ```text
//! ┌─ Investment Assistant ───────────────────────┐
//! │ Expert guidance for your real estate ...     │
//! │ ● Market data live                           │
//! │                                              │
//! │ A  Assistant                                 │
//! │  Welcome to Manhattan Prime Properties...    │
//! │  [F1] Buy 100 tokens ($1,000)                │
//! │                                       You  U │
//! │                    I'd like to invest $1,000 │
//! └──────────────────────────────────────────────┘
//! ```

use concierge_engine::{ConversationStore, Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Header lines below the border title.
const HEADER_HEIGHT: u16 = 3;

/// Chat transcript with header.
pub struct ChatPanel<'a> {
    store: &'a ConversationStore,
    theme: &'a Theme,
    empty_hint: &'a str,
    typing: bool,
    scroll_back: u16,
}

impl<'a> ChatPanel<'a> {
    pub fn new(store: &'a ConversationStore, theme: &'a Theme) -> Self {
        Self {
            store,
            theme,
            empty_hint: "",
            typing: false,
            scroll_back: 0,
        }
    }

    /// Hint shown while only the welcome message exists.
    #[must_use]
    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }

    /// Show the typing indicator.
    #[must_use]
    pub fn typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    /// Lines scrolled back from the newest message.
    #[must_use]
    pub fn scroll_back(mut self, lines: u16) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Build every transcript line for a panel `width` columns wide.
    pub(crate) fn transcript_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in self.store.messages() {
            lines.extend(message_lines(message, width, self.theme));
            lines.push(Line::default());
        }

        if self.store.is_fresh() && !self.empty_hint.is_empty() {
            lines.push(Line::default());
            for hint in textwrap::wrap(self.empty_hint, width.max(1)) {
                lines.push(
                    Line::from(Span::styled(
                        hint.into_owned(),
                        Style::default()
                            .fg(self.theme.muted)
                            .add_modifier(Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center),
                );
            }
        }

        if self.typing {
            lines.push(Line::from(Span::styled(
                "A  typing...",
                Style::default().fg(self.theme.subtext),
            )));
        }

        lines
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "Expert guidance for your real estate investment",
                Style::default().fg(self.theme.subtext),
            )),
            Line::from(vec![
                Span::styled("● ", Style::default().fg(self.theme.success)),
                Span::styled("Market data live", Style::default().fg(self.theme.muted)),
            ]),
            Line::default(),
        ];
        Paragraph::new(lines).render(area, buf);
    }
}

/// Lines for one message bubble, including its quick-action chips.
fn message_lines(message: &Message, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let bubble_width = (width * 3 / 4).clamp(1, width.max(1));
    let text_width = bubble_width.saturating_sub(2).max(1);

    let (author, alignment, bubble_style) = match message.role() {
        Role::Assistant => (
            "A  Assistant",
            Alignment::Left,
            Style::default().fg(theme.text).bg(theme.assistant_bubble),
        ),
        Role::User => (
            "You  U",
            Alignment::Right,
            Style::default().fg(theme.user_text).bg(theme.user_bubble),
        ),
    };

    let mut lines = vec![Line::from(Span::styled(
        author,
        Style::default().fg(theme.subtext).add_modifier(Modifier::BOLD),
    ))
    .alignment(alignment)];

    for row in textwrap::wrap(message.content(), text_width) {
        let pad = text_width.saturating_sub(row.width());
        let padded = format!(" {row}{} ", " ".repeat(pad));
        lines.push(Line::from(Span::styled(padded, bubble_style)).alignment(alignment));
    }

    for (i, action) in message.quick_actions().iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" [F{}] ", i + 1), Style::default().fg(theme.primary)),
            Span::styled(action.label(), Style::default().fg(theme.text)),
        ]));
    }

    lines
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Investment Assistant ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let header_height = HEADER_HEIGHT.min(inner.height);
        self.render_header(Rect { height: header_height, ..inner }, buf);

        let transcript = Rect::new(
            inner.x,
            inner.y + header_height,
            inner.width,
            inner.height - header_height,
        );
        if transcript.height == 0 {
            return;
        }

        let lines = self.transcript_lines(usize::from(transcript.width));
        // Follow the newest message unless scrolled back.
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let bottom = total.saturating_sub(transcript.height);
        let offset = bottom.saturating_sub(self.scroll_back.min(bottom));

        Paragraph::new(lines)
            .scroll((offset, 0))
            .render(transcript, buf);
    }
}
