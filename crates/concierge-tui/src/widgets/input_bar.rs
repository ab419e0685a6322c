//! Full-width input bar widget.
//!
//! Always visible below the transcript. Supports multi-line input; line
//! breaks come from Shift+Enter (or Ctrl+J).

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::input::TextInputState;
use crate::theme::Theme;

/// Input bar for composing a message.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    placeholder: &'a str,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            placeholder: "",
        }
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Build the display lines and the index of the line holding the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let content = self.input.content();
        let cursor_pos = self.input.cursor();

        let text_lines: Vec<&str> = content.split('\n').collect();

        let mut char_count = 0;
        let mut cursor_line = 0;
        let mut cursor_col = 0;
        for (line_idx, line) in text_lines.iter().enumerate() {
            let line_len = line.chars().count();
            if cursor_pos <= char_count + line_len {
                cursor_line = line_idx;
                cursor_col = cursor_pos - char_count;
                break;
            }
            // +1 for the newline character
            char_count += line_len + 1;
        }

        let text_style = Style::default().fg(self.theme.text);
        let cursor_style = Style::default().fg(self.theme.primary);
        let mut lines = Vec::with_capacity(text_lines.len());

        for (line_idx, line_text) in text_lines.iter().enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix, cursor_style)];

            if line_idx == cursor_line {
                let before: String = line_text.chars().take(cursor_col).collect();
                let after: String = line_text.chars().skip(cursor_col).collect();
                spans.push(Span::styled(before, text_style));
                spans.push(Span::styled("█", cursor_style));
                spans.push(Span::styled(after, text_style));
            } else {
                spans.push(Span::styled((*line_text).to_string(), text_style));
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused));

        if self.input.is_empty() {
            let line = Line::from(vec![
                Span::styled("> █ ", Style::default().fg(self.theme.primary)),
                Span::styled(self.placeholder, Style::default().fg(self.theme.muted)),
            ]);
            Paragraph::new(line).block(block).render(area, buf);
            return;
        }

        let inner_height = usize::from(area.height.saturating_sub(2));
        let (lines, cursor_line) = self.build_input_lines();

        // Keep the cursor line visible
        let scroll_offset = if lines.len() <= inner_height {
            0
        } else {
            cursor_line.saturating_sub(inner_height.saturating_sub(1))
        };

        Paragraph::new(lines)
            .block(block)
            .scroll((u16::try_from(scroll_offset).unwrap_or(u16::MAX), 0))
            .render(area, buf);
    }
}
