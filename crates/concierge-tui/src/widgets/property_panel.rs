//! Static property details (left pane).

use concierge_engine::{Figure, PropertyProfile};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Property listing: brand, pitch, headline figures and detail tables.
pub struct PropertyPanel<'a> {
    profile: &'a PropertyProfile,
    theme: &'a Theme,
}

impl<'a> PropertyPanel<'a> {
    pub fn new(profile: &'a PropertyProfile, theme: &'a Theme) -> Self {
        Self { profile, theme }
    }

    fn section(&self, title: &str) -> Line<'static> {
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.text)
                .add_modifier(Modifier::BOLD),
        ))
    }

    /// A `label ...... value` row sized to `width`.
    fn row(&self, figure: &Figure, width: usize) -> Line<'static> {
        let used = figure.label.width() + figure.value.width();
        let gap = width.saturating_sub(used).max(1);
        Line::from(vec![
            Span::styled(figure.label.clone(), Style::default().fg(self.theme.subtext)),
            Span::raw(" ".repeat(gap)),
            Span::styled(
                figure.value.clone(),
                Style::default()
                    .fg(self.theme.text)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let profile = self.profile;
        let mut lines = vec![
            Line::from(Span::styled(
                profile.brand.clone(),
                Style::default()
                    .fg(self.theme.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                profile.tagline.to_uppercase(),
                Style::default().fg(self.theme.muted),
            )),
            Line::default(),
            Line::from(Span::styled(
                profile.name.clone(),
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                profile.summary.clone(),
                Style::default().fg(self.theme.subtext),
            )),
            Line::default(),
        ];

        let headline: Vec<Span<'static>> = profile
            .headline
            .iter()
            .flat_map(|figure| {
                [
                    Span::styled(
                        figure.value.clone(),
                        Style::default()
                            .fg(self.theme.text)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" {}   ", figure.label),
                        Style::default().fg(self.theme.muted),
                    ),
                ]
            })
            .collect();
        lines.push(Line::from(headline));
        lines.push(Line::default());

        lines.push(self.section("Investment Details"));
        lines.extend(profile.details.iter().map(|f| self.row(f, width)));
        lines.push(Line::default());

        lines.push(self.section("Tokenization Overview"));
        lines.extend(profile.tokenization.iter().map(|f| self.row(f, width)));

        lines
    }
}

impl Widget for PropertyPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.surface));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.lines(usize::from(inner.width)))
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_property_panel_renders_profile() {
        let profile = PropertyProfile::default();
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(70, 40)).unwrap();

        terminal
            .draw(|frame| {
                frame.render_widget(PropertyPanel::new(&profile, &theme), frame.area());
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("Midtown Executive Tower"));
        assert!(content.contains("Token Price"));
        assert!(content.contains("$10.00"));
    }

    #[test]
    fn test_row_pads_between_label_and_value() {
        let profile = PropertyProfile::default();
        let theme = Theme::default();
        let panel = PropertyPanel::new(&profile, &theme);

        let row = panel.row(&Figure { value: "2018".into(), label: "Year Built".into() }, 20);
        let text: String = row.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Year Built      2018");
    }
}
