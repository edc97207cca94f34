use crate::themes::Theme;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Height of a rendered card including its border.
pub const CARD_HEIGHT: u16 = 5;

/// A single headline metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    /// Secondary line under the value, e.g. a review count.
    pub detail: Option<String>,
}

impl KpiCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn to_lines<'a>(&'a self, theme: &'a Theme) -> Vec<Line<'a>> {
        let mut lines = vec![Line::from(Span::styled(self.value.as_str(), theme.value))];
        if let Some(detail) = &self.detail {
            lines.push(Line::from(Span::styled(detail.as_str(), theme.dim)));
        }
        lines
    }
}

/// Render `cards` side by side in equal-width bordered boxes.
pub fn render_kpi_row(frame: &mut Frame, area: Rect, cards: &[KpiCard], theme: &Theme) {
    if cards.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let columns = Layout::horizontal(constraints).split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(Span::styled(format!(" {} ", card.title), theme.label));
        frame.render_widget(
            Paragraph::new(Text::from(card.to_lines(theme))).block(block),
            *column,
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_card_lines() {
        let theme = Theme::dark();
        let card = KpiCard::new("Rating", "4.8/5").with_detail("12 reviews");
        let lines = card.to_lines(&theme);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "4.8/5");
        assert_eq!(lines[1].spans[0].content, "12 reviews");
    }

    #[test]
    fn test_card_without_detail() {
        let theme = Theme::dark();
        let card = KpiCard::new("Posts", "42");
        assert_eq!(card.to_lines(&theme).len(), 1);
    }

    #[test]
    fn test_render_kpi_row_shows_titles_and_values() {
        let backend = TestBackend::new(60, CARD_HEIGHT);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let cards = vec![KpiCard::new("Posts", "42"), KpiCard::new("Reach", "9,001")];

        terminal
            .draw(|frame| render_kpi_row(frame, frame.area(), &cards, &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Posts"));
        assert!(content.contains("9,001"));
    }

    #[test]
    fn test_render_kpi_row_empty_is_noop() {
        let backend = TestBackend::new(20, CARD_HEIGHT);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_kpi_row(frame, frame.area(), &[], &theme))
            .unwrap();
    }
}
