use crate::themes::Theme;
use insights_core::formatting::format_count;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Configuration controlling visual appearance of a bar row.
pub struct BarConfig {
    /// Width in terminal columns of the bar portion.
    pub width: u16,
    /// Display width the label is padded to.
    pub label_width: usize,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            label_width: 22,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Horizontal bar for one group, scaled against the largest value in its
/// chart and followed by the formatted value.
pub struct GroupBar<'a> {
    pub label: &'a str,
    pub value: u64,
    /// Largest value in the chart; a zero max draws an empty bar.
    pub max: u64,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> GroupBar<'a> {
    pub fn new(label: &'a str, value: u64, max: u64, theme: &'a Theme) -> Self {
        Self {
            label,
            value,
            max,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            ((self.value as f64 / self.max as f64) * 100.0).min(100.0)
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let pct = self.percentage();
        let filled = ((pct / 100.0) * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let pad = self
            .config
            .label_width
            .saturating_sub(UnicodeWidthStr::width(self.label));
        let label = format!("{}{} ", self.label, " ".repeat(pad));

        let filled_str: String = std::iter::repeat(self.config.filled_char)
            .take(filled as usize)
            .collect();
        let empty_str: String = std::iter::repeat(self.config.empty_char)
            .take(empty as usize)
            .collect();

        Line::from(vec![
            Span::styled(label, self.theme.label),
            Span::styled(filled_str, self.theme.bar_style(pct)),
            Span::styled(empty_str, self.theme.bar_empty),
            Span::styled(format!(" {}", format_count(self.value)), self.theme.value),
        ])
    }
}

/// One bar line per `(label, value)` pair, all scaled to the largest value.
pub fn bar_lines<'a>(items: &'a [(String, u64)], theme: &'a Theme) -> Vec<Line<'a>> {
    let max = items.iter().map(|(_, v)| *v).max().unwrap_or(0);
    items
        .iter()
        .map(|(label, value)| GroupBar::new(label, *value, max, theme).to_line())
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
