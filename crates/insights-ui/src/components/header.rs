use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Dashboard header rendering four lines:
///
/// 1. Application title between accents (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. `[ page | timezone | updated ]` info.
/// 4. An empty line.
pub struct Header<'a> {
    /// Page name, or a placeholder when no page metadata is available.
    pub page: &'a str,
    /// Display timezone name.
    pub timezone: &'a str,
    /// When the API data was fetched, already formatted.
    pub updated: Option<&'a str>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(page: &'a str, timezone: &'a str, updated: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            page,
            timezone,
            updated,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.page.to_string(), self.theme.value),
            Span::styled(" | ", self.theme.label),
            Span::styled(self.timezone.to_string(), self.theme.value),
        ];
        if let Some(updated) = self.updated {
            info.push(Span::styled(" | Updated ", self.theme.label));
            info.push(Span::styled(updated.to_string(), self.theme.value));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" PAGE INSIGHTS DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new("Example", "UTC", None, &theme).to_lines();
        assert_eq!(lines.len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new("Example", "UTC", None, &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("PAGE INSIGHTS DASHBOARD"), "got: {title}");
        assert!(title.starts_with(ACCENT) && title.ends_with(ACCENT));
    }

    #[test]
    fn test_header_info_line_without_update() {
        let theme = Theme::dark();
        let lines = Header::new("Example Page", "Asia/Manila", None, &theme).to_lines();
        assert_eq!(text(&lines[2]), "[ Example Page | Asia/Manila ]");
        assert_eq!(lines[2].spans.len(), 5);
    }

    #[test]
    fn test_header_info_line_with_update() {
        let theme = Theme::dark();
        let lines =
            Header::new("Example Page", "UTC", Some("2024-03-01 10:00"), &theme).to_lines();
        assert_eq!(
            text(&lines[2]),
            "[ Example Page | UTC | Updated 2024-03-01 10:00 ]"
        );
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new("p", "UTC", None, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
        assert!(text(&lines[3]).is_empty());
    }
}
