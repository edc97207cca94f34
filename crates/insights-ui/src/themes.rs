use insights_core::models::ReactionKind;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Bars ─────────────────────────────────────────────────────────────────
    /// Bar fill below 50 % of the largest group.
    pub bar_low: Style,
    pub bar_medium: Style,
    /// Bar fill at or above 80 % of the largest group.
    pub bar_high: Style,
    pub bar_empty: Style,

    // ── Tabs ─────────────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
    /// Row of the best-performing group.
    pub highlight: Style,

    // ── Reactions ────────────────────────────────────────────────────────────
    pub reaction_like: Style,
    pub reaction_love: Style,
    pub reaction_haha: Style,
    pub reaction_wow: Style,
    pub reaction_sad: Style,
    pub reaction_angry: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            bar_low: Style::default().fg(Color::Blue),
            bar_medium: Style::default().fg(Color::Cyan),
            bar_high: Style::default().fg(Color::Green),
            bar_empty: Style::default().fg(Color::DarkGray),

            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            highlight: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),

            reaction_like: Style::default().fg(Color::Blue),
            reaction_love: Style::default().fg(Color::Red),
            reaction_haha: Style::default().fg(Color::Yellow),
            reaction_wow: Style::default().fg(Color::LightYellow),
            reaction_sad: Style::default().fg(Color::LightBlue),
            reaction_angry: Style::default().fg(Color::LightRed),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            bar_low: Style::default().fg(Color::Gray),
            bar_medium: Style::default().fg(Color::Blue),
            bar_high: Style::default().fg(Color::Green),
            bar_empty: Style::default().fg(Color::Gray),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            highlight: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),

            reaction_like: Style::default().fg(Color::Blue),
            reaction_love: Style::default().fg(Color::Red),
            reaction_haha: Style::default().fg(Color::Magenta),
            reaction_wow: Style::default().fg(Color::Yellow),
            reaction_sad: Style::default().fg(Color::Cyan),
            reaction_angry: Style::default().fg(Color::LightRed),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names (including `"auto"`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Bar fill style for a value expressed as a percentage of the largest
    /// value in its chart.
    ///
    /// * `< 50 %`  → `bar_low`
    /// * `50–80 %` → `bar_medium`
    /// * `≥ 80 %`  → `bar_high`
    pub fn bar_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.bar_high
        } else if percentage >= 50.0 {
            self.bar_medium
        } else {
            self.bar_low
        }
    }

    pub fn reaction_style(&self, kind: ReactionKind) -> Style {
        match kind {
            ReactionKind::Like => self.reaction_like,
            ReactionKind::Love => self.reaction_love,
            ReactionKind::Haha => self.reaction_haha,
            ReactionKind::Wow => self.reaction_wow,
            ReactionKind::Sad => self.reaction_sad,
            ReactionKind::Angry => self.reaction_angry,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert_eq!(t.tab_active.bg, Some(Color::Cyan));
        assert!(t.highlight.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
        assert_eq!(t.tab_active.bg, Some(Color::Blue));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("auto");
        assert!(t.header.fg.is_some());
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    // ── bar_style thresholds ─────────────────────────────────────────────────

    #[test]
    fn test_bar_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.bar_style(0.0).fg, Some(Color::Blue));
        assert_eq!(t.bar_style(49.9).fg, Some(Color::Blue));
        assert_eq!(t.bar_style(50.0).fg, Some(Color::Cyan));
        assert_eq!(t.bar_style(79.9).fg, Some(Color::Cyan));
        assert_eq!(t.bar_style(80.0).fg, Some(Color::Green));
        assert_eq!(t.bar_style(100.0).fg, Some(Color::Green));
    }

    // ── reaction_style ───────────────────────────────────────────────────────

    #[test]
    fn test_reaction_styles_distinct_for_like_and_love() {
        let t = Theme::dark();
        assert_eq!(t.reaction_style(ReactionKind::Like).fg, Some(Color::Blue));
        assert_eq!(t.reaction_style(ReactionKind::Love).fg, Some(Color::Red));
        assert_ne!(
            t.reaction_style(ReactionKind::Like),
            t.reaction_style(ReactionKind::Love)
        );
    }
}
