//! Bordered tables for grouped aggregates, post listings and videos.
//!
//! Every table alternates row styles; grouped tables can highlight the best
//! group and append a totals row.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use insights_core::formatting::{format_count, format_duration, format_number};
use insights_core::models::VideoRecord;
use insights_data::aggregator::{GroupStats, Totals};
use insights_runtime::dashboard::PostRow;

use crate::themes::Theme;

fn zebra(theme: &Theme, i: usize) -> ratatui::style::Style {
    if i % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    }
}

fn titled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

/// Render one row per group with posts, engagement and per-post means.
///
/// The row whose key equals `best` is highlighted; `totals`, when given, is
/// appended as a final row.
pub fn render_group_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    groups: &[GroupStats],
    best: Option<&str>,
    totals: Option<&Totals>,
    theme: &Theme,
) {
    let header = Row::new(
        [
            "Group",
            "Posts",
            "Engagement",
            "Avg Eng.",
            "Avg Reactions",
            "Avg Comments",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let mut rows: Vec<Row> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let style = if best == Some(g.key.as_str()) {
                theme.highlight
            } else {
                zebra(theme, i)
            };
            Row::new(vec![
                Cell::from(g.key.clone()),
                Cell::from(format_count(g.posts())),
                Cell::from(format_count(g.totals.engagement)),
                Cell::from(format_number(g.mean_engagement(), 1)),
                Cell::from(format_number(g.totals.mean_reactions(), 1)),
                Cell::from(format_number(g.totals.mean_comments(), 1)),
            ])
            .style(style)
        })
        .collect();

    if let Some(t) = totals {
        rows.push(
            Row::new(vec![
                Cell::from("TOTAL"),
                Cell::from(format_count(t.count)),
                Cell::from(format_count(t.engagement)),
                Cell::from(format_number(t.mean_engagement(), 1)),
                Cell::from(format_number(t.mean_reactions(), 1)),
                Cell::from(format_number(t.mean_comments(), 1)),
            ])
            .style(theme.table_total),
        );
    }

    let widths = [
        Constraint::Length(22),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(13),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(title, theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

/// Render a post listing. Messages are expected to be pre-truncated.
pub fn render_post_table(frame: &mut Frame, area: Rect, title: &str, posts: &[PostRow], theme: &Theme) {
    let header = Row::new(
        [
            "Published",
            "Type",
            "Message",
            "React.",
            "Comm.",
            "Shares",
            "Eng.",
            "Views",
            "Reach",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = posts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Row::new(vec![
                Cell::from(p.published.clone()),
                Cell::from(p.post_type.as_str()),
                Cell::from(p.message.clone()),
                Cell::from(format_count(p.reactions)),
                Cell::from(format_count(p.comments)),
                Cell::from(format_count(p.shares)),
                Cell::from(format_count(p.engagement)),
                Cell::from(format_count(p.views)),
                Cell::from(format_count(p.reach)),
            ])
            .style(zebra(theme, i))
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block(title, theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

/// Render the most-viewed videos. Titles are expected to be pre-truncated.
pub fn render_video_table(frame: &mut Frame, area: Rect, videos: &[VideoRecord], theme: &Theme) {
    let header = Row::new(
        ["Title", "Views", "Length", "Link"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = videos
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Row::new(vec![
                Cell::from(v.title.clone()),
                Cell::from(format_count(v.views)),
                Cell::from(format_duration(v.duration_secs)),
                Cell::from(v.permalink.clone()),
            ])
            .style(zebra(theme, i))
        })
        .collect();

    let widths = [
        Constraint::Length(52),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(titled_block("Top Videos", theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

/// Render a "no data" placeholder listing the source notices.
pub fn render_no_data(frame: &mut Frame, area: Rect, notices: &[String], theme: &Theme) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("No posts match the current filters", theme.warning)),
        Line::from(""),
    ];
    for notice in notices {
        text.push(Line::from(Span::styled(notice.clone(), theme.dim)));
    }
    text.push(Line::from(Span::styled(
        "Press 'p', 't' or 's' to change filters, 'q' to exit",
        theme.dim,
    )));
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(titled_block("Page Insights", theme)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
