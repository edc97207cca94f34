//! Tabbed dashboard screen.
//!
//! Everything drawn here comes from one [`DashboardView`]; the layout is
//! header, filter bar, tab strip, source notices, then the active tab body.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use insights_core::formatting::{format_count, format_number};
use insights_core::models::ReactionKind;
use insights_data::aggregator::{GroupStats, ReactionSummary};
use insights_data::pipeline::PrimarySource;
use insights_runtime::dashboard::DashboardView;

use crate::app::Tab;
use crate::components::bar_chart::{bar_lines, GroupBar};
use crate::components::header::Header;
use crate::components::kpi::{render_kpi_row, KpiCard, CARD_HEIGHT};
use crate::table_view;
use crate::themes::Theme;

/// Notices beyond this count are summarised in one line.
const MAX_NOTICE_LINES: usize = 3;

/// Render the full dashboard for `tab`.
pub fn render_dashboard(
    frame: &mut Frame,
    area: Rect,
    view: &DashboardView,
    tab: Tab,
    timezone: &str,
    theme: &Theme,
) {
    let notices = notice_lines(&view.notices, theme);
    let [header_area, filter_area, tabs_area, notice_area, body] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(notices.len() as u16),
        Constraint::Min(0),
    ])
    .areas(area);

    let page_name = view
        .overview
        .page
        .as_ref()
        .map(|p| p.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("Facebook Page");
    let updated = view
        .posts_fetched_at
        .or_else(|| view.overview.page.as_ref().and_then(|p| p.fetched_at))
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string());
    let header = Header::new(page_name, timezone, updated.as_deref(), theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

    frame.render_widget(Paragraph::new(filter_line(view, theme)), filter_area);
    frame.render_widget(Paragraph::new(tab_line(tab, theme)), tabs_area);
    frame.render_widget(Paragraph::new(Text::from(notices)), notice_area);

    if !view.has_posts() && tab != Tab::Videos {
        table_view::render_no_data(frame, body, &view.notices, theme);
        return;
    }

    match tab {
        Tab::Overview => render_overview(frame, body, view, theme),
        Tab::Posts => render_posts(frame, body, view, theme),
        Tab::Timing => render_timing(frame, body, view, theme),
        Tab::Videos => render_videos(frame, body, view, theme),
    }
}

// ── Chrome ────────────────────────────────────────────────────────────────────

/// `Period: … | Type: … | Slot: … | range | n of m posts`.
pub fn filter_line<'a>(view: &DashboardView, theme: &'a Theme) -> Line<'a> {
    let post_type = view
        .filters
        .post_type
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "All".to_string());
    let slot = view
        .filters
        .time_slot
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "All".to_string());
    let source = match view.primary {
        PrimarySource::BulkExport => "export",
        PrimarySource::Api => "API sample",
        PrimarySource::None => "no source",
    };

    Line::from(vec![
        Span::styled("[p] Period: ", theme.label),
        Span::styled(view.filters.period.label(), theme.value),
        Span::styled("  [t] Type: ", theme.label),
        Span::styled(post_type, theme.value),
        Span::styled("  [s] Slot: ", theme.label),
        Span::styled(slot, theme.value),
        Span::styled(format!("  {}  ", view.range_label), theme.dim),
        Span::styled(
            format!(
                "{} of {} posts ({})",
                format_count(view.filtered_posts as u64),
                format_count(view.total_posts as u64),
                source
            ),
            theme.info,
        ),
    ])
}

fn tab_line(active: Tab, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(Tab::ALL.len() * 2);
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let style = if *tab == active {
            theme.tab_active
        } else {
            theme.tab_inactive
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("  [r] refresh  [q] quit", theme.dim));
    Line::from(spans)
}

fn notice_lines<'a>(notices: &[String], theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = notices
        .iter()
        .take(MAX_NOTICE_LINES)
        .map(|n| Line::from(Span::styled(format!("! {}", n), theme.warning)))
        .collect();
    if notices.len() > MAX_NOTICE_LINES {
        lines.push(Line::from(Span::styled(
            format!("  … and {} more", notices.len() - MAX_NOTICE_LINES),
            theme.dim,
        )));
    }
    lines
}

// ── Overview ──────────────────────────────────────────────────────────────────

/// Headline cards for the filtered posts.
pub fn post_kpis(view: &DashboardView) -> Vec<KpiCard> {
    let t = &view.totals;
    vec![
        KpiCard::new("Posts", format_count(t.count)),
        KpiCard::new("Engagement", format_count(t.engagement))
            .with_detail(format!("{} avg", format_number(t.mean_engagement(), 1))),
        KpiCard::new("Reactions", format_count(t.reactions)),
        KpiCard::new("Comments", format_count(t.comments)),
        KpiCard::new("Shares", format_count(t.shares)),
        KpiCard::new("Views", format_count(t.views)),
        KpiCard::new("Reach", format_count(t.reach)),
    ]
}

/// Page-level cards; independent of the filters.
pub fn page_kpis(view: &DashboardView) -> Vec<KpiCard> {
    let overview = &view.overview;
    let mut cards = match &overview.page {
        Some(page) => vec![
            KpiCard::new("Followers", format_count(page.fan_count))
                .with_detail(format!("{} following", format_count(page.followers_count))),
            KpiCard::new("Rating", format!("{:.1}/5", page.overall_star_rating))
                .with_detail(format!("{} reviews", format_count(page.rating_count))),
            KpiCard::new("Talking About", format_count(page.talking_about_count))
                .with_detail("this week"),
        ],
        None => vec![KpiCard::new("Page", "unavailable").with_detail("no API data")],
    };

    let window = &overview.api_window;
    cards.push(
        KpiCard::new("Video Views", format_count(overview.videos.total_views))
            .with_detail(format!("{} videos", overview.videos.count)),
    );
    cards.push(
        KpiCard::new("Recent Reactions", format_count(window.reactions))
            .with_detail(format!("last {} posts", window.count)),
    );
    cards.push(KpiCard::new("Recent Comments", format_count(window.comments)));
    cards.push(KpiCard::new("Recent Shares", format_count(window.shares)));
    cards
}

fn render_overview(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let [posts_row, page_row, rest] = Layout::vertical([
        Constraint::Length(CARD_HEIGHT),
        Constraint::Length(CARD_HEIGHT),
        Constraint::Min(0),
    ])
    .areas(area);
    render_kpi_row(frame, posts_row, &post_kpis(view), theme);
    render_kpi_row(frame, page_row, &page_kpis(view), theme);

    let [types_area, reactions_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(rest);
    table_view::render_group_table(
        frame,
        types_area,
        "By Post Type",
        &view.by_post_type,
        None,
        Some(&view.totals),
        theme,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Reaction Breakdown ");
    let lines = match &view.reactions {
        Some(summary) => reaction_lines(summary, theme),
        None => vec![Line::from(Span::styled(
            "No reaction breakdown for these posts",
            theme.dim,
        ))],
    };
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), reactions_area);
}

/// One bar per reaction kind plus a caption naming the contributing subset.
pub fn reaction_lines<'a>(summary: &ReactionSummary, theme: &'a Theme) -> Vec<Line<'a>> {
    let max = ReactionKind::ALL
        .iter()
        .map(|k| summary.totals.get(*k))
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = ReactionKind::ALL
        .iter()
        .map(|kind| {
            let mut bar = GroupBar::new(kind.label(), summary.totals.get(*kind), max, theme);
            bar.config.width = 24;
            bar.config.label_width = 6;
            let mut line = bar.to_line();
            if let Some(label) = line.spans.first_mut() {
                label.style = theme.reaction_style(*kind);
            }
            line
        })
        .collect();

    let span = match summary.date_range {
        Some((start, end)) => format!(" from {} to {}", start, end),
        None => String::new(),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Based on {} posts{}", summary.posts, span),
        theme.dim,
    )));
    lines
}

// ── Posts ─────────────────────────────────────────────────────────────────────

fn render_posts(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let top_height = (view.top_posts.len() as u16).saturating_add(3);
    let [top_area, all_area] =
        Layout::vertical([Constraint::Length(top_height), Constraint::Min(0)]).areas(area);
    table_view::render_post_table(
        frame,
        top_area,
        &format!("Top {} Posts by Engagement", view.top_posts.len()),
        &view.top_posts,
        theme,
    );
    table_view::render_post_table(
        frame,
        all_area,
        &format!("All Posts ({})", view.all_posts.len()),
        &view.all_posts,
        theme,
    );
}

// ── Timing ────────────────────────────────────────────────────────────────────

/// `Best day: … | Best slot: …` summary.
pub fn best_line<'a>(view: &DashboardView, theme: &'a Theme) -> Line<'a> {
    fn describe(group: &Option<GroupStats>) -> String {
        match group {
            Some(g) => format!("{} ({} avg)", g.key, format_number(g.mean_engagement(), 1)),
            None => "-".to_string(),
        }
    }
    Line::from(vec![
        Span::styled("Best day: ", theme.label),
        Span::styled(describe(&view.best_day), theme.highlight),
        Span::styled("   Best time slot: ", theme.label),
        Span::styled(describe(&view.best_slot), theme.highlight),
    ])
}

fn render_timing(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let [best_area, tables_area, months_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(9 + 6),
        Constraint::Min(0),
    ])
    .areas(area);
    frame.render_widget(Paragraph::new(best_line(view, theme)), best_area);

    let [days_area, slots_area] =
        Layout::vertical([Constraint::Length(9), Constraint::Length(6)]).areas(tables_area);
    table_view::render_group_table(
        frame,
        days_area,
        "By Day of Week",
        &view.by_day_of_week,
        view.best_day.as_ref().map(|g| g.key.as_str()),
        None,
        theme,
    );
    table_view::render_group_table(
        frame,
        slots_area,
        "By Time Slot",
        &view.by_time_slot,
        view.best_slot.as_ref().map(|g| g.key.as_str()),
        None,
        theme,
    );

    let months: Vec<(String, u64)> = view
        .by_month
        .iter()
        .map(|g| (g.key.clone(), g.totals.engagement))
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Engagement by Month ");
    frame.render_widget(
        Paragraph::new(Text::from(bar_lines(&months, theme))).block(block),
        months_area,
    );
}

// ── Videos ────────────────────────────────────────────────────────────────────

fn render_videos(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let videos = &view.overview.videos;
    if videos.count == 0 {
        let block = Block::default().borders(Borders::ALL).title(" Videos ");
        frame.render_widget(
            Paragraph::new(Span::styled("No video data available", theme.dim)).block(block),
            area,
        );
        return;
    }

    let [cards_area, table_area] =
        Layout::vertical([Constraint::Length(CARD_HEIGHT), Constraint::Min(0)]).areas(area);
    let mean = videos.total_views as f64 / videos.count as f64;
    let cards = vec![
        KpiCard::new("Videos", format_count(videos.count as u64)),
        KpiCard::new("Total Views", format_count(videos.total_views)),
        KpiCard::new("Avg Views", format_number(mean, 0)),
    ];
    render_kpi_row(frame, cards_area, &cards, theme);
    table_view::render_video_table(frame, table_area, &videos.top, theme);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
