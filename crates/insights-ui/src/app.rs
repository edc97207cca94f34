//! Main application state and TUI event loop for Page Insights.
//!
//! [`App`] owns the theme, the active tab, the filter state and the most
//! recently loaded [`Dataset`]. Every interaction that changes what is shown
//! recomputes one [`DashboardView`]; source loading goes through the
//! caller's [`DataManager`], so repeated interactions inside the TTL window
//! are served from cache.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::{debug, info};

use insights_core::filters::{period_key, Filters};
use insights_core::settings::LastUsedParams;
use insights_core::temporal::{resolve_timezone, today_in};
use insights_data::pipeline::Dataset;
use insights_runtime::dashboard::{DashboardOptions, DashboardView};
use insights_runtime::data_manager::DataManager;

use crate::dashboard_view;
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which dashboard tab the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// KPIs, reactions and per-type breakdown.
    Overview,
    /// Top posts and the full filtered listing.
    Posts,
    /// Day-of-week, time-slot and monthly breakdowns.
    Timing,
    /// Page-level metrics and top videos.
    Videos,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Posts, Tab::Timing, Tab::Videos];

    /// Parse a `--view` value; unknown names fall back to the overview.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "posts" => Tab::Posts,
            "timing" => Tab::Timing,
            "videos" => Tab::Videos,
            _ => Tab::Overview,
        }
    }

    /// The `--view` spelling of this tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Posts => "posts",
            Tab::Timing => "timing",
            Tab::Videos => "videos",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Posts => "Posts",
            Tab::Timing => "Timing",
            Tab::Videos => "Videos",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// What the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond a redraw.
    None,
    /// Filters changed; reload through the cache and recompute.
    Recompute,
    /// Drop cached sources and reload everything.
    Refresh,
    Quit,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Page Insights TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    pub tab: Tab,
    pub filters: Filters,
    /// IANA timezone name used to resolve "today".
    pub timezone: String,
    pub top_posts: usize,
    pub top_videos: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent dataset, `None` until the first load finishes.
    pub dataset: Option<Dataset>,
    /// View computed from `dataset` and `filters`.
    pub view: Option<DashboardView>,
}

impl App {
    pub fn new(
        theme_name: &str,
        tab: Tab,
        filters: Filters,
        timezone: String,
        top_posts: usize,
        top_videos: usize,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tab,
            filters,
            timezone,
            top_posts,
            top_videos,
            should_quit: false,
            dataset: None,
            view: None,
        }
    }

    /// Calendar date "today" in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        today_in(resolve_timezone(&self.timezone))
    }

    /// Replace the dataset and recompute the view against today's date.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let today = self.today();
        self.set_dataset_at(dataset, today);
    }

    pub fn set_dataset_at(&mut self, dataset: Dataset, today: NaiveDate) {
        self.dataset = Some(dataset);
        self.recompute_at(today);
    }

    /// Recompute the view from the current dataset and filters.
    pub fn recompute_at(&mut self, today: NaiveDate) {
        let options = DashboardOptions {
            today,
            top_posts: self.top_posts,
            top_videos: self.top_videos,
        };
        self.view = self
            .dataset
            .as_ref()
            .map(|dataset| DashboardView::compute(dataset, &self.filters, options));
    }

    /// Apply one key press to the app state.
    ///
    /// Tab switches only change what is drawn; filter keys ask for a
    /// recompute and `r` for a forced refresh.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Tab | KeyCode::Right => {
                self.tab = self.tab.next();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.tab = self.tab.prev();
                Action::None
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
                Action::None
            }
            KeyCode::Char('p') => {
                self.filters.cycle_period();
                Action::Recompute
            }
            KeyCode::Char('t') => {
                self.filters.cycle_post_type();
                Action::Recompute
            }
            KeyCode::Char('s') => {
                self.filters.cycle_time_slot();
                Action::Recompute
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Refresh,
            _ => Action::None,
        }
    }

    /// Copy the interactive state into `params` so the next launch resumes
    /// where this one ended. Custom ranges are not persisted.
    pub fn record_last_used(&self, params: &mut LastUsedParams) {
        if let Some(key) = period_key(&self.filters.period) {
            params.period = Some(key);
        }
        params.post_type = Some(
            self.filters
                .post_type
                .map(|t| t.as_str().to_lowercase())
                .unwrap_or_else(|| "all".to_string()),
        );
        params.time_slot = Some(
            self.filters
                .time_slot
                .map(|s| s.name().to_lowercase())
                .unwrap_or_else(|| "all".to_string()),
        );
        params.view = Some(self.tab.name().to_string());
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Load the dataset, then run the dashboard until `q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the terminal
    /// stays responsive; source loads are awaited inline after the key that
    /// triggered them.
    pub async fn run(&mut self, manager: &mut DataManager) -> io::Result<()> {
        let dataset = manager.get_dataset(false).await;
        self.set_dataset(dataset);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => break Err(e),
            }

            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => break Err(e),
            };

            match self.handle_key(key) {
                Action::None => {}
                Action::Recompute => {
                    debug!(filters = ?self.filters, "filters changed");
                    let dataset = manager.get_dataset(false).await;
                    self.set_dataset(dataset);
                }
                Action::Refresh => {
                    info!("refreshing all sources");
                    let dataset = manager.get_dataset(true).await;
                    self.set_dataset(dataset);
                }
                Action::Quit => {}
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match &self.view {
            Some(view) => {
                dashboard_view::render_dashboard(
                    frame,
                    area,
                    view,
                    self.tab,
                    &self.timezone,
                    &self.theme,
                );
            }
            None => table_view::render_no_data(frame, area, &[], &self.theme),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
