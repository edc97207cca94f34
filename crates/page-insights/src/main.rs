mod bootstrap;

use anyhow::Result;
use insights_core::credentials::Credentials;
use insights_core::settings::{LastUsedParams, Settings};
use insights_runtime::data_manager::{DataConfig, DataManager};
use insights_ui::app::{App, Tab};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    info!("Page Insights v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "View: {}, Theme: {}, Timezone: {}",
        settings.view, settings.theme, settings.timezone
    );

    let filters = settings.initial_filters()?;

    let credentials = Credentials::resolve(&settings.config);
    let mut manager = DataManager::new(DataConfig::from_settings(&settings, credentials));
    if !manager.has_api_client() {
        info!("no API client; using bulk export and snapshots only");
    }

    let mut app = App::new(
        &settings.theme,
        Tab::from_name(&settings.view),
        filters,
        settings.timezone.clone(),
        settings.top_posts as usize,
        settings.top_videos as usize,
    );

    // The TUI exits on 'q' / Ctrl+C itself; the OS-level signal covers
    // interrupts delivered before raw mode is enabled.
    tokio::select! {
        result = app.run(&mut manager) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received; shutting down");
        }
    }

    for error in manager.last_errors() {
        warn!("{} unavailable at exit: {}", error.source, error.message);
    }

    if !settings.clear {
        let path = LastUsedParams::config_path();
        let mut params = LastUsedParams::load_from(&path);
        app.record_last_used(&mut params);
        if let Err(e) = params.save_to(&path) {
            warn!("could not save last-used parameters: {}", e);
        }
    }

    Ok(())
}
