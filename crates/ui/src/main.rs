mod app;
mod bridge;
mod config;
mod playback;
mod widgets;

use app::AppState;
use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> iced::Result {
    init_tracing();

    let config = Config::from_env();
    info!(
        api_url = %config.api_url,
        search_radius = config.search_radius,
        layout = ?config.layout,
        "starting roadview"
    );

    iced::application("Roadview", AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .run_with(move || AppState::boot(config))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
