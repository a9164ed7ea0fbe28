use std::str::FromStr;

use engine::{DEFAULT_BASE_URL, DEFAULT_SEARCH_RADIUS, LayoutMode};
use tracing::warn;

/// Seconds of footage between two geocoded frame samples.
pub const DEFAULT_SECONDS_PER_FRAME: f64 = 3.333;

/// Dashboard configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Provider base URL (default: `http://localhost:8000`).
    pub api_url: String,
    /// Locate radius (default: `200`).
    pub search_radius: f64,
    pub layout: LayoutMode,
    /// Playback seconds per frame sample (default: `3.333`).
    pub seconds_per_frame: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_owned(),
            search_radius: DEFAULT_SEARCH_RADIUS,
            layout: LayoutMode::default(),
            seconds_per_frame: DEFAULT_SECONDS_PER_FRAME,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and `.env`.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `ROADVIEW_API_URL`           | `http://localhost:8000` |
    /// | `ROADVIEW_SEARCH_RADIUS`     | `200`                   |
    /// | `ROADVIEW_LAYOUT`            | `regular`               |
    /// | `ROADVIEW_SECONDS_PER_FRAME` | `3.333`                 |
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup. Invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("ROADVIEW_API_URL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_url);
        let search_radius = positive_or(
            "ROADVIEW_SEARCH_RADIUS",
            parse_or("ROADVIEW_SEARCH_RADIUS", &lookup, defaults.search_radius),
            defaults.search_radius,
        );
        let layout = parse_or("ROADVIEW_LAYOUT", &lookup, defaults.layout);
        let seconds_per_frame = positive_or(
            "ROADVIEW_SECONDS_PER_FRAME",
            parse_or("ROADVIEW_SECONDS_PER_FRAME", &lookup, defaults.seconds_per_frame),
            defaults.seconds_per_frame,
        );

        Self {
            api_url,
            search_radius,
            layout,
            seconds_per_frame,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(error) => {
            warn!(key, value = %raw, %error, "invalid config value, using default");
            default
        }
    }
}

fn positive_or(key: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        return value;
    }
    warn!(key, value, "config value must be positive, using default");
    default
}
