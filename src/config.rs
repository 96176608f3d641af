//! Application-level configuration loading, including the blind escalation settings.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "POKER_LEAGUE_CONFIG_PATH";
/// Total pacing window shared out between the players of a game.
const DEFAULT_BLIND_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Longest pacing window accepted from configuration.
pub const MAX_BLIND_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
/// Built-in blind progression.
const DEFAULT_BLIND_AMOUNTS: [u32; 11] = [
    100, 200, 300, 400, 500, 600, 800, 1000, 2000, 4000, 8000,
];

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    blinds: BlindConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration stored at `path`, falling back to defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        window_secs = app_config.blinds.window.as_secs(),
                        levels = app_config.blinds.amounts.len(),
                        "loaded blind settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Blind escalation settings.
    pub fn blinds(&self) -> &BlindConfig {
        &self.blinds
    }

    /// Replace the blind settings.
    pub fn with_blinds(mut self, blinds: BlindConfig) -> Self {
        self.blinds = blinds;
        self
    }
}

/// Pacing window and amount progression used to build blind schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindConfig {
    window: Duration,
    amounts: Vec<u32>,
}

impl BlindConfig {
    /// Build blind settings, rejecting a window that is zero or longer than
    /// [`MAX_BLIND_WINDOW`], and a progression that is empty, contains zero, or does not
    /// strictly increase.
    pub fn new(window: Duration, amounts: Vec<u32>) -> Option<Self> {
        let window_ok = !window.is_zero() && window <= MAX_BLIND_WINDOW;
        let increasing = amounts.windows(2).all(|pair| pair[0] < pair[1]);
        let positive = amounts.first().is_some_and(|first| *first > 0);
        (window_ok && increasing && positive).then_some(Self { window, amounts })
    }

    /// Time over which the whole table shares one blind step.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Amounts announced one after the other.
    pub fn amounts(&self) -> &[u32] {
        &self.amounts
    }
}

impl Default for BlindConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_BLIND_WINDOW,
            amounts: DEFAULT_BLIND_AMOUNTS.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    blind_window_secs: Option<u64>,
    blind_amounts: Option<Vec<u32>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = BlindConfig::default();
        let window = value
            .blind_window_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.window);
        let amounts = value.blind_amounts.unwrap_or_else(|| defaults.amounts.clone());

        let blinds = BlindConfig::new(window, amounts).unwrap_or_else(|| {
            warn!(
                max_window_secs = MAX_BLIND_WINDOW.as_secs(),
                "invalid blind window or amounts; using defaults"
            );
            defaults
        });
        Self { blinds }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
