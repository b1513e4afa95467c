//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$CHATCELL_CONFIG` (environment variable)
//! 2. `~/.config/chatcell/config.toml` (Linux/macOS)
//!    `%APPDATA%\chatcell\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::bubble::DEFAULT_MAX_BUBBLE_WIDTH;

/// Accepted range for the countdown refresh cadence, in milliseconds.
pub const TICK_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=1000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Countdown settings.
    pub timer: TimerConfig,
    /// Row layout settings.
    pub layout: LayoutConfig,
    /// Display settings.
    pub display: DisplayConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// `strftime` format string for message timestamps.
    pub date_format: String,
}

/// Countdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Refresh cadence of a running countdown, in milliseconds.
    pub tick_interval_ms: u64,
}

/// Row layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Upper bound on the width of an attachment bubble, in cells.
    pub max_bubble_width: u16,
    /// Reserve a timer column next to disappearing messages.
    pub timer_column: bool,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Color theme: "dark" or "light".
    pub theme: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
            date_format: "%H:%M".to_string(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_bubble_width: DEFAULT_MAX_BUBBLE_WIDTH,
            timer_column: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
        }
    }
}

impl TimerConfig {
    /// Tick interval, clamped to [`TICK_INTERVAL_RANGE_MS`].
    pub fn tick_interval(&self) -> Duration {
        let ms = self
            .tick_interval_ms
            .clamp(*TICK_INTERVAL_RANGE_MS.start(), *TICK_INTERVAL_RANGE_MS.end());
        if ms != self.tick_interval_ms {
            tracing::warn!(
                requested = self.tick_interval_ms,
                used = ms,
                "Tick interval out of range, clamping"
            );
        }
        Duration::from_millis(ms)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("CHATCELL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("chatcell").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatcell")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("chatcell.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.timer.tick_interval_ms, 500);
        assert_eq!(cfg.layout.max_bubble_width, DEFAULT_MAX_BUBBLE_WIDTH);
        assert!(cfg.layout.timer_column);
        assert_eq!(cfg.display.theme, "dark");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[timer]
tick_interval_ms = 250

[display]
theme = "light"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.timer.tick_interval_ms, 250);
        assert_eq!(cfg.display.theme, "light");
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.layout.max_bubble_width, DEFAULT_MAX_BUBBLE_WIDTH);
    }

    #[test]
    fn test_tick_interval_is_clamped() {
        let fast = TimerConfig { tick_interval_ms: 1 };
        assert_eq!(fast.tick_interval(), Duration::from_millis(50));

        let slow = TimerConfig {
            tick_interval_ms: 60_000,
        };
        assert_eq!(slow.tick_interval(), Duration::from_secs(1));

        let ok = TimerConfig {
            tick_interval_ms: 200,
        };
        assert_eq!(ok.tick_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_save_and_load_through_env_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        std::env::set_var("CHATCELL_CONFIG", &path);

        let mut cfg = Config::default();
        cfg.timer.tick_interval_ms = 250;
        cfg.layout.timer_column = false;
        cfg.display.theme = "light".to_string();

        let saved = save_config(&cfg);
        let found = config_file_path();
        let loaded = load_config();
        std::env::remove_var("CHATCELL_CONFIG");

        saved.unwrap();
        assert_eq!(found, Some(path.clone()));
        assert!(path.exists());
        assert_eq!(loaded.timer.tick_interval_ms, 250);
        assert!(!loaded.layout.timer_column);
        assert_eq!(loaded.display.theme, "light");
        assert_eq!(loaded.general.log_level, "warn");
    }

    #[test]
    fn test_log_file_in_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/chatcell-test"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/chatcell-test/chatcell.log")
        );
    }
}
