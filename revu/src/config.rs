//! User configuration loaded from `~/.config/revu/config.toml`.
//!
//! Every field has a default, so a missing file, a missing key, or a file that
//! fails to parse all yield a usable configuration. Parse errors are reported
//! on stderr because logging is configured from this file and is not yet up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Review-service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL of the review service, e.g. `https://review.example.com/api`.
    pub base_url: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_owned(),
            token_env: "REVU_TOKEN".to_owned(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name: `dark` or `catppuccin-mocha`.
    pub theme: String,
    /// Seconds between comment polls.
    pub poll_interval_secs: u64,
    /// Milliseconds between spinner frames.
    pub tick_interval_ms: u64,
    /// Capture mouse wheel and clicks.
    pub mouse: bool,
    /// Log file; defaults to `.revu/revu.log` in the working directory.
    pub log_file: Option<PathBuf>,
    pub service: ServiceSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            poll_interval_secs: 30,
            tick_interval_ms: 100,
            mouse: true,
            log_file: None,
            service: ServiceSettings::default(),
        }
    }
}

impl Config {
    /// Loads the config from the default location.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Loads the config from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("revu: config parse error in {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Poll interval, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Spinner interval, never shorter than 16 ms.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(16))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| PathBuf::from(".revu").join("revu.log"))
    }
}

/// Returns the path to the revu config file.
///
/// Prefers `$XDG_CONFIG_HOME/revu/config.toml`; falls back to
/// `~/.config/revu/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("revu").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "theme = \"dark\"\npoll_interval_secs = 5\n\n[service]\nbase_url = \"https://r.example\""
        )
        .unwrap();
        let config = Config::load_from(file.path());
        assert_eq!(config.theme, "dark");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.service.base_url, "https://r.example");
        assert_eq!(config.service.token_env, "REVU_TOKEN");
        assert!(config.mouse);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "theme = [not toml").unwrap();
        assert_eq!(Config::load_from(file.path()), Config::default());
    }

    #[test]
    fn intervals_have_floors() {
        let config = Config { poll_interval_secs: 0, tick_interval_ms: 1, ..Config::default() };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }
}
