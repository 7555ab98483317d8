use crate::data::fetch::DEFAULT_ENDPOINT;
use crate::error::Result;
use crate::ui::Preset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REFRESH_MINUTES: u64 = 15;
pub const DEFAULT_CYCLE_SECONDS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub symbols: Vec<String>,
    /// Minutes between automatic refreshes.
    pub refresh_interval: u64,
    /// Seconds between ticker rotations.
    pub cycle_interval: u64,
    pub preset: Preset,
    pub endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            refresh_interval: DEFAULT_REFRESH_MINUTES,
            cycle_interval: DEFAULT_CYCLE_SECONDS,
            preset: Preset::Today,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl AppConfig {
    pub fn sanitized(mut self) -> Self {
        self.symbols = self
            .symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        self.refresh_interval = self.refresh_interval.clamp(1, 60);
        self.cycle_interval = self.cycle_interval.clamp(1, 60);

        if self.endpoint.trim().is_empty() {
            self.endpoint = DEFAULT_ENDPOINT.to_string();
        }
        self
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval * 60)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs(self.cycle_interval)
    }
}

pub fn default_symbols() -> Vec<String> {
    vec!["^GSPC".to_string(), "AAPL".to_string(), "EURUSD=X".to_string()]
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".quotechart.json")
}

pub fn load_config(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return AppConfig::default(),
    };

    serde_json::from_str::<AppConfig>(&contents)
        .map(|cfg| cfg.sanitized())
        .unwrap_or_default()
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    let payload = serde_json::to_string_pretty(config)?;
    std::fs::write(path, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_trims_and_clamps() {
        let cfg = AppConfig {
            symbols: vec![" AAPL ".to_string(), "".to_string(), "  ".to_string(), "EURUSD=X".to_string()],
            refresh_interval: 0,
            cycle_interval: 600,
            preset: Preset::Year,
            endpoint: " ".to_string(),
        }
        .sanitized();

        assert_eq!(cfg.symbols, vec!["AAPL", "EURUSD=X"]);
        assert_eq!(cfg.refresh_interval, 1);
        assert_eq!(cfg.cycle_interval, 60);
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.refresh_period(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "symbols": ["IBM"] }"#).unwrap();

        assert_eq!(cfg.symbols, vec!["IBM"]);
        assert_eq!(cfg.refresh_interval, DEFAULT_REFRESH_MINUTES);
        assert_eq!(cfg.preset, Preset::Today);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("quotechart-test-{}.json", std::process::id()));
        let cfg = AppConfig {
            preset: Preset::FiveYears,
            ..AppConfig::default()
        };

        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let missing = std::env::temp_dir().join("quotechart-does-not-exist.json");
        assert_eq!(load_config(&missing), AppConfig::default());

        let broken = std::env::temp_dir().join(format!("quotechart-broken-{}.json", std::process::id()));
        std::fs::write(&broken, "{ nope").unwrap();
        let loaded = load_config(&broken);
        let _ = std::fs::remove_file(&broken);
        assert_eq!(loaded, AppConfig::default());
    }
}
