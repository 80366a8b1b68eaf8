use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Application configuration read from `{config_dir}/caption-canvas/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    /// Unsplash access key sent as `Client-ID`.
    pub access_key: Option<String>,
    pub per_page: u32,
    pub debounce_ms: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Where downloads and exports are written (platform downloads dir when unset)
    pub download_dir: Option<PathBuf>,
    /// Show a native save dialog instead of writing straight into `download_dir`
    pub ask_save_location: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.unsplash.com".to_string(),
            access_key: None,
            per_page: 20,
            debounce_ms: 300,
            canvas_width: 800,
            canvas_height: 600,
            download_dir: None,
            ask_save_location: false,
        }
    }
}

impl AppConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width as f32, self.canvas_height as f32)
    }

    /// Directory downloads land in when no dialog is used.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load from the default location and apply environment overrides.
    pub fn load() -> Self {
        let mut config = match config_file() {
            Some(path) => load_from(&path),
            None => Self::default(),
        };
        config.apply_env(std::env::var(ACCESS_KEY_ENV).ok());
        config
    }

    fn apply_env(&mut self, access_key: Option<String>) {
        if let Some(key) = access_key.filter(|k| !k.trim().is_empty()) {
            self.access_key = Some(key);
        }
    }
}

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("caption-canvas").join("config.json"))
}

/// Missing file gives defaults; a corrupt file is logged and also gives defaults.
pub fn load_from(path: &Path) -> AppConfig {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return AppConfig::default();
    }
    match std::fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                AppConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_fresh_install() {
        let config = AppConfig::default();
        assert_eq!(config.per_page, 20);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.canvas_size(), (800.0, 600.0));
        assert!(config.access_key.is_none());
        assert!(!config.ask_save_location);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "per_page": 5, "access_key": "abc" }"#).unwrap();
        assert_eq!(parsed.per_page, 5);
        assert_eq!(parsed.access_key.as_deref(), Some("abc"));
        assert_eq!(parsed.api_base_url, "https://api.unsplash.com");
        assert_eq!(parsed.debounce_ms, 300);
    }

    #[test]
    fn corrupt_or_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join(format!("caption-canvas-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.json");
        assert_eq!(load_from(&missing), AppConfig::default());

        let corrupt = dir.join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(load_from(&corrupt), AppConfig::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn env_key_overrides_file_key_unless_blank() {
        let mut config = AppConfig {
            access_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(Some("   ".into()));
        assert_eq!(config.access_key.as_deref(), Some("from-file"));
        config.apply_env(Some("from-env".into()));
        assert_eq!(config.access_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn explicit_download_dir_wins() {
        let config = AppConfig {
            download_dir: Some(PathBuf::from("/tmp/shots")),
            ..AppConfig::default()
        };
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/shots"));
    }
}
