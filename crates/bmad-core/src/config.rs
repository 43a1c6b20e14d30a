use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::entitlement::DEFAULT_FREE_CREDITS;
use super::entitlement::DEFAULT_PRO_CREDITS;
use super::error::WorkspaceError;
use super::error::WorkspaceResult;

pub const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "bmad";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub quotas: QuotaConfig,
    pub delays: DelayConfig,
    pub panels: PanelConfig,
    pub api: ApiConfig,
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> WorkspaceResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> WorkspaceResult<Self> {
        toml::from_str(raw).map_err(|err| WorkspaceError::Config(err.to_string()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(".bmad"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct QuotaConfig {
    pub free_credits: u32,
    pub pro_credits: u32,
    pub low_threshold: u32,
    pub critical_threshold: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_credits: DEFAULT_FREE_CREDITS,
            pro_credits: DEFAULT_PRO_CREDITS,
            low_threshold: 10,
            critical_threshold: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DelayConfig {
    pub preview_refresh_ms: u64,
    pub chat_reply_ms: u64,
    pub completion_ms: u64,
    pub refactor_ms: u64,
    pub build_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            preview_refresh_ms: 500,
            chat_reply_ms: 1_500,
            completion_ms: 1_500,
            refactor_ms: 2_000,
            build_ms: 2_000,
        }
    }
}

impl DelayConfig {
    pub fn preview_refresh(&self) -> Duration {
        Duration::from_millis(self.preview_refresh_ms)
    }

    pub fn chat_reply(&self) -> Duration {
        Duration::from_millis(self.chat_reply_ms)
    }

    pub fn completion(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }

    pub fn refactor(&self) -> Duration {
        Duration::from_millis(self.refactor_ms)
    }

    pub fn build(&self) -> Duration {
        Duration::from_millis(self.build_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub guide_open_by_default: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            guide_open_by_default: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub cors_origin: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origin: "*".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let config = Config::from_toml(
            r#"
            [quotas]
            pro_credits = 1000

            [delays]
            chat_reply_ms = 10
            "#,
        )
        .expect("parse");

        assert_eq!(config.quotas.pro_credits, 1000);
        assert_eq!(config.quotas.free_credits, 50);
        assert_eq!(config.delays.chat_reply_ms, 10);
        assert_eq!(config.delays.build_ms, 2_000);
        assert!(config.panels.guide_open_by_default);
        assert_eq!(config.api.cors_origin, "*");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let config = Config::load(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = Config::from_toml("[quotas\nfree_credits = 'x'").unwrap_err();
        assert!(matches!(err, crate::error::WorkspaceError::Config(_)));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = Config::from_toml("[storage]\ndata_dir = \"/tmp/bmad-test\"").expect("parse");
        assert_eq!(config.data_dir(), std::path::PathBuf::from("/tmp/bmad-test"));
    }
}
