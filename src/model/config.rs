use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub function: FunctionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Empty means the platform data dir.
    pub log_dir: String,
    pub log_file: String,
    pub log_filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionConfig {
    pub definition: String,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user_path = directories::ProjectDirs::from("", "", "function-host")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_from(user_path.as_deref())
    }

    /// Like [`AppConfig::load`] but reads the user layer from `user_path`.
    /// A path that does not exist is skipped.
    pub fn load_from(user_path: Option<&Path>) -> Result<Self> {
        let mut layered: toml::Value = toml::from_str(DEFAULTS)?;

        if let Some(path) = user_path.filter(|path| path.exists()) {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let user: toml::Value =
                toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
            merge(&mut layered, user);
            tracing::debug!("applied user config from {}", path.display());
        }

        let mut config: AppConfig = layered.try_into()?;
        config.expand_paths()?;
        Ok(config)
    }

    /// Parse a config document layered over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut layered: toml::Value = toml::from_str(DEFAULTS)?;
        merge(&mut layered, toml::from_str(raw)?);
        let mut config: AppConfig = layered.try_into()?;
        config.expand_paths()?;
        Ok(config)
    }

    pub fn log_dir(&self) -> PathBuf {
        if !self.general.log_dir.is_empty() {
            return PathBuf::from(&self.general.log_dir);
        }

        directories::ProjectDirs::from("", "", "function-host")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("function-host"))
    }

    fn expand_paths(&mut self) -> Result<()> {
        // Expand ~ in log_dir
        if self.general.log_dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            self.general.log_dir = self
                .general
                .log_dir
                .replacen('~', &home.to_string_lossy(), 1);
        }
        Ok(())
    }
}

/// Tables merge key by key; any other value in `overlay` replaces `base`.
fn merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
