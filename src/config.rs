use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::types::{Clef, Difficulty};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default = "default_clef")]
    pub clef: Clef,
    /// Where this config loads from and saves to. Not part of the file
    /// itself; `None` means the platform config directory.
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}
fn default_theme() -> String {
    "light".to_string()
}
fn default_download_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}
fn default_difficulty() -> Difficulty {
    Difficulty::Beginner
}
fn default_clef() -> Clef {
    Clef::Treble
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            theme: default_theme(),
            download_dir: default_download_dir(),
            difficulty: default_difficulty(),
            clef: default_clef(),
            path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific file, falling back to defaults when it does not
    /// exist. The path sticks, so a later `save` writes back to it.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.path = Some(path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(Self::default_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Redirect load/save away from the platform config directory.
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clefdr")
            .join("config.toml")
    }

    /// Validate the theme name against known themes, resetting to the
    /// default if invalid. Call after deserialization.
    pub fn normalize_theme(&mut self, valid_themes: &[&str]) {
        if !valid_themes.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
    }
}
