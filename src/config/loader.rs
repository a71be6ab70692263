//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_USER_AGENT;
use crate::captions::{CaptionFormat, DEFAULT_FPS};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub captions: CaptionsConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Transliteration table used for file names (en, de, ru, uk).
    #[serde(default = "default_language")]
    pub file_name_language: String,

    /// Directory media files are written to.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Preferred stream itag. Falls back to the first available stream.
    #[serde(default)]
    pub itag: Option<u32>,

    /// Keep partially downloaded files and append to them.
    #[serde(default)]
    pub resume: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            file_name_language: default_language(),
            output_directory: default_output_directory(),
            itag: None,
            resume: false,
        }
    }
}

/// Caption download configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionsConfig {
    /// Whether to write a caption file next to each video.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_language")]
    pub language: String,

    /// One of srt, sub, ass.
    #[serde(default = "default_caption_format")]
    pub format: String,

    /// Frame rate used by the sub format.
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            language: default_language(),
            format: default_caption_format(),
            fps: default_fps(),
        }
    }
}

impl CaptionsConfig {
    pub fn caption_format(&self) -> CaptionFormat {
        CaptionFormat::from_name(&self.format)
    }
}

/// HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bound on connection establishment. Transfers have no deadline.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("videos")
}

fn default_caption_format() -> String {
    CaptionFormat::Srt.to_string()
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout() -> u64 {
    15
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}
