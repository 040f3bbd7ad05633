//! Configuration management
//!
//! Storage location, flashcard sources, VR thresholds and server address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where application state is persisted
    #[serde(default)]
    pub storage: StorageConfig,
    /// Flashcard sources
    #[serde(default)]
    pub flashcards: FlashcardsConfig,
    /// VR preview behaviour
    #[serde(default)]
    pub vr: VrConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Explicit state file; defaults to `<data dir>/<key>.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Name of the persisted record
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    "neet-tutor-storage".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardsConfig {
    /// Network endpoint tried before the seed file; empty to go straight to seeds
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seed file replacing the bundled one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/api/flashcards".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl FlashcardsConfig {
    pub fn endpoint(&self) -> Option<&str> {
        Some(self.endpoint.trim()).filter(|e| !e.is_empty())
    }
}

impl Default for FlashcardsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            seeds_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrConfig {
    /// Video percentage that unlocks the quiz
    #[serde(default = "default_quiz_unlock_threshold")]
    pub quiz_unlock_threshold: f64,
    #[serde(default = "default_video_url_base")]
    pub video_url_base: String,
}

fn default_quiz_unlock_threshold() -> f64 {
    60.0
}

fn default_video_url_base() -> String {
    "/learn/video".to_string()
}

impl Default for VrConfig {
    fn default() -> Self {
        Self {
            quiz_unlock_threshold: default_quiz_unlock_threshold(),
            video_url_base: default_video_url_base(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "neet-tutor", "neet-tutor")
        .context("Failed to get project directories")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("Configuration ({})", config_path()?.display());
    println!();
    println!("  storage.key               {}", config.storage.key);
    match &config.storage.path {
        Some(path) => println!("  storage.path              {}", path.display()),
        None => println!("  storage.path              {} (default)", data_dir()?.display()),
    }
    println!(
        "  flashcards.endpoint       {}",
        config.flashcards.endpoint().unwrap_or("(none, seeds only)")
    );
    match &config.flashcards.seeds_path {
        Some(path) => println!("  flashcards.seeds_path     {}", path.display()),
        None => println!("  flashcards.seeds_path     (bundled)"),
    }
    println!("  flashcards.timeout_secs   {}", config.flashcards.timeout_secs);
    println!("  vr.quiz_unlock_threshold  {}%", config.vr.quiz_unlock_threshold);
    println!("  vr.video_url_base         {}", config.vr.video_url_base);
    println!("  server                    {}:{}", config.server.host, config.server.port);
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}
