use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub news_api: NewsApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "AIAssistant".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub notes_file: PathBuf,
    pub articles_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: program_dir(),
            notes_file: PathBuf::from("notes.txt"),
            articles_file: PathBuf::from("news_articles.json"),
        }
    }
}

impl StorageConfig {
    /// Location of the plain-text note log.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(&self.notes_file)
    }

    /// Location of the JSON article list.
    pub fn articles_path(&self) -> PathBuf {
        self.data_dir.join(&self.articles_file)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NewsApiConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NEWS_API_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Directory holding the running executable; the stores live next to it.
fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            log::info!("No {} found, using default configuration", path.display());
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Override file values with `NEWS_API_KEY`, `NEWS_API_URL` and
    /// `ASSISTANT_DATA_DIR` when they are set.
    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("NEWS_API_KEY") {
            self.news_api.api_key = key;
        }
        if let Some(url) = var("NEWS_API_URL") {
            self.news_api.endpoint = url;
        }
        if let Some(dir) = var("ASSISTANT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    /// Create the data directory if it doesn't exist
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.storage.data_dir)
            .with_context(|| format!("Failed to create data directory {}", self.storage.data_dir.display()))?;
        Ok(())
    }
}
