use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the question timestamp service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Metadata fetching settings
    pub fetch: FetchConfig,

    /// Which fetched videos count as episodes
    pub episodes: EpisodeConfig,

    /// Access control for the re-fetch endpoint
    pub access: AccessConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Directory holding descriptions, subtitles and cached results
    pub meta_dir: PathBuf,

    /// Playlist the episodes are fetched from
    pub playlist_url: String,

    /// A youtube-dl binary shipped next to the service, preferred when present
    pub local_binary: PathBuf,

    /// Binary name used when no local binary exists
    pub system_binary: String,

    /// Videos fetched when the metadata directory was just created
    pub first_max_downloads: u32,

    /// Videos fetched on every later refresh
    pub max_downloads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// A title must contain one of these (case-insensitive)
    pub include_patterns: Vec<String>,

    /// A title must contain none of these (case-insensitive)
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Keys allowed to trigger a re-fetch; `None` accepts any key
    pub allowed_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9090,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            meta_dir: PathBuf::from(".vid-meta"),
            playlist_url: "https://www.youtube.com/playlist?list=UUs58xfxPpjVARRuwjH8usfw".to_string(),
            local_binary: PathBuf::from("youtube-dl"),
            system_binary: "youtube-dl".to_string(),
            first_max_downloads: 10,
            max_downloads: 5,
        }
    }
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["ask kati anything".to_string(), "aka".to_string()],
            exclude_patterns: vec!["otdm".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "aka_timestamps=info,tower_http=info,warn".to_string(),
        }
    }
}

impl AccessConfig {
    /// Parse a comma separated key list; entries shorter than 3 characters are ignored
    pub fn parse_keys(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|key| key.len() >= 3)
            .map(str::to_string)
            .collect()
    }

    /// Check a submitted key against the allow-list
    pub fn is_allowed(&self, key: &str) -> bool {
        match &self.allowed_keys {
            None => true,
            Some(keys) => keys.iter().any(|allowed| allowed.len() >= 3 && allowed == key),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults, then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(&[
            std::path::Path::new("aka-timestamps.toml"),
            std::path::Path::new("config/aka-timestamps.toml"),
        ])
    }

    /// Use the first existing file of `paths`; a file that exists but does not
    /// parse is an error rather than a silent fallback to defaults
    pub fn load_from(paths: &[&std::path::Path]) -> Result<Self> {
        for path in paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                let config: Config = toml::from_str(&config_str)
                    .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                return Ok(config.with_env_overrides());
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(keys) = std::env::var("AKS_KEYS") {
            self.access.allowed_keys = Some(AccessConfig::parse_keys(&keys));
        }

        if let Ok(dir) = std::env::var("AKA_META_DIR") {
            self.fetch.meta_dir = PathBuf::from(dir);
        }

        if let Ok(port) = std::env::var("AKA_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid AKA_PORT: {}", port),
            }
        }

        if let Ok(url) = std::env::var("AKA_PLAYLIST_URL") {
            self.fetch.playlist_url = url;
        }

        if let Ok(level) = std::env::var("AKA_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if self.fetch.max_downloads == 0 || self.fetch.first_max_downloads == 0 {
            return Err(anyhow!("max downloads must be greater than 0"));
        }

        if self.fetch.playlist_url.trim().is_empty() {
            return Err(anyhow!("playlist_url must not be empty"));
        }

        if self.episodes.include_patterns.is_empty() {
            return Err(anyhow!("at least one episode include pattern is required"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Question Timestamps Configuration:\n\
            - Listen: {}:{}\n\
            - Metadata Directory: {}\n\
            - Playlist: {}\n\
            - Max Downloads: {} (first run {})\n\
            - Access Keys: {}",
            self.server.host,
            self.server.port,
            self.fetch.meta_dir.display(),
            self.fetch.playlist_url,
            self.fetch.max_downloads,
            self.fetch.first_max_downloads,
            match &self.access.allowed_keys {
                Some(keys) => format!("{} configured", keys.len()),
                None => "open".to_string(),
            }
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_meta_dir(mut self, dir: PathBuf) -> Self {
        self.config.fetch.meta_dir = dir;
        self
    }

    pub fn with_playlist_url(mut self, url: String) -> Self {
        self.config.fetch.playlist_url = url;
        self
    }

    pub fn with_allowed_keys(mut self, keys: Vec<String>) -> Self {
        self.config.access.allowed_keys = Some(keys);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
