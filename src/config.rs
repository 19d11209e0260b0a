//! Configuration loading and resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3333;

/// Default grace period before a stalled performance can be taken over
pub const DEFAULT_TAKEOVER_GRACE_SECS: u64 = 300;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Path of the JSON persistence file
    pub data_file: PathBuf,
    /// Guest names granted VIP status at registration (case-insensitive)
    pub vip_guests: Vec<String>,
    /// Seconds a current song may sit before the next guest can take over
    pub takeover_grace_secs: u64,
    /// Commentary provider settings
    pub commentary: CommentaryConfig,
}

/// Commentary provider settings
#[derive(Debug, Clone)]
pub struct CommentaryConfig {
    /// Messages endpoint URL
    pub api_url: String,
    /// Model identifier sent with each request
    pub model: String,
    /// API key; when absent the deterministic fallback lines are used
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// On-disk config file shape; every field optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    data_file: Option<PathBuf>,
    vip_guests: Option<Vec<String>>,
    takeover_grace_secs: Option<u64>,
    #[serde(default)]
    commentary: FileCommentaryConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileCommentaryConfig {
    api_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Resolve the full configuration from CLI arguments, environment,
    /// config file, and defaults, in that priority order.
    pub fn resolve(
        cli_port: Option<u16>,
        cli_data_file: Option<&str>,
        cli_config: Option<&str>,
    ) -> Result<Config> {
        let file = load_config_file(cli_config)?;

        // Priority 1: Command-line argument
        // Priority 2: Environment variable
        // Priority 3: TOML config file
        // Priority 4: Compiled default
        let port = cli_port
            .or_else(|| {
                std::env::var("OPENMIC_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let data_file = cli_data_file
            .map(PathBuf::from)
            .or_else(|| std::env::var("OPENMIC_DATA_FILE").ok().map(PathBuf::from))
            .or(file.data_file)
            .unwrap_or_else(default_data_file);

        let vip_guests = file.vip_guests.unwrap_or_default();

        let takeover_grace_secs = file
            .takeover_grace_secs
            .unwrap_or(DEFAULT_TAKEOVER_GRACE_SECS);

        let defaults = CommentaryConfig::default();
        let commentary = CommentaryConfig {
            api_url: file.commentary.api_url.unwrap_or(defaults.api_url),
            model: file.commentary.model.unwrap_or(defaults.model),
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .or(file.commentary.api_key),
            timeout_secs: file.commentary.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        Ok(Config {
            port,
            data_file,
            vip_guests,
            takeover_grace_secs,
            commentary,
        })
    }

    /// True when the (trimmed) guest name is on the configured VIP list
    pub fn is_vip_name(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.vip_guests.iter().any(|v| v.trim().to_lowercase() == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            data_file: default_data_file(),
            vip_guests: Vec::new(),
            takeover_grace_secs: DEFAULT_TAKEOVER_GRACE_SECS,
            commentary: CommentaryConfig::default(),
        }
    }
}

/// Load the TOML config file, if one can be found.
///
/// Search order: explicit path argument, then `./openmic.toml`, then the
/// platform config directory (`<config_dir>/openmic/openmic.toml`). A
/// missing file is fine; an unreadable or malformed file is an error.
fn load_config_file(explicit: Option<&str>) -> Result<FileConfig> {
    let path = match explicit {
        Some(p) => Some(PathBuf::from(p)),
        None => find_default_config(),
    };

    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    if explicit.is_none() && !path.exists() {
        return Ok(FileConfig::default());
    }

    parse_config_file(&path)
}

fn parse_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

fn find_default_config() -> Option<PathBuf> {
    let local = PathBuf::from("openmic.toml");
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|d| d.join("openmic").join("openmic.toml"))
}

/// OS-dependent default location of the persistence file
fn default_data_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("openmic").join("party.json"))
        .unwrap_or_else(|| PathBuf::from("party.json"))
}
