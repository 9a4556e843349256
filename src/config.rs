use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Config, read from the TOML file named by the first CLI argument.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// <address>:<port> to serve the blog API
    pub listen_address: String,

    /// <address>:<port> to serve metrics on
    pub metrics_address: String,

    /// By default, output JSON logs. Set to true for colourful human-friendly logs.
    pub human_logs: bool,

    /// Max HTTP body size the API accepts
    #[serde(default = "max_body_size")]
    pub max_body_size: usize,

    /// Path of the SQLite database file
    pub db_path: String,

    /// maximum number of connections maintained by SqliteStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    /// Key used to sign and verify bearer tokens
    pub auth_secret: String,

    /// Whether to accept identity headers instead of verifying bearer tokens.
    /// This should only be true in test environments.
    pub disable_auth: bool,

    /// Directory where post image attachments are written
    pub media_root: PathBuf,

    /// How long a cached front-page listing stays valid
    #[serde(default = "index_cache_ttl_secs")]
    pub index_cache_ttl_secs: u64,
}

impl Config {
    /// Will crash if the file isn't found or the config is invalid.
    pub fn from_file(filepath: &str) -> Self {
        let contents = std::fs::read_to_string(filepath).expect("Couldn't read from config file");
        toml::from_str(&contents).expect("couldn't parse config file")
    }
}

fn max_body_size() -> usize {
    65536
}

fn index_cache_ttl_secs() -> u64 {
    20
}

/// The slice of config that request handlers and extractors need at runtime.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth_secret: String,
    pub disable_auth: bool,
    pub media_root: PathBuf,
    pub index_ttl: Duration,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth_secret: config.auth_secret.clone(),
            disable_auth: config.disable_auth,
            media_root: config.media_root.clone(),
            index_ttl: Duration::from_secs(config.index_cache_ttl_secs),
        }
    }
}
