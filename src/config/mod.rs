//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `ADDRMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_HIDDEN_DIM, DEFAULT_MATCH_TIMEOUT_SECS, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_VOCAB_SIZE,
};
use crate::model::EsimConfig;
use crate::tokenize::resolve_tokenizer_path;

/// Session and server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ADDRMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// JSON word → id dictionary. Default: `data/dict/word_dict.json`.
    pub vocab_path: PathBuf,

    /// Trained model weights. Default: `result/best_esim_model.pth`.
    pub checkpoint_path: PathBuf,

    /// Candidate addresses, one per line. Default: `data/dataset/demo/unique_addresses.txt`.
    pub catalog_path: PathBuf,

    /// Optional `tokenizer.json` or a directory holding one; vocabulary max-match
    /// segmentation when unset.
    pub tokenizer_path: Option<PathBuf>,

    /// Embedding rows, padding row included. Default: `44018`.
    pub vocab_size: usize,

    /// Default: `200`.
    pub embedding_dim: usize,

    /// Default: `128`.
    pub hidden_dim: usize,

    /// Default: `128`.
    pub max_seq_len: usize,

    /// Upper bound for one HTTP match request. Default: `30` seconds.
    pub match_timeout: Duration,

    /// Skip GPU probing. Not read from the environment; set by the CLI.
    pub force_cpu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            vocab_path: PathBuf::from("data/dict/word_dict.json"),
            checkpoint_path: PathBuf::from("result/best_esim_model.pth"),
            catalog_path: PathBuf::from("data/dataset/demo/unique_addresses.txt"),
            tokenizer_path: None,
            vocab_size: DEFAULT_VOCAB_SIZE,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            hidden_dim: DEFAULT_HIDDEN_DIM,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            match_timeout: Duration::from_secs(DEFAULT_MATCH_TIMEOUT_SECS),
            force_cpu: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ADDRMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "ADDRMATCH_BIND_ADDR";
    const ENV_VOCAB_PATH: &'static str = "ADDRMATCH_VOCAB_PATH";
    const ENV_CHECKPOINT_PATH: &'static str = "ADDRMATCH_CHECKPOINT_PATH";
    const ENV_CATALOG_PATH: &'static str = "ADDRMATCH_CATALOG_PATH";
    const ENV_TOKENIZER_PATH: &'static str = "ADDRMATCH_TOKENIZER_PATH";
    const ENV_VOCAB_SIZE: &'static str = "ADDRMATCH_VOCAB_SIZE";
    const ENV_EMBEDDING_DIM: &'static str = "ADDRMATCH_EMBEDDING_DIM";
    const ENV_HIDDEN_DIM: &'static str = "ADDRMATCH_HIDDEN_DIM";
    const ENV_MAX_SEQ_LEN: &'static str = "ADDRMATCH_MAX_SEQ_LEN";
    const ENV_MATCH_TIMEOUT_SECS: &'static str = "ADDRMATCH_MATCH_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let vocab_path = Self::parse_path_from_env(Self::ENV_VOCAB_PATH, defaults.vocab_path);
        let checkpoint_path =
            Self::parse_path_from_env(Self::ENV_CHECKPOINT_PATH, defaults.checkpoint_path);
        let catalog_path = Self::parse_path_from_env(Self::ENV_CATALOG_PATH, defaults.catalog_path);
        let tokenizer_path = Self::parse_optional_path_from_env(Self::ENV_TOKENIZER_PATH);
        let vocab_size = Self::parse_number_from_env(Self::ENV_VOCAB_SIZE, defaults.vocab_size)?;
        let embedding_dim =
            Self::parse_number_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let hidden_dim = Self::parse_number_from_env(Self::ENV_HIDDEN_DIM, defaults.hidden_dim)?;
        let max_seq_len = Self::parse_number_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let timeout_secs = Self::parse_number_from_env(
            Self::ENV_MATCH_TIMEOUT_SECS,
            defaults.match_timeout.as_secs(),
        )?;

        Ok(Self {
            port,
            bind_addr,
            vocab_path,
            checkpoint_path,
            catalog_path,
            tokenizer_path,
            vocab_size,
            embedding_dim,
            hidden_dim,
            max_seq_len,
            match_timeout: Duration::from_secs(timeout_secs),
            force_cpu: false,
        })
    }

    /// Validates paths and dimensions (reads nothing, creates nothing).
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_file(&self.vocab_path)?;
        Self::require_file(&self.checkpoint_path)?;
        Self::require_file(&self.catalog_path)?;
        if let Some(ref path) = self.tokenizer_path {
            Self::require_file(&resolve_tokenizer_path(path))?;
        }

        for (name, value) in [
            (Self::ENV_VOCAB_SIZE, self.vocab_size),
            (Self::ENV_EMBEDDING_DIM, self.embedding_dim),
            (Self::ENV_HIDDEN_DIM, self.hidden_dim),
            (Self::ENV_MAX_SEQ_LEN, self.max_seq_len),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { name });
            }
        }

        if self.match_timeout.is_zero() {
            return Err(ConfigError::ZeroDimension {
                name: Self::ENV_MATCH_TIMEOUT_SECS,
            });
        }

        Ok(())
    }

    /// Model dimensions for [`EsimModel`](crate::model::EsimModel).
    pub fn model_config(&self) -> EsimConfig {
        EsimConfig::new(self.vocab_size, self.embedding_dim, self.hidden_dim)
            .with_max_seq_len(self.max_seq_len)
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
