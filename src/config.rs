//! Runtime configuration.
//!
//! Values come from serialized defaults overlaid by `GRIDFS_*` environment
//! variables (a `.env` file is loaded by the binary before this runs).
//! Credentials are never compiled in.

use crate::error::TransferError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "GRIDFS_";

/// Free-text keys taken verbatim from the environment. `Env` would otherwise
/// parse `12345` or `[abc]` into numbers and arrays.
const VERBATIM_KEYS: [&str; 7] = [
    "username",
    "password",
    "cluster_host",
    "database",
    "bucket",
    "app_name",
    "upload_name",
];

/// Whether an upload may reuse a filename that already exists in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Every upload creates a new object; readers see the oldest one first.
    #[default]
    Allow,
    /// Refuse the upload when any object already carries the filename.
    Reject,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub cluster_host: String,
    pub database: String,
    pub bucket: String,
    pub app_name: String,
    /// PEM bundle used as the TLS trust anchor. Driver defaults when unset.
    pub ca_file: Option<PathBuf>,
    pub chunk_size_bytes: Option<u32>,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
    pub retry_max_times: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub loglevel: String,
    pub upload_path: Option<PathBuf>,
    pub upload_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            cluster_host: String::new(),
            database: "grid_file".to_string(),
            bucket: "fs".to_string(),
            app_name: "gridfs-transfer".to_string(),
            ca_file: None,
            chunk_size_bytes: None,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 15,
            retry_max_times: 3,
            duplicate_policy: DuplicatePolicy::Allow,
            loglevel: "info".to_string(),
            upload_path: None,
            upload_name: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cluster_host", &self.cluster_host)
            .field("database", &self.database)
            .field("bucket", &self.bucket)
            .field("app_name", &self.app_name)
            .field("ca_file", &self.ca_file)
            .field("chunk_size_bytes", &self.chunk_size_bytes)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field(
                "server_selection_timeout_secs",
                &self.server_selection_timeout_secs,
            )
            .field("retry_max_times", &self.retry_max_times)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("loglevel", &self.loglevel)
            .field("upload_path", &self.upload_path)
            .field("upload_name", &self.upload_name)
            .finish()
    }
}

impl Config {
    /// Defaults overlaid by `GRIDFS_*` environment variables.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&VERBATIM_KEYS));
        for key in VERBATIM_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            if let Ok(value) = std::env::var(&var) {
                figment = figment.merge((key, value));
            }
        }
        figment
    }

    pub fn load() -> Result<Self, TransferError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, TransferError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TransferError> {
        if self.username.trim().is_empty() {
            return Err(TransferError::InvalidConfig("username is required".into()));
        }
        if self.cluster_host.trim().is_empty() {
            return Err(TransferError::InvalidConfig(
                "cluster_host is required".into(),
            ));
        }
        if self.chunk_size_bytes == Some(0) {
            return Err(TransferError::InvalidConfig(
                "chunk_size_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    /// SRV connection string with credentials embedded.
    pub fn connection_uri(&self) -> String {
        self.render_uri(&urlencoding::encode(&self.password))
    }

    /// Same as [`Config::connection_uri`] with the secret masked, for logs.
    pub fn redacted_uri(&self) -> String {
        self.render_uri("****")
    }

    fn render_uri(&self, secret: &str) -> String {
        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            urlencoding::encode(&self.username),
            secret,
            self.cluster_host
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }
}
