//! Startup configuration for the `minserve` binary.
//!
//! Values come from an optional YAML file named by `MINSERVE_CONFIG`, then
//! environment overrides:
//!
//! | Variable                   | Field             |
//! |----------------------------|-------------------|
//! | `LISTEN`                   | `listen_addr`     |
//! | `MINSERVE_QUEUE_SIZE`      | `queue_size`      |
//! | `MINSERVE_WORKERS`         | `workers`         |
//! | `MINSERVE_READ_TIMEOUT_MS` | `read_timeout_ms` |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::server::{DEFAULT_QUEUE_SIZE, ServerConfig};

pub const CONFIG_PATH_VAR: &str = "MINSERVE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub queue_size: usize,
    /// 0 picks a worker count from the number of cores.
    pub workers: usize,
    pub read_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            queue_size: DEFAULT_QUEUE_SIZE,
            workers: 0,
            read_timeout_ms: 1,
        }
    }
}

impl Config {
    /// Reads the optional config file, then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.listen_addr = addr;
        }
        if let Some(size) = env_number("MINSERVE_QUEUE_SIZE")? {
            self.queue_size = size;
        }
        if let Some(workers) = env_number("MINSERVE_WORKERS")? {
            self.workers = workers;
        }
        if let Some(ms) = env_number("MINSERVE_READ_TIMEOUT_MS")? {
            self.read_timeout_ms = ms;
        }
        Ok(())
    }

    /// Server tunables with the default error handler.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            error_handler: None,
            queue_size: self.queue_size,
            worker_count: self.workers,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

fn env_number<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(None),
    }
}
