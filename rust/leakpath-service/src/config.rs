use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use leakpath_core::LeakOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// JSON grid description loaded at startup.
    pub grid_path: Option<PathBuf>,
    pub tick: Duration,
    pub options: LeakOptions,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("LEAKPATH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("LEAKPATH_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let grid_path = env::var("LEAKPATH_GRID").ok().map(PathBuf::from);
        let tick_ms = env::var("LEAKPATH_TICK_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(16);
        let options = match env::var("LEAKPATH_OPTIONS") {
            Ok(raw) => serde_json::from_str(&raw).context("LEAKPATH_OPTIONS is not valid LeakOptions json")?,
            Err(_) => LeakOptions::default(),
        };

        Ok(Self { host, port, grid_path, tick: Duration::from_millis(tick_ms), options })
    }

    pub fn addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}
