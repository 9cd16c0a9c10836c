use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Value of `max-age` sent with successful catalog responses.
    #[serde(default = "default_max_age")]
    pub max_age: u64,
    /// How often the config file is re-read. 0 disables reloading.
    #[serde(default = "default_reload_interval")]
    pub reload_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
            reload_interval: default_reload_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_douban")]
    pub douban: UpstreamEndpoint,
    #[serde(default = "default_short_video", alias = "shortvideo")]
    pub short_video: UpstreamEndpoint,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            douban: default_douban(),
            short_video: default_short_video(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamEndpoint {
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl UpstreamEndpoint {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_max_age() -> u64 {
    7200
}

fn default_reload_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    10
}

fn default_douban() -> UpstreamEndpoint {
    UpstreamEndpoint {
        base_url: "https://m.douban.com/rexxar/api/v2".to_string(),
        timeout: default_timeout(),
    }
}

fn default_short_video() -> UpstreamEndpoint {
    UpstreamEndpoint {
        base_url: "https://wwzy.tv".to_string(),
        timeout: default_timeout(),
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        // An empty file is a valid config that uses every default.
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

/// Source of the `max-age` used on successful catalog responses.
#[async_trait]
pub trait CacheTimeSource: Send + Sync {
    async fn cache_seconds(&self) -> u64;
}

/// Holds the current config snapshot and swaps it in place on reload.
pub struct ConfigStore {
    path: Option<String>,
    current: ArcSwap<Config>,
}

impl ConfigStore {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::from_file(path)?;
        Ok(Self {
            path: Some(path.to_string()),
            current: ArcSwap::from_pointee(config),
        })
    }

    /// A store that is not backed by a file; `reload` is a no-op.
    pub fn from_config(config: Config) -> Self {
        Self {
            path: None,
            current: ArcSwap::from_pointee(config),
        }
    }

    pub fn get(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Re-read the config file. On error the previous snapshot stays active.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let mut config = Config::from_file(path)?;
        config.debug_logs = self.current.load().debug_logs;

        let old_max_age = self.current.load().cache.max_age;
        if config.cache.max_age != old_max_age {
            info!(
                old = old_max_age,
                new = config.cache.max_age,
                "Cache max-age changed"
            );
        }

        self.current.store(Arc::new(config));
        Ok(())
    }

    pub fn set_debug_logs(&self, debug_logs: bool) {
        let mut config = Config::clone(&self.current.load());
        config.debug_logs = debug_logs;
        self.current.store(Arc::new(config));
    }

    pub fn start_background_reload(self: Arc<Self>, interval_secs: u64) {
        if interval_secs == 0 || self.path.is_none() {
            return;
        }
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick completes immediately; the file was just loaded.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = self.reload() {
                    error!("Config reload failed, keeping previous config: {}", e);
                }
            }
        });
    }
}

#[async_trait]
impl CacheTimeSource for ConfigStore {
    async fn cache_seconds(&self) -> u64 {
        self.current.load().cache.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(file: &tempfile::NamedTempFile, content: &str) {
        std::fs::write(file.path(), content).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("test", "").unwrap();
        assert_eq!(config.listen.port, "3000");
        assert_eq!(config.cache.max_age, 7200);
        assert_eq!(config.upstream.douban.timeout, 10);
        assert_eq!(
            config.upstream.douban.base_url,
            "https://m.douban.com/rexxar/api/v2"
        );
        assert_eq!(config.upstream.short_video.base_url, "https://wwzy.tv");
    }

    #[test]
    fn test_partial_config() {
        let yaml = "cache:\n  max_age: 600\nupstream:\n  short_video:\n    base_url: http://localhost:9000\n    timeout: 3\n";
        let config = Config::from_yaml("test", yaml).unwrap();
        assert_eq!(config.cache.max_age, 600);
        assert_eq!(config.cache.reload_interval, 60);
        assert_eq!(config.upstream.short_video.base_url, "http://localhost:9000");
        assert_eq!(config.upstream.short_video.timeout(), Duration::from_secs(3));
        assert_eq!(config.upstream.douban.timeout, 10);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_yaml("bad.yaml", "cache: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(ref p, _) if p == "bad.yaml"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_max_age() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "cache:\n  max_age: 100\n");

        let store = ConfigStore::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(store.cache_seconds().await, 100);

        write_config(&file, "cache:\n  max_age: 250\n");
        store.reload().unwrap();
        assert_eq!(store.cache_seconds().await, 250);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_previous() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "cache:\n  max_age: 100\n");

        let store = ConfigStore::load(file.path().to_str().unwrap()).unwrap();
        write_config(&file, "cache: [oops");
        assert!(store.reload().is_err());
        assert_eq!(store.cache_seconds().await, 100);
    }
}
