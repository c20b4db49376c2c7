use std::{fs, path::Path};

use serde::Deserialize;

use crate::{GuideflowError, Result, RoutingPolicy};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// number of async worker threads, range [1, 32768), defaults to 16
    pub async_worker_thread_number: u16,
    /// action dispatcher config
    pub dispatcher: DispatcherConfig,
    /// per-session engine config
    pub engine: EngineConfig,
    /// store config
    pub store: StoreConfig,
    /// channel name to workflow routes, first match wins
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// number of action workers, defaults to 4
    pub workers: usize,
    /// pending action capacity, `0` means unbounded, defaults to 1024
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// policy applied when an input matches no visible option
    pub routing_policy: RoutingPolicy,
    /// max number of live conversations, defaults to 10000
    pub session_capacity: u64,
    /// idle seconds before a conversation is dropped, defaults to 1800
    pub session_idle_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
    /// file store config
    pub file: Option<FileStoreConfig>,
    /// number of built trees kept by the file store, defaults to 128
    pub tree_cache_capacity: usize,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    Mem,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileStoreConfig {
    /// directory holding `<workflow_id>.json` or `<workflow_id>.toml` files
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// glob matched against the channel name
    pub channel: String,
    /// workflow id served on matching channels
    pub workflow: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            async_worker_thread_number: 16,
            dispatcher: DispatcherConfig::default(),
            engine: EngineConfig::default(),
            store: StoreConfig::default(),
            routes: Vec::new(),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            routing_policy: RoutingPolicy::default(),
            session_capacity: 10_000,
            session_idle_secs: 1800,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            file: None,
            tree_cache_capacity: 128,
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| GuideflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_str).map_err(|e| GuideflowError::Config(format!("failed to parse the toml str: {}", e)))
    }
}
