//! Layered configuration: defaults, JSON file, environment, then CLI flags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation/generation";
const DEFAULT_MODEL: &str = "qwen-vl-max";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Remote inference endpoint settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Per-call timeout passed to the remote service
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every attempt after
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Dataset layout: numbered folders holding `X.jpg` and its partner `X 2.jpg`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub root: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
    pub pair_suffix: String,
    pub extension: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            root: None,
            annotations: None,
            pair_suffix: " 2".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    #[default]
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `vqa_select=debug`
    pub level: String,
    pub sink: LogSink,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            sink: LogSink::Stderr,
        }
    }
}

/// Complete configuration, built once and passed to each component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub retry: RetrySettings,
    pub dataset: DatasetSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Default config file location (`<config_dir>/vqa-gen/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vqa-gen").join("config.json"))
    }

    /// Load settings from an explicit file, or the default location if it
    /// exists, then apply environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup (empty values are ignored)
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("DASHSCOPE_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(model) = get("VQA_MODEL") {
            self.api.model = model;
        }
        if let Some(level) = get("VQA_LOG") {
            self.log.level = level;
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.retry.base_delay_ms)
    }
}
