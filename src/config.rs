use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::loader::DEFAULT_BASE_URL;
use crate::session::DEFAULT_SECONDS_PER_QUESTION;

/// What happens when a question's countdown reaches zero
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Keep the pending selection (if any) and move on
    #[default]
    Advance,
    /// Stay on the question with Next disabled
    Lock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub seconds_per_question: u32,
    pub request_timeout_secs: u64,
    pub on_expiry: ExpiryPolicy,
    pub quiz_sets: Vec<String>,
}

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            on_expiry: ExpiryPolicy::default(),
            quiz_sets: Vec::new(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Replace zero durations, which would stall every question or every request
    fn sanitized(mut self) -> Self {
        if self.seconds_per_question == 0 {
            warn!(
                default = DEFAULT_SECONDS_PER_QUESTION,
                "seconds_per_question must be positive, using default"
            );
            self.seconds_per_question = DEFAULT_SECONDS_PER_QUESTION;
        }
        if self.request_timeout_secs == 0 {
            warn!(
                default = DEFAULT_REQUEST_TIMEOUT_SECS,
                "request_timeout_secs must be positive, using default"
            );
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
