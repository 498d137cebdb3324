use crate::error::{NessusError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://localhost:8834";
/// Largest accepted `backoff_secs`.
pub const MAX_BACKOFF_SECS: f64 = 300.0;

/// Connection settings for a Nessus Manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub url: String,
    pub access_key: String,
    pub secret_key: String,
    pub retries: u32,
    /// Seconds to wait after a 429 without a `Retry-After` header.
    pub backoff_secs: f64,
    pub timeout_secs: u64,
    /// Set to false for managers running with self-signed certificates.
    pub verify: bool,
    /// Appended to the User-Agent to identify the calling application.
    pub ua_identity: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            retries: 3,
            backoff_secs: 1.0,
            timeout_secs: 30,
            verify: true,
            ua_identity: None,
            cache_dir: None,
            cache_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl ClientConfig {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_secs = backoff.as_secs_f64();
        self
    }

    pub fn with_ua_identity(mut self, identity: impl Into<String>) -> Self {
        self.ua_identity = Some(identity.into());
        self
    }

    /// Clamped to `0..=MAX_BACKOFF_SECS`, so an unvalidated value never panics.
    pub fn backoff(&self) -> Duration {
        Duration::try_from_secs_f64(self.backoff_secs.max(0.0).min(MAX_BACKOFF_SECS))
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn from_yaml(content: &str, file: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|l| (l.line(), l.column()))
                .unwrap_or((0, 0));
            NessusError::YamlSyntaxError {
                file: file.to_path_buf(),
                line,
                column,
                message: e.to_string(),
            }
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NessusError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    /// File (when given), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`ClientConfig::load`] with a custom environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(lookup);
        config.validate(path.unwrap_or_else(|| Path::new("<environment>")))?;
        Ok(config)
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NESSUS_URL") {
            self.url = url;
        }
        if let Some(key) = lookup("NESSUS_ACCESS_KEY") {
            self.access_key = key;
        }
        if let Some(key) = lookup("NESSUS_SECRET_KEY") {
            self.secret_key = key;
        }
        if let Some(verify) = lookup("NESSUS_VERIFY") {
            self.verify = !matches!(verify.to_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(dir) = lookup("NESSUS_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Collects every problem instead of stopping at the first one.
    pub fn validate(&self, file: &Path) -> Result<()> {
        let mut errors = Vec::new();

        if self.access_key.trim().is_empty() {
            errors.push("access_key is empty".to_string());
        }
        if self.secret_key.trim().is_empty() {
            errors.push("secret_key is empty".to_string());
        }
        match Url::parse(&self.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!("url scheme '{}' is not http or https", url.scheme())),
            Err(e) => errors.push(format!("url '{}' is invalid: {}", self.url, e)),
        }
        if self.timeout_secs == 0 {
            errors.push("timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=MAX_BACKOFF_SECS).contains(&self.backoff_secs) {
            errors.push(format!("backoff_secs must be between 0 and {}", MAX_BACKOFF_SECS));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NessusError::Validation {
                file: file.to_path_buf(),
                errors,
            })
        }
    }
}
