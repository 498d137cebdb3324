use std::path::PathBuf;
use thiserror::Error;

/// Rejections raised while checking filter tuples against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("'{name}' is not a filterable option")]
    UnknownFilter { name: String },

    #[error("operator '{operator}' is not allowed for filter '{name}'")]
    InvalidOperator { name: String, operator: String },

    #[error("value '{value}' is not allowed for filter '{name}'")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum NessusError {
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Request to '{path}' failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limited on '{path}' after {attempts} attempts")]
    RateLimited { path: String, attempts: u32 },

    #[error("Invalid input for '{path}': {message}")]
    InvalidInput { path: String, message: String },

    #[error("Unauthorized request to '{path}'; check the API keys")]
    Unauthorized { path: String },

    #[error("Permission denied for '{path}'")]
    Forbidden { path: String },

    #[error("Resource '{path}' not found")]
    NotFound { path: String },

    #[error("API error ({status}) for '{path}': {message}")]
    Api {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from '{path}': {message}")]
    InvalidResponse { path: String, message: String },

    #[error("At least one identifier is required")]
    NoIdentifiers,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid YAML syntax in {}:{line}:{column}: {message}", .file.display())]
    YamlSyntaxError {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Validation error in config '{}':\n{}", .file.display(), .errors.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation { file: PathBuf, errors: Vec<String> },

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl NessusError {
    /// Maps a non-success status into the matching variant.
    pub fn from_status(path: &str, status: u16, message: String) -> Self {
        let path = path.to_string();
        match status {
            400 => NessusError::InvalidInput { path, message },
            401 => NessusError::Unauthorized { path },
            403 => NessusError::Forbidden { path },
            404 => NessusError::NotFound { path },
            _ => NessusError::Api {
                path,
                status,
                message,
            },
        }
    }

    pub fn invalid_response(path: &str, message: impl Into<String>) -> Self {
        NessusError::InvalidResponse {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NessusError>;
