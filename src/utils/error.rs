use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Missing required option: {key}")]
    MissingOption { key: String },

    #[error("Invalid value for option '{key}': {value} ({reason})")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown wrapper class '{class}' (available: {available})")]
    UnknownAdapter { class: String, available: String },

    #[error("Source error: {message}")]
    Source { message: String },

    #[error("Source connection lost: {message}")]
    Disconnected { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row has {actual} cells, expected {expected}")]
    ArityMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Parse,
}

impl AdapterError {
    pub fn missing(key: &str) -> Self {
        AdapterError::MissingOption {
            key: key.to_string(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        AdapterError::Source {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AdapterError::Parse {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdapterError::MissingOption { .. }
            | AdapterError::InvalidOption { .. }
            | AdapterError::UnknownAdapter { .. } => ErrorCategory::Configuration,
            AdapterError::Parse { .. }
            | AdapterError::Json(_)
            | AdapterError::ArityMismatch { .. } => ErrorCategory::Parse,
            _ => ErrorCategory::Source,
        }
    }

    pub fn is_config(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Parse errors are reported as a kind of source error.
    pub fn is_source(&self) -> bool {
        !self.is_config()
    }

    /// The backend handle can no longer be trusted after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            AdapterError::Disconnected { .. } => true,
            #[cfg(feature = "redis")]
            AdapterError::Redis(e) => e.is_connection_dropped() || e.is_io_error(),
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the foreign table OPTIONS against the adapter's required options"
            }
            ErrorCategory::Source => "Check that the backend is reachable and retry the scan",
            ErrorCategory::Parse => "Inspect the upstream payload; it does not match the declared shape",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
