use std::path::PathBuf;
use thiserror::Error;

/// Errors raised outside of the control loop (startup, configuration, and service transport).
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("{service} service call failed: {reason}")]
    Service {
        service: &'static str,
        reason: String,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
