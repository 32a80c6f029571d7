use format_serde_error::SerdeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    MalformedConfig(#[from] SerdeError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Only table can be traversed.
    #[error("can traverse only table, found {0}")]
    TraverseNonTableAt(String),

    /// Override string is not of the form `key=value`.
    #[error("invalid override: '{0}'")]
    InvalidOverride(String),
}
