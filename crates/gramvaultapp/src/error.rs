use thiserror::Error;

/// Reasons a backup document is refused before anything is merged.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Backup file could not be read as JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),
}

#[derive(Error, Debug)]
pub enum GramVaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, GramVaultError>;
