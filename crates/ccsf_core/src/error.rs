use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
