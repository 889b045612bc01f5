use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Item not found: {0}")]
    ItemNotFound(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Viewer error: {0}")]
    Viewer(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;
