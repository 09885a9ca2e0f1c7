use thiserror::Error;

#[derive(Error, Debug)]
pub enum HdrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numeric failure: {0}")]
    NumericFailure(String),

    #[error("Failed to read resource: {0}")]
    ResourceFailure(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unknown {kind} variant: {name}")]
    UnknownVariant { kind: &'static str, name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HdrError>;
