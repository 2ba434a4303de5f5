use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid {field}: {details}")]
    Validation { field: String, details: String },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Insight generation failed: {0}")]
    Insight(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TrackerError {
    pub fn validation(field: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
