use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsubError {
    #[error("Media tool not found: {binary}: {source}")]
    ToolNotFound {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio extraction failed for {} ({status}): {diagnostic}", .input.display())]
    ExtractionFailed {
        input: PathBuf,
        status: String,
        diagnostic: String,
    },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Failed to write subtitles to {}: {source}", .path.display())]
    SerializationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VidsubError {
    /// Short stable label used in status lines and the batch summary
    pub fn kind(&self) -> &'static str {
        match self {
            VidsubError::ToolNotFound { .. } => "tool-not-found",
            VidsubError::ExtractionFailed { .. } => "extraction-failed",
            VidsubError::TranscriptionFailed(_) => "transcription-failed",
            VidsubError::SerializationFailed { .. } => "serialization-failed",
            VidsubError::InputInvalid(_) => "input-invalid",
            VidsubError::Io(_) => "io",
            VidsubError::Toml(_) => "toml",
            VidsubError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, VidsubError>;
