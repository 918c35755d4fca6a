// Media processing
//
// - Commands: command builder for the external media tool
// - Processor: ffmpeg-backed audio extractor

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Produces a mono 16 kHz PCM audio file from a video file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract audio from video.
    ///
    /// Fails with `ToolNotFound` when the tool cannot be started and
    /// `ExtractionFailed` when it exits non-zero or writes nothing. Partial
    /// output is left for the caller to remove.
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Check if the media tool can be run
    async fn check_availability(&self) -> Result<()>;

    /// Get media tool version information
    async fn version_info(&self) -> Result<String>;
}

/// Factory for creating audio extractor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default extractor (ffmpeg-based)
    pub fn create_extractor(config: MediaConfig) -> Box<dyn AudioExtractor> {
        Box::new(processor::FfmpegExtractor::new(config))
    }
}
