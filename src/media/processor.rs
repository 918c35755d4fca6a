use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, VidsubError};
use super::{AudioExtractor, MediaCommandBuilder, diagnostic_tail};

/// Lines of tool stderr kept on an extraction failure
const DIAGNOSTIC_LINES: usize = 20;

/// ffmpeg-backed audio extractor
pub struct FfmpegExtractor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegExtractor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        let command = self.command_builder.extract_audio(video_path, audio_path);
        let output = command.execute().await?;

        if !output.status.success() {
            return Err(VidsubError::ExtractionFailed {
                input: video_path.to_path_buf(),
                status: output.status.to_string(),
                diagnostic: diagnostic_tail(&output.stderr, DIAGNOSTIC_LINES),
            });
        }
        debug!("ffmpeg stderr:\n{}", output.stderr.trim_end());

        if tokio::fs::metadata(audio_path).await.is_err() {
            return Err(VidsubError::ExtractionFailed {
                input: video_path.to_path_buf(),
                status: output.status.to_string(),
                diagnostic: format!("no audio file was written to {}", audio_path.display()),
            });
        }

        info!("Audio extraction completed");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let output = self.command_builder.version_check().execute().await?;

        if output.status.success() {
            info!("Media processor is available: {}", self.config.binary_path);
            Ok(())
        } else {
            Err(VidsubError::ToolNotFound {
                binary: self.config.binary_path.clone(),
                source: std::io::Error::other(format!(
                    "version check exited with {}",
                    output.status
                )),
            })
        }
    }

    async fn version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let output = self.command_builder.version_check().execute().await?;
        if !output.status.success() {
            return Err(VidsubError::ToolNotFound {
                binary: self.config.binary_path.clone(),
                source: std::io::Error::other(diagnostic_tail(&output.stderr, DIAGNOSTIC_LINES)),
            });
        }

        // The first line typically contains the version
        let first_line = output.stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}
