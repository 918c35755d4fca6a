use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, VidsubError};

fn default_show_progress() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Speech engine backend
    pub engine: TranscriberEngine,
    /// Path to the engine binary; empty means the engine's usual name on PATH
    #[serde(default)]
    pub binary_path: String,
    /// Model selector (quality/speed trade-off)
    pub model: String,
    /// Source language hint; None lets the engine detect it
    #[serde(default)]
    pub language: Option<String>,
    /// Directory holding ggml model files for whisper.cpp
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberEngine {
    /// OpenAI Whisper command-line tool (Python)
    OpenaiWhisper,
    /// whisper.cpp command-line tool
    WhisperCpp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extension (without dot) of input videos, matched case-insensitively
    pub video_extension: String,
    /// Extension of the transient audio artifact
    pub audio_extension: String,
    /// Extension of the subtitle output
    pub subtitle_extension: String,
    /// Directory for subtitle output; None writes next to each video
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            engine: TranscriberEngine::OpenaiWhisper,
            binary_path: String::new(),
            model: "base".to_string(),
            language: None,
            models_dir: PathBuf::from(".vidsub").join("models"),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_extension: "mp4".to_string(),
            audio_extension: "wav".to_string(),
            subtitle_extension: "srt".to_string(),
            output_dir: None,
            show_progress: true,
        }
    }
}

impl TranscriberEngine {
    /// Executable name used when no explicit binary path is configured
    pub fn default_binary(&self) -> &'static str {
        match self {
            TranscriberEngine::OpenaiWhisper => "whisper",
            TranscriberEngine::WhisperCpp => "whisper-cli",
        }
    }
}

impl std::str::FromStr for TranscriberEngine {
    type Err = VidsubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai-whisper" | "openai" | "whisper" => Ok(TranscriberEngine::OpenaiWhisper),
            "whisper-cpp" | "whisper.cpp" | "cpp" => Ok(TranscriberEngine::WhisperCpp),
            _ => Err(VidsubError::Config(format!(
                "Invalid transcriber engine '{}'. Valid engines: openai-whisper, whisper-cpp",
                s
            ))),
        }
    }
}

impl TranscriberConfig {
    /// Binary to invoke, falling back to the engine default
    pub fn binary(&self) -> &str {
        if self.binary_path.trim().is_empty() {
            self.engine.default_binary()
        } else {
            &self.binary_path
        }
    }
}

impl PipelineConfig {
    /// Reject extension setups where a derived path would land on the input video
    pub fn validate(&self) -> Result<()> {
        let video = self.video_extension.trim_start_matches('.').to_lowercase();
        let audio = self.audio_extension.trim_start_matches('.').to_lowercase();
        let subtitle = self.subtitle_extension.trim_start_matches('.').to_lowercase();

        if video.is_empty() || audio.is_empty() || subtitle.is_empty() {
            return Err(VidsubError::Config("File extensions must not be empty".to_string()));
        }
        if video == audio || video == subtitle || audio == subtitle {
            return Err(VidsubError::Config(format!(
                "Video, audio and subtitle extensions must differ (got {}, {}, {})",
                video, audio, subtitle
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VidsubError::Config(format!("Failed to read config file: {}", e)))?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VidsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VidsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
