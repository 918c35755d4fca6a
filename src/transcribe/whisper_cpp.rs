// whisper.cpp command-line backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, VidsubError};
use crate::transcript::{TranscriptSegment, Transcription};
use super::{EngineUtils, Transcriber, TranscriptionMapper};

// Structs for parsing whisper.cpp JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: Option<WhisperCppResult>,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

/// Segment bounds in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

/// Mapper for whisper.cpp format
pub struct WhisperCppMapper;

impl TranscriptionMapper<WhisperCppOutput> for WhisperCppMapper {
    fn to_transcription(whisper_output: WhisperCppOutput) -> Result<Transcription> {
        let segments = whisper_output
            .transcription
            .into_iter()
            .map(|seg| {
                let start = seg.offsets.from as f64 / 1000.0;
                let end = seg.offsets.to as f64 / 1000.0;
                TranscriptSegment::new(start, end, seg.text)
            })
            .collect();

        let mut transcription = Transcription::from_segments(segments);
        transcription.language = whisper_output.result.map(|r| r.language);
        transcription.model_info = Some("Whisper.cpp".to_string());
        Ok(transcription)
    }
}

/// Resolve a model selector to a ggml model file: a `.bin` value or a path
/// is used as-is, a bare name maps to `<models_dir>/ggml-<name>.bin`.
pub fn resolve_model_path(models_dir: &Path, model: &str) -> PathBuf {
    let looks_like_path = model.ends_with(".bin") || model.contains('/') || model.contains('\\');
    if looks_like_path {
        PathBuf::from(model)
    } else {
        models_dir.join(format!("ggml-{}.bin", model))
    }
}

/// whisper.cpp implementation
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, model_path: &Path, audio_path: &Path, output_base: &Path) -> Vec<OsString> {
        let language = self.config.language.as_deref().unwrap_or("auto");
        vec![
            "-m".into(),
            model_path.into(),
            "-f".into(),
            audio_path.into(),
            "-l".into(),
            language.into(),
            "-oj".into(),
            "-of".into(),
            output_base.into(),
            "-np".into(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        let model_path = resolve_model_path(&self.config.models_dir, &self.config.model);
        info!("Transcribing {} with whisper.cpp (model: {})", audio_path.display(), model_path.display());

        if !model_path.is_file() {
            return Err(VidsubError::TranscriptionFailed(format!(
                "whisper.cpp model not found: {}",
                model_path.display()
            )));
        }
        EngineUtils::ensure_audio(audio_path).await?;

        let temp_dir = tempfile::tempdir()
            .map_err(|e| VidsubError::TranscriptionFailed(format!("Failed to create temp directory: {}", e)))?;
        // -of takes the output path without extension; whisper.cpp appends `.json`
        let stem = EngineUtils::audio_stem(audio_path)?;
        let output_base = temp_dir.path().join(&stem);

        let args = self.build_args(&model_path, audio_path, &output_base);
        EngineUtils::run(self.config.binary(), &args).await?;

        let json_file = temp_dir.path().join(format!("{}.json", stem));
        let whisper_output: WhisperCppOutput = EngineUtils::read_json(&json_file).await?;

        let transcription = WhisperCppMapper::to_transcription(whisper_output)?;
        info!("Transcription produced {} segments", transcription.segments.len());
        Ok(transcription)
    }

    async fn check_availability(&self) -> Result<()> {
        EngineUtils::probe(self.config.binary(), "--help").await?;
        info!("whisper.cpp is available");
        Ok(())
    }
}
