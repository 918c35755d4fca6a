// OpenAI Whisper command-line backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, VidsubError};
use crate::transcript::{TranscriptSegment, Transcription};
use super::{EngineUtils, Transcriber, TranscriptionMapper};

/// OpenAI Whisper specific JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAIWhisperSegment>,
    pub language: Option<String>,
}

/// OpenAI Whisper specific segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIWhisperSegment {
    pub id: Option<u64>,
    pub seek: Option<u64>,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub tokens: Option<Vec<i32>>,
    pub temperature: Option<f64>,
    pub avg_logprob: Option<f64>,
    pub compression_ratio: Option<f64>,
    pub no_speech_prob: Option<f64>,
}

/// Mapper for OpenAI Whisper format
pub struct OpenAIWhisperMapper;

impl TranscriptionMapper<OpenAIWhisperOutput> for OpenAIWhisperMapper {
    fn to_transcription(whisper_output: OpenAIWhisperOutput) -> Result<Transcription> {
        let segments = whisper_output
            .segments
            .into_iter()
            .map(|seg| TranscriptSegment::new(seg.start, seg.end, seg.text))
            .collect();

        Ok(Transcription {
            text: whisper_output.text.trim().to_string(),
            segments,
            language: whisper_output.language,
            model_info: Some("OpenAI Whisper".to_string()),
        })
    }
}

/// OpenAI Whisper implementation
pub struct OpenAITranscriber {
    config: TranscriberConfig,
}

impl OpenAITranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            audio_path.into(),
            "--model".into(),
            self.config.model.as_str().into(),
            "--output_dir".into(),
            output_dir.into(),
            "--output_format".into(),
            "json".into(),
            "--verbose".into(),
            "False".into(),
        ];

        if let Some(lang) = &self.config.language {
            args.push("--language".into());
            args.push(lang.as_str().into());
        }

        args
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        info!("Transcribing {} with OpenAI Whisper (model: {})", audio_path.display(), self.config.model);
        EngineUtils::ensure_audio(audio_path).await?;

        // The engine writes <stem>.json into this directory
        let temp_dir = tempfile::tempdir()
            .map_err(|e| VidsubError::TranscriptionFailed(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let args = self.build_args(audio_path, output_dir);
        EngineUtils::run(self.config.binary(), &args).await?;

        let json_file = output_dir.join(format!("{}.json", EngineUtils::audio_stem(audio_path)?));
        let whisper_output: OpenAIWhisperOutput = EngineUtils::read_json(&json_file).await?;

        let transcription = OpenAIWhisperMapper::to_transcription(whisper_output)?;
        info!("Transcription produced {} segments", transcription.segments.len());
        Ok(transcription)
    }

    async fn check_availability(&self) -> Result<()> {
        EngineUtils::probe(self.config.binary(), "--help").await?;
        info!("OpenAI Whisper command-line tool is available");
        Ok(())
    }
}
