// Speech-to-text adapters
//
// Each backend drives an external speech engine over a prepared audio file
// and maps the engine's JSON into `Transcription`:
// - OpenAI: OpenAI Whisper command-line tool
// - WhisperCpp: whisper.cpp command-line tool
//
// To add a backend, parse its output into a service-specific struct,
// implement `TranscriptionMapper` for it, and add a `TranscriberEngine` arm
// to the factory.

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::{TranscriberConfig, TranscriberEngine};
use crate::error::Result;
use crate::transcript::Transcription;

/// Runs speech recognition over an audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the whole file. Every engine problem surfaces as `TranscriptionFailed`.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription>;

    /// Check if the engine can be run
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the transcriber selected by `config.engine`
    pub fn create_transcriber(config: TranscriberConfig) -> Box<dyn Transcriber> {
        match config.engine {
            TranscriberEngine::OpenaiWhisper => Box::new(openai::OpenAITranscriber::new(config)),
            TranscriberEngine::WhisperCpp => Box::new(whisper_cpp::WhisperCppTranscriber::new(config)),
        }
    }
}
