use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VidsubError};
use crate::media::diagnostic_tail;
use crate::transcript::Transcription;

/// Lines of engine stderr kept in a failure message
const DIAGNOSTIC_LINES: usize = 20;

/// Trait for converting service-specific transcription formats into `Transcription`
pub trait TranscriptionMapper<T> {
    fn to_transcription(service_result: T) -> Result<Transcription>;
}

/// Helpers shared by the command-line engine backends
pub struct EngineUtils;

impl EngineUtils {
    /// Fail early when the audio artifact is missing
    pub async fn ensure_audio(audio_path: &Path) -> Result<()> {
        match tokio::fs::metadata(audio_path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(VidsubError::TranscriptionFailed(format!(
                "{} is not a file",
                audio_path.display()
            ))),
            Err(e) => Err(VidsubError::TranscriptionFailed(format!(
                "cannot read audio {}: {}",
                audio_path.display(),
                e
            ))),
        }
    }

    /// File stem of the audio path, used to locate the engine's output file
    pub fn audio_stem(audio_path: &Path) -> Result<String> {
        audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| VidsubError::TranscriptionFailed("Invalid audio filename".to_string()))
    }

    /// Run an engine command to completion, mapping every failure to `TranscriptionFailed`
    pub async fn run(binary: &str, args: &[OsString]) -> Result<()> {
        debug!("Executing speech engine: {} {:?}", binary, args);

        let output = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VidsubError::TranscriptionFailed(format!("Failed to execute {}: {}", binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsubError::TranscriptionFailed(format!(
                "{} exited with {}: {}",
                binary,
                output.status,
                diagnostic_tail(&stderr, DIAGNOSTIC_LINES)
            )));
        }

        Ok(())
    }

    /// Read and parse the engine's JSON output
    pub async fn read_json<T: DeserializeOwned>(json_file: &Path) -> Result<T> {
        let content = tokio::fs::read_to_string(json_file).await.map_err(|e| {
            VidsubError::TranscriptionFailed(format!(
                "Failed to read engine output {}: {}",
                json_file.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            VidsubError::TranscriptionFailed(format!("Failed to parse engine output: {}", e))
        })
    }

    /// Run `<binary> --help` style probes used by `check_availability`
    pub async fn probe(binary: &str, arg: &str) -> Result<()> {
        let output = Command::new(binary)
            .arg(arg)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VidsubError::TranscriptionFailed(format!("{} command not found: {}", binary, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(VidsubError::TranscriptionFailed(format!(
                "{} not available: {}",
                binary,
                diagnostic_tail(&stderr, DIAGNOSTIC_LINES)
            )))
        }
    }
}
