use serde::{Deserialize, Serialize};

/// One timed unit of recognized speech. Times are seconds from the start of the audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    /// Build a segment, clamping times so that `0 <= start <= end`
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        let end = if end.is_finite() { end.max(start) } else { start };
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Engine output: chronologically ordered segments plus metadata the pipeline passes through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: Option<String>,
    pub model_info: Option<String>,
}

impl Transcription {
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let text = segments
            .iter()
            .map(|seg| seg.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            segments,
            language: None,
            model_info: None,
        }
    }
}
