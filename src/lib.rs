//! Vidsub - Batch Video-to-Subtitle Generation
//!
//! Extracts audio from video files with ffmpeg, transcribes it with a
//! whisper engine, and writes one SRT file per video.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod report;
pub mod subtitle;
pub mod timecode;
pub mod transcribe;
pub mod transcript;
