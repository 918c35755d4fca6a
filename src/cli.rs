use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Speech model selector (e.g. tiny, base, small, medium)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Speech engine: openai-whisper or whisper-cpp
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Without a subcommand, prompts for a folder or file to process
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate subtitles for every video in a directory
    Batch {
        /// Directory containing video files (not searched recursively)
        input_dir: PathBuf,

        /// Output directory for subtitle files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate subtitles for a single video file
    Process {
        /// Input video file
        input: PathBuf,

        /// Output directory for the subtitle file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe an audio file straight to SRT
    Transcribe {
        /// Input audio file (mono 16 kHz PCM works best)
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "vidsub.toml")]
        path: PathBuf,
    },
}
