//! Batch pipeline controller.
//!
//! Every video goes through extract → transcribe → serialize in order, one
//! at a time. A stage failure turns into `Outcome::Skipped` for that video
//! only; the batch carries on. The audio artifact is removed on every exit
//! path, success included, before the outcome is recorded.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::error::{Result, VidsubError};
use crate::media::AudioExtractor;
use crate::report::BatchReport;
use crate::subtitle::generate_srt;
use crate::transcribe::Transcriber;

/// One input video and the base name its outputs are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    path: PathBuf,
    base_name: String,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| VidsubError::InputInvalid(format!("Invalid video filename: {}", path.display())))?;

        Ok(Self { path, base_name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.base_name.clone())
    }
}

/// Pipeline stage a video was skipped at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Transcription,
    Serialization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "extraction",
            Stage::Transcription => "transcription",
            Stage::Serialization => "serialization",
        };
        f.write_str(name)
    }
}

/// Terminal state of one pipeline run
#[derive(Debug)]
pub enum Outcome {
    Done {
        subtitle_path: PathBuf,
        segments: usize,
    },
    Skipped {
        stage: Stage,
        kind: &'static str,
        reason: String,
    },
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }

    pub fn skipped_at(&self) -> Option<Stage> {
        match self {
            Outcome::Skipped { stage, .. } => Some(*stage),
            Outcome::Done { .. } => None,
        }
    }
}

/// What the caller asked to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineInput {
    Directory(PathBuf),
    File(PathBuf),
}

impl PipelineInput {
    /// Classify an existing path; anything else is `InputInvalid`
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(VidsubError::InputInvalid("No input path given".to_string()));
        }
        if path.is_dir() {
            Ok(PipelineInput::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(PipelineInput::File(path.to_path_buf()))
        } else {
            Err(VidsubError::InputInvalid(format!(
                "'{}' not found or is not a file or directory",
                path.display()
            )))
        }
    }

    fn root(&self) -> Option<PathBuf> {
        match self {
            PipelineInput::Directory(dir) => Some(dir.clone()),
            PipelineInput::File(file) => file.parent().map(Path::to_path_buf),
        }
    }
}

pub struct Pipeline {
    extractor: Box<dyn AudioExtractor>,
    transcriber: Box<dyn Transcriber>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        extractor: Box<dyn AudioExtractor>,
        transcriber: Box<dyn Transcriber>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            extractor,
            transcriber,
            config,
        })
    }

    /// List the videos to process. A directory is scanned one level deep for
    /// files whose name ends in the video extension, ignoring case.
    pub fn discover(&self, input: &PipelineInput) -> Result<Vec<VideoFile>> {
        let dir = match input {
            PipelineInput::File(path) => return Ok(vec![VideoFile::new(path)?]),
            PipelineInput::Directory(dir) => dir,
        };

        if !dir.is_dir() {
            return Err(VidsubError::InputInvalid(format!(
                "Folder '{}' not found or is not a directory",
                dir.display()
            )));
        }

        let suffix = format!(".{}", extension(&self.config.video_extension).to_lowercase());
        let mut video_files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.ends_with(&suffix) {
                video_files.push(VideoFile::new(entry.path())?);
            }
        }

        if video_files.is_empty() {
            return Err(VidsubError::InputInvalid(format!(
                "No {} files found in '{}'",
                suffix,
                dir.display()
            )));
        }

        // Stable order for reports; correctness does not depend on it
        video_files.sort_by(|a, b| a.path.cmp(&b.path));
        info!("Found {} video files to process", video_files.len());
        Ok(video_files)
    }

    /// Directory that receives a video's subtitle and transient audio
    fn output_dir_for(&self, video: &VideoFile) -> PathBuf {
        match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => video
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    pub fn audio_path(&self, video: &VideoFile) -> PathBuf {
        self.output_dir_for(video)
            .join(format!("{}.{}", video.base_name, extension(&self.config.audio_extension)))
    }

    pub fn subtitle_path(&self, video: &VideoFile) -> PathBuf {
        self.output_dir_for(video)
            .join(format!("{}.{}", video.base_name, extension(&self.config.subtitle_extension)))
    }

    /// Process every video the input names. Only input problems are errors;
    /// per-file failures are recorded in the report.
    pub async fn run(&self, input: &PipelineInput) -> Result<BatchReport> {
        let video_files = self.discover(input)?;

        if let Some(dir) = &self.config.output_dir {
            fs::create_dir_all(dir).await?;
        }

        let started = Instant::now();
        let mut report = BatchReport::new(input.root());
        let progress = self.progress_bar(video_files.len() as u64);

        for video in video_files {
            progress.set_message(video.file_name());
            let outcome = self.process_file(&video).await;
            report.record(video, outcome);
            progress.inc(1);
        }

        progress.finish_and_clear();
        report.finish(started.elapsed());
        info!(
            "All {} files processed: {} succeeded, {} skipped",
            report.total(),
            report.processed(),
            report.skipped()
        );
        Ok(report)
    }

    /// Drive one video through all stages. Never fails: errors become `Skipped`.
    pub async fn process_file(&self, video: &VideoFile) -> Outcome {
        let audio_path = self.audio_path(video);
        let subtitle_path = self.subtitle_path(video);
        info!("Processing {}...", video.file_name());

        let result = self.run_stages(video, &audio_path, &subtitle_path).await;
        remove_artifact(&audio_path).await;

        match result {
            Ok(segments) => {
                info!(
                    "Subtitles generated successfully for {} at: {}",
                    video.file_name(),
                    subtitle_path.display()
                );
                Outcome::Done {
                    subtitle_path,
                    segments,
                }
            }
            Err((stage, err)) => {
                warn!("Skipping {} due to {} error: {}", video.file_name(), stage, err);
                Outcome::Skipped {
                    stage,
                    kind: err.kind(),
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn run_stages(
        &self,
        video: &VideoFile,
        audio_path: &Path,
        subtitle_path: &Path,
    ) -> std::result::Result<usize, (Stage, VidsubError)> {
        info!("Extracting audio from {}...", video.file_name());
        self.extractor
            .extract_audio(&video.path, audio_path)
            .await
            .map_err(|e| (Stage::Extraction, e))?;
        info!("Audio extraction complete.");

        info!("Transcribing audio from {}...", audio_path.display());
        let transcription = self
            .transcriber
            .transcribe(audio_path)
            .await
            .map_err(|e| (Stage::Transcription, e))?;
        info!("Transcription complete ({} segments).", transcription.segments.len());

        info!("Generating SRT file {}...", subtitle_path.display());
        generate_srt(&transcription.segments, subtitle_path)
            .await
            .map_err(|e| (Stage::Serialization, e))?;
        info!("SRT file generation complete.");

        Ok(transcription.segments.len())
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Remove the transient audio file if present. Failures are logged, not raised.
async fn remove_artifact(audio_path: &Path) {
    match fs::remove_file(audio_path).await {
        Ok(()) => info!("Cleaned up audio file: {}", audio_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No audio file to clean up at {}", audio_path.display())
        }
        Err(e) => warn!("Failed to remove audio file {}: {}", audio_path.display(), e),
    }
}

fn extension(ext: &str) -> &str {
    ext.trim_start_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockAudioExtractor;
    use crate::transcribe::MockTranscriber;
    use crate::transcript::{TranscriptSegment, Transcription};
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn quiet_config() -> PipelineConfig {
        PipelineConfig {
            show_progress: false,
            ..PipelineConfig::default()
        }
    }

    /// Writes a stand-in WAV; any video whose file name starts with "broken"
    /// fails after leaving a partial file behind.
    fn extractor() -> MockAudioExtractor {
        let mut mock = MockAudioExtractor::new();
        mock.expect_extract_audio().returning(|video, audio| {
            std::fs::write(audio, b"RIFF").unwrap();
            let name = video.file_name().unwrap().to_string_lossy().to_string();
            if name.starts_with("broken") {
                return Err(VidsubError::ExtractionFailed {
                    input: video.to_path_buf(),
                    status: "exit status: 1".to_string(),
                    diagnostic: "Invalid data found when processing input".to_string(),
                });
            }
            Ok(())
        });
        mock
    }

    fn transcriber() -> MockTranscriber {
        let mut mock = MockTranscriber::new();
        mock.expect_transcribe().returning(|audio| {
            assert!(audio.exists(), "audio must exist while transcribing");
            Ok(Transcription::from_segments(vec![
                TranscriptSegment::new(0.0, 1.2, " a "),
                TranscriptSegment::new(1.2, 3.0, "b"),
            ]))
        });
        mock
    }

    fn failing_transcriber() -> MockTranscriber {
        let mut mock = MockTranscriber::new();
        mock.expect_transcribe()
            .returning(|_| Err(VidsubError::TranscriptionFailed("model failed to load".to_string())));
        mock
    }

    fn pipeline(extractor: MockAudioExtractor, transcriber: MockTranscriber) -> Pipeline {
        Pipeline::new(Box::new(extractor), Box::new(transcriber), quiet_config()).unwrap()
    }

    #[tokio::test]
    async fn test_done_removes_audio_and_writes_subtitle() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("video").unwrap();
        let p = pipeline(extractor(), transcriber());
        let video = VideoFile::new(temp.child("talk.mp4").path()).unwrap();

        let outcome = p.process_file(&video).await;

        assert!(outcome.is_done());
        assert!(!temp.child("talk.wav").path().exists());
        let srt = std::fs::read_to_string(temp.child("talk.srt").path()).unwrap();
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,200\na\n\n2\n00:00:01,200 --> 00:00:03,000\nb\n\n"
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_removes_partial_audio() {
        let temp = TempDir::new().unwrap();
        temp.child("broken.mp4").write_str("video").unwrap();
        let mut never = MockTranscriber::new();
        never.expect_transcribe().times(0);
        let p = pipeline(extractor(), never);
        let video = VideoFile::new(temp.child("broken.mp4").path()).unwrap();

        let outcome = p.process_file(&video).await;

        assert_eq!(outcome.skipped_at(), Some(Stage::Extraction));
        assert!(!temp.child("broken.wav").path().exists());
        assert!(!temp.child("broken.srt").path().exists());
    }

    #[tokio::test]
    async fn test_transcription_failure_cleans_up() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("video").unwrap();
        let p = pipeline(extractor(), failing_transcriber());
        let video = VideoFile::new(temp.child("talk.mp4").path()).unwrap();

        let outcome = p.process_file(&video).await;

        match &outcome {
            Outcome::Skipped { stage, kind, reason } => {
                assert_eq!(*stage, Stage::Transcription);
                assert_eq!(*kind, "transcription-failed");
                assert!(reason.contains("model failed to load"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!temp.child("talk.wav").path().exists());
        assert!(!temp.child("talk.srt").path().exists());
    }

    #[tokio::test]
    async fn test_skipped_run_keeps_earlier_subtitle() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("video").unwrap();
        let earlier = "1\n00:00:00,000 --> 00:00:01,000\nfrom last week\n\n";
        temp.child("talk.srt").write_str(earlier).unwrap();
        let p = pipeline(extractor(), failing_transcriber());
        let video = VideoFile::new(temp.child("talk.mp4").path()).unwrap();

        let outcome = p.process_file(&video).await;

        assert_eq!(outcome.skipped_at(), Some(Stage::Transcription));
        assert!(!temp.child("talk.wav").path().exists());
        assert_eq!(std::fs::read_to_string(temp.child("talk.srt").path()).unwrap(), earlier);
    }

    #[tokio::test]
    async fn test_serialization_failure_cleans_up() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("video").unwrap();
        // a non-empty directory where the subtitle should go
        temp.child("talk.srt").create_dir_all().unwrap();
        temp.child("talk.srt").child("blocker").write_str("x").unwrap();
        let p = pipeline(extractor(), transcriber());
        let video = VideoFile::new(temp.child("talk.mp4").path()).unwrap();

        let outcome = p.process_file(&video).await;

        assert_eq!(outcome.skipped_at(), Some(Stage::Serialization));
        assert!(!temp.child("talk.wav").path().exists());
        assert!(!temp.child("talk.srt").path().is_file());
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let temp = TempDir::new().unwrap();
        temp.child("a.mp4").write_str("video").unwrap();
        temp.child("broken.mp4").write_str("video").unwrap();
        temp.child("c.mp4").write_str("video").unwrap();
        let p = pipeline(extractor(), transcriber());

        let report = p
            .run(&PipelineInput::Directory(temp.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.processed(), 2);
        assert!(report.find("a.mp4").unwrap().outcome.is_done());
        assert!(report.find("c.mp4").unwrap().outcome.is_done());
        assert_eq!(
            report.find("broken.mp4").unwrap().outcome.skipped_at(),
            Some(Stage::Extraction)
        );
        for base in ["a", "broken", "c"] {
            assert!(!temp.child(format!("{base}.wav")).path().exists());
        }
        assert!(temp.child("a.srt").path().exists());
        assert!(temp.child("c.srt").path().exists());
    }

    #[tokio::test]
    async fn test_empty_directory_is_nothing_to_do() {
        let temp = TempDir::new().unwrap();
        temp.child("notes.txt").write_str("not a video").unwrap();
        let mut never_extract = MockAudioExtractor::new();
        never_extract.expect_extract_audio().times(0);
        let mut never_transcribe = MockTranscriber::new();
        never_transcribe.expect_transcribe().times(0);
        let p = pipeline(never_extract, never_transcribe);

        let err = p
            .run(&PipelineInput::Directory(temp.path().to_path_buf()))
            .await
            .unwrap_err();

        assert!(matches!(err, VidsubError::InputInvalid(_)));
    }

    #[test]
    fn test_discover_matches_case_insensitively_without_recursion() {
        let temp = TempDir::new().unwrap();
        temp.child("A.MP4").write_str("v").unwrap();
        temp.child("b.Mp4").write_str("v").unwrap();
        temp.child("c.mkv").write_str("v").unwrap();
        temp.child("mp4").write_str("v").unwrap();
        temp.child("nested").create_dir_all().unwrap();
        temp.child("nested").child("d.mp4").write_str("v").unwrap();
        temp.child("folder.mp4").create_dir_all().unwrap();
        let p = pipeline(MockAudioExtractor::new(), MockTranscriber::new());

        let found = p
            .discover(&PipelineInput::Directory(temp.path().to_path_buf()))
            .unwrap();

        let names: Vec<String> = found.iter().map(|v| v.file_name()).collect();
        assert_eq!(names, vec!["A.MP4", "b.Mp4"]);
        assert_eq!(found[0].base_name(), "A");
    }

    #[tokio::test]
    async fn test_single_file_runs_once() {
        let temp = TempDir::new().unwrap();
        temp.child("one.mp4").write_str("v").unwrap();
        temp.child("two.mp4").write_str("v").unwrap();
        let mut ext = MockAudioExtractor::new();
        ext.expect_extract_audio().times(1).returning(|_, audio| {
            std::fs::write(audio, b"RIFF").unwrap();
            Ok(())
        });
        let p = pipeline(ext, transcriber());

        let input = PipelineInput::from_path(temp.child("one.mp4").path()).unwrap();
        let report = p.run(&input).await.unwrap();

        assert_eq!(report.total(), 1);
        assert!(temp.child("one.srt").path().exists());
        assert!(!temp.child("two.srt").path().exists());
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("v").unwrap();
        let p = pipeline(extractor(), transcriber());
        let input = PipelineInput::File(temp.child("talk.mp4").path().to_path_buf());

        p.run(&input).await.unwrap();
        let first = std::fs::read(temp.child("talk.srt").path()).unwrap();
        p.run(&input).await.unwrap();
        let second = std::fs::read(temp.child("talk.srt").path()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_output_dir_receives_subtitles() {
        let temp = TempDir::new().unwrap();
        temp.child("talk.mp4").write_str("v").unwrap();
        let out = temp.child("subs");
        let config = PipelineConfig {
            output_dir: Some(out.path().to_path_buf()),
            ..quiet_config()
        };
        let p = Pipeline::new(Box::new(extractor()), Box::new(transcriber()), config).unwrap();

        let report = p
            .run(&PipelineInput::Directory(temp.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.processed(), 1);
        assert!(out.child("talk.srt").path().exists());
        assert!(!out.child("talk.wav").path().exists());
        assert!(!temp.child("talk.srt").path().exists());
    }

    #[test]
    fn test_invalid_input_paths() {
        let temp = TempDir::new().unwrap();
        let err = PipelineInput::from_path(temp.child("missing").path()).unwrap_err();
        assert!(matches!(err, VidsubError::InputInvalid(_)));
        assert!(matches!(PipelineInput::from_path(""), Err(VidsubError::InputInvalid(_))));
        assert_eq!(
            PipelineInput::from_path(temp.path()).unwrap(),
            PipelineInput::Directory(temp.path().to_path_buf())
        );
    }
}
