use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::{Outcome, VideoFile};

/// Final state of one video's pipeline run
#[derive(Debug)]
pub struct FileReport {
    pub video: VideoFile,
    pub outcome: Outcome,
}

/// Tally of a batch run, used for the end-of-run summary
#[derive(Debug)]
pub struct BatchReport {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub files: Vec<FileReport>,
    root: Option<PathBuf>,
}

impl BatchReport {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            started_at: Local::now(),
            elapsed: Duration::ZERO,
            files: Vec::new(),
            root,
        }
    }

    pub fn record(&mut self, video: VideoFile, outcome: Outcome) {
        self.files.push(FileReport { video, outcome });
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn processed(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_done()).count()
    }

    pub fn skipped(&self) -> usize {
        self.total() - self.processed()
    }

    /// Report entry for a video, looked up by file name
    pub fn find(&self, file_name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.video.file_name() == file_name)
    }

    fn display_path(&self, path: &Path) -> String {
        self.root
            .as_deref()
            .and_then(|root| pathdiff::diff_paths(path, root))
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} of {} file(s), {} skipped ({:.1}s, started {})",
            self.processed(),
            self.total(),
            self.skipped(),
            self.elapsed.as_secs_f64(),
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )?;

        for file in &self.files {
            let name = self.display_path(file.video.path());
            match &file.outcome {
                Outcome::Done { subtitle_path, segments } => writeln!(
                    f,
                    "  ok      {} -> {} ({} blocks)",
                    name,
                    self.display_path(subtitle_path),
                    segments
                )?,
                Outcome::Skipped { stage, kind, reason } => {
                    writeln!(f, "  skipped {} at {} [{}]: {}", name, stage, kind, reason)?
                }
            }
        }
        Ok(())
    }
}
