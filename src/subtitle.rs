use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, VidsubError};
use crate::timecode::format_timestamp;
use crate::transcript::TranscriptSegment;

/// Render segments as an SRT document.
///
/// Blocks are numbered from 1 in sequence order. Text is trimmed and
/// otherwise emitted as-is. No segments renders as an empty document.
pub fn render_srt(segments: &[TranscriptSegment]) -> String {
    let mut srt_content = String::new();

    for (index, segment) in segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text.trim()
        ));
    }

    srt_content
}

/// Write an SRT file, replacing any existing file at `output_path`.
///
/// The document goes to a hidden sibling temp file first and is renamed into
/// place, so a failed write never leaves a new file at `output_path`.
pub async fn generate_srt<P: AsRef<Path>>(
    segments: &[TranscriptSegment],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    let srt_content = render_srt(segments);
    let temp_path = temp_sibling(output_path);
    debug!("Writing {} bytes via {}", srt_content.len(), temp_path.display());

    let written = match fs::write(&temp_path, srt_content.as_bytes()).await {
        Ok(()) => fs::rename(&temp_path, output_path).await,
        Err(e) => Err(e),
    };

    if let Err(source) = written {
        discard_temp(&temp_path).await;
        return Err(VidsubError::SerializationFailed {
            path: output_path.to_path_buf(),
            source,
        });
    }

    info!("SRT file generated successfully ({} blocks)", segments.len());
    Ok(())
}

fn temp_sibling(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "subtitles".to_string());
    let temp_name = format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple());

    match output_path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

async fn discard_temp(temp_path: &Path) {
    match fs::remove_file(temp_path).await {
        Ok(()) => debug!("Removed partial subtitle file {}", temp_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial subtitle file {}: {}", temp_path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, 1.2, "a"),
            TranscriptSegment::new(1.2, 3.0, "b"),
        ]
    }

    #[test]
    fn test_render_two_blocks() {
        let srt = render_srt(&segments());
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,200\na\n\n2\n00:00:01,200 --> 00:00:03,000\nb\n\n"
        );

        let blocks: Vec<&str> = srt.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("1\n"));
        assert!(blocks[1].starts_with("2\n"));

        let end_of_first = blocks[0].lines().nth(1).unwrap().split(" --> ").nth(1).unwrap();
        let start_of_second = blocks[1].lines().nth(1).unwrap().split(" --> ").next().unwrap();
        assert_eq!(end_of_first, start_of_second);
    }

    #[test]
    fn test_render_trims_text_only() {
        let srt = render_srt(&[TranscriptSegment::new(0.0, 1.0, "  <i>Hi</i>, there & you \n")]);
        assert_eq!(srt, "1\n00:00:00,000 --> 00:00:01,000\n<i>Hi</i>, there & you\n\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_srt(&[]), "");
    }

    #[tokio::test]
    async fn test_generate_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.srt");
        std::fs::write(&path, "stale content that is longer than the new one").unwrap();

        generate_srt(&segments(), &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, render_srt(&segments()));
        // only the subtitle remains, no temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_generate_empty_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.srt");

        generate_srt(&[], &path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_generate_missing_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("talk.srt");

        let err = generate_srt(&segments(), &path).await.unwrap_err();

        assert!(matches!(err, VidsubError::SerializationFailed { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_generate_onto_directory_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupied.srt");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let err = generate_srt(&segments(), &path).await.unwrap_err();

        assert!(matches!(err, VidsubError::SerializationFailed { .. }));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
