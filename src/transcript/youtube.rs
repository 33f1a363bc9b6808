//! YouTube captions via yt-dlp.

use super::TranscriptSource;
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Transcript source backed by yt-dlp's subtitle download.
pub struct YtDlpTranscriptSource {
    executable: String,
}

impl YtDlpTranscriptSource {
    pub fn new() -> Self {
        Self::with_executable("yt-dlp")
    }

    /// Use a specific yt-dlp executable.
    pub fn with_executable(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
        }
    }
}

impl Default for YtDlpTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<String> {
        let work_dir = tempfile::tempdir()
            .map_err(|e| local_failure("Failed to create caption directory", e))?;
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = work_dir.path().join("%(id)s.%(ext)s");

        info!("Fetching captions for {}", video_id);

        let result = Command::new(&self.executable)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(languages.join(","))
            .arg("--sub-format").arg("json3")
            .arg("--output").arg(template.to_str().unwrap_or_default())
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidqaError::ToolNotFound(self.executable.clone()));
            }
            Err(e) => {
                return Err(VidqaError::TranscriptUnavailable(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidqaError::TranscriptUnavailable(format!(
                "yt-dlp failed: {}",
                stderr.trim()
            )));
        }

        let caption_file = find_caption_file(work_dir.path(), languages)
            .map_err(|e| local_failure("Failed to list downloaded captions", e))?
            .ok_or_else(|| VidqaError::TranscriptNotAvailable(video_id.to_string()))?;

        let content = std::fs::read_to_string(&caption_file)
            .map_err(|e| local_failure("Failed to read captions", e))?;
        let transcript = parse_json3(&content)?;

        if transcript.is_empty() {
            return Err(VidqaError::TranscriptNotAvailable(video_id.to_string()));
        }

        debug!("Fetched transcript of {} chars", transcript.chars().count());
        Ok(transcript)
    }
}

/// Locate the downloaded caption file, honoring language preference.
fn find_caption_file(dir: &Path, languages: &[String]) -> std::io::Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json3"))
        .collect();
    candidates.sort();

    for lang in languages {
        let suffix = format!(".{}.json3", lang);
        if let Some(found) = candidates.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix))
        }) {
            return Ok(Some(found.clone()));
        }
    }

    Ok(candidates.into_iter().next())
}

/// Local I/O during a fetch is still a fetch failure, not an internal one.
fn local_failure(stage: &str, err: std::io::Error) -> VidqaError {
    VidqaError::TranscriptUnavailable(format!("{}: {}", stage, err))
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Flatten a json3 caption document into one string, one caption event per
/// space-separated snippet.
fn parse_json3(content: &str) -> Result<String> {
    let captions: Json3Captions = serde_json::from_str(content).map_err(|e| {
        VidqaError::TranscriptUnavailable(format!("Failed to parse captions: {}", e))
    })?;

    let snippets: Vec<String> = captions
        .events
        .iter()
        .map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            text.replace('\n', " ").trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect();

    Ok(snippets.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json3() {
        let json = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 1500, "segs": [{"utf8": "Cats are"}, {"utf8": " mammals."}]},
                {"tStartMs": 1500, "dDurationMs": 10, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 1600},
                {"tStartMs": 2000, "dDurationMs": 1500, "segs": [{"utf8": "Cats sleep\na lot."}]}
            ]
        }"#;

        let transcript = parse_json3(json).unwrap();
        assert_eq!(transcript, "Cats are mammals. Cats sleep a lot.");
    }

    #[test]
    fn test_parse_json3_malformed() {
        let err = parse_json3("not json").unwrap_err();
        assert!(matches!(err, VidqaError::TranscriptUnavailable(_)));
    }

    #[test]
    fn test_find_caption_file_prefers_language_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.de.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.en.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("abc.info.json"), "{}").unwrap();

        let languages = vec!["en".to_string(), "de".to_string()];
        let found = find_caption_file(dir.path(), &languages).unwrap().unwrap();
        assert!(found.ends_with("abc.en.json3"));

        let languages = vec!["fr".to_string()];
        let found = find_caption_file(dir.path(), &languages).unwrap().unwrap();
        assert!(found.ends_with("abc.de.json3"));
    }

    #[test]
    fn test_find_caption_file_none() {
        let dir = tempfile::tempdir().unwrap();
        let languages = vec!["en".to_string()];
        assert!(find_caption_file(dir.path(), &languages).unwrap().is_none());
    }

    /// Write an executable stand-in for yt-dlp that drops `caption` bytes
    /// next to the requested output template.
    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, caption: &[u8]) -> String {
        use std::os::unix::fs::PermissionsExt;

        let caption_path = dir.join("caption.src");
        std::fs::write(&caption_path, caption).unwrap();

        let script = format!(
            "#!/bin/sh\n\
             while [ $# -gt 0 ]; do\n\
               if [ \"$1\" = \"--output\" ]; then out=\"$2\"; fi\n\
               shift\n\
             done\n\
             cp '{}' \"$(dirname \"$out\")/abc.en.json3\"\n",
            caption_path.display()
        );
        let script_path = dir.join("yt-dlp");
        std::fs::write(&script_path, script).unwrap();
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).unwrap();
        script_path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_with_fake_ytdlp() {
        let dir = tempfile::tempdir().unwrap();
        let caption = br#"{"events": [{"segs": [{"utf8": "Cats are mammals."}]}]}"#;
        let source = YtDlpTranscriptSource::with_executable(&fake_ytdlp(dir.path(), caption));

        let transcript = source
            .fetch_transcript("abc", &["en".to_string()])
            .await
            .unwrap();
        assert_eq!(transcript, "Cats are mammals.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_caption_file_is_transcript_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            YtDlpTranscriptSource::with_executable(&fake_ytdlp(dir.path(), &[0xff, 0xfe, 0x00]));

        let err = source
            .fetch_transcript("abc", &["en".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, VidqaError::TranscriptUnavailable(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::TranscriptUnavailable);
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let source = YtDlpTranscriptSource::with_executable("definitely-not-yt-dlp-xyz");
        let err = source
            .fetch_transcript("abc", &["en".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, VidqaError::ToolNotFound(_)));
    }
}
