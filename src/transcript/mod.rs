//! Transcript acquisition.
//!
//! A [`TranscriptSource`] turns a video ID into the flat spoken-word text of
//! that video. The production source shells out to yt-dlp for captions.

mod youtube;

pub use youtube::YtDlpTranscriptSource;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video as a single flat string.
    ///
    /// `languages` lists caption languages in order of preference. Fails with
    /// `TranscriptNotAvailable` when the video has no captions and with
    /// `TranscriptUnavailable` for any other upstream failure.
    async fn fetch_transcript(&self, video_id: &str, languages: &[String]) -> Result<String>;
}
