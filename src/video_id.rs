//! Video identifier extraction from submitted URLs.

use regex::Regex;
use std::sync::OnceLock;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"v=([^&]+)").expect("Invalid regex"))
}

/// Extract the video ID from a URL.
///
/// Returns the run of characters following the first `v=` up to the next `&`
/// (or the end of the string). No percent-decoding is performed.
pub fn extract_video_id(url: &str) -> Option<String> {
    video_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
