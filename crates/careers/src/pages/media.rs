use regex::Regex;
use std::sync::OnceLock;

static YOUTUBE_PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();

fn youtube_patterns() -> &'static [Regex; 3] {
    YOUTUBE_PATTERNS.get_or_init(|| {
        [
            Regex::new(r"youtube\.com/watch\?v=([^&\n?#]+)").expect("watch pattern compiles"),
            Regex::new(r"youtu\.be/([^&\n?#]+)").expect("short link pattern compiles"),
            Regex::new(r"youtube\.com/embed/([^&\n?#]+)").expect("embed pattern compiles"),
        ]
    })
}

/// Extracts the YouTube video id from `watch?v=`, `youtu.be/` or `embed/` URLs.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    youtube_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Where an embedded video should point.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum VideoSource {
    YouTube(String),
    Link(String),
}

impl VideoSource {
    pub fn from_url(url: &str) -> Option<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(match youtube_video_id(trimmed) {
            Some(id) => Self::YouTube(format!("https://www.youtube.com/embed/{id}")),
            None => Self::Link(trimmed.to_string()),
        })
    }
}
