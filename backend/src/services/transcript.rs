use crate::error::{FetchError, FetchResult};
use anyhow::anyhow;
use log::debug;
use yt_transcript_rs::api::YouTubeTranscriptApi;

#[rocket::async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Full caption text of a video. Any failure (no captions, unsupported video, network) is an error.
    async fn fetch_text(&self, video_id: &str) -> FetchResult<String>;
}

pub struct YtTranscriptSource {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
}

impl YtTranscriptSource {
    pub fn new(languages: Vec<String>) -> anyhow::Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| anyhow!("Failed to create YouTubeTranscriptApi: {e}"))?;
        let languages = if languages.is_empty() {
            vec!["en".to_string()]
        } else {
            languages
        };
        Ok(YtTranscriptSource { api, languages })
    }
}

#[rocket::async_trait]
impl TranscriptSource for YtTranscriptSource {
    async fn fetch_text(&self, video_id: &str) -> FetchResult<String> {
        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();

        let transcript = self
            .api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| FetchError::Transcript(e.to_string()))?;

        let mut segments = Vec::new();
        for entry in transcript {
            segments.push(entry.text);
        }
        debug!("Fetched {} caption segments for video ID: {video_id}", segments.len());

        Ok(join_segments(&segments))
    }
}

/// Caption segments joined by single spaces, surrounding whitespace trimmed.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let mut text = String::new();
    for segment in segments {
        text.push_str(segment.as_ref());
        text.push(' ');
    }
    text.trim().to_string()
}
