//! In-memory collaborators for unit tests.

use crate::error::{FetchError, FetchResult};
use crate::models::{SearchPage, SearchResultItem};
use crate::services::transcript::TranscriptSource;
use crate::services::youtube::{RawStatistics, YouTubeApi};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Search,
    Statistics,
    Duration,
    CategoryId,
    CategoryTitle,
    Location,
}

#[derive(Debug, Clone)]
pub struct MockVideo {
    pub id: String,
    pub has_id: bool,
    pub title: String,
    pub description: String,
    pub channel: String,
    pub published_at: String,
    pub tags: Option<Vec<String>>,
    pub views: u64,
    pub comments: Option<u64>,
    pub duration: Option<String>,
    pub category: String,
    pub location: Option<String>,
}

impl MockVideo {
    pub fn new(id: &str) -> Self {
        MockVideo {
            id: id.to_string(),
            has_id: true,
            title: format!("Video {id}"),
            description: format!("About {id}"),
            channel: "Test Channel".to_string(),
            published_at: "2024-03-01T12:00:00Z".to_string(),
            tags: None,
            views: 1000,
            comments: Some(10),
            duration: Some("PT4M13S".to_string()),
            category: "Education".to_string(),
            location: None,
        }
    }

    pub fn without_id(mut self) -> Self {
        self.has_id = false;
        self
    }

    pub fn without_comments(mut self) -> Self {
        self.comments = None;
        self
    }

    pub fn without_duration(mut self) -> Self {
        self.duration = None;
        self
    }

    pub fn located(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn search_item(&self) -> SearchResultItem {
        SearchResultItem {
            video_id: self.has_id.then(|| self.id.clone()),
            title: self.title.clone(),
            description: self.description.clone(),
            channel_title: self.channel.clone(),
            published_at: self.published_at.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Serves `videos` as the search corpus. Continuation tokens are stringified offsets.
#[derive(Default)]
pub struct MockApi {
    videos: Vec<MockVideo>,
    failures: Mutex<HashMap<(Field, String), Option<u32>>>,
    delays: HashMap<(Field, String), Duration>,
    calls: Mutex<HashMap<Field, usize>>,
    searches: Mutex<Vec<(u32, Option<String>)>>,
    extra_results: usize,
    stall_at: Option<usize>,
}

const CATEGORY_PREFIX: &str = "cat-";

impl MockApi {
    pub fn new(videos: Vec<MockVideo>) -> Self {
        MockApi {
            videos,
            ..MockApi::default()
        }
    }

    pub fn corpus(size: usize) -> Self {
        Self::new((1..=size).map(|i| MockVideo::new(&format!("v{i}"))).collect())
    }

    pub fn with_video(mut self, video: MockVideo) -> Self {
        self.videos.push(video);
        self
    }

    /// Every call for `key` fails. `key` is the video id, or the query for [`Field::Search`].
    pub fn failing(self, field: Field, key: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((field, key.to_string()), None);
        self
    }

    pub fn failing_times(self, field: Field, key: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((field, key.to_string()), Some(times));
        self
    }

    pub fn slow(mut self, field: Field, key: &str, delay: Duration) -> Self {
        self.delays.insert((field, key.to_string()), delay);
        self
    }

    /// Search pages carry `extra` more results than requested.
    pub fn over_delivering(mut self, extra: usize) -> Self {
        self.extra_results = extra;
        self
    }

    /// Pages starting at `offset` or later are empty but still carry a continuation token.
    pub fn stalling_at(mut self, offset: usize) -> Self {
        self.stall_at = Some(offset);
        self
    }

    pub fn calls(&self, field: Field) -> usize {
        self.calls.lock().unwrap().get(&field).copied().unwrap_or(0)
    }

    pub fn searches(&self) -> Vec<(u32, Option<String>)> {
        self.searches.lock().unwrap().clone()
    }

    async fn enter(&self, field: Field, key: &str) -> FetchResult<()> {
        *self.calls.lock().unwrap().entry(field).or_default() += 1;

        if let Some(delay) = self.delays.get(&(field, key.to_string())) {
            tokio::time::sleep(*delay).await;
        }

        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&(field, key.to_string())) {
            Some(None) => Err(injected(field)),
            Some(Some(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Err(injected(field))
            }
            _ => Ok(()),
        }
    }

    fn video(&self, video_id: &str) -> FetchResult<&MockVideo> {
        self.videos
            .iter()
            .find(|v| v.id == video_id)
            .ok_or_else(|| FetchError::NotFound {
                resource: "video",
                id: video_id.to_string(),
            })
    }
}

fn injected(field: Field) -> FetchError {
    FetchError::Api {
        status: 500,
        message: format!("injected {field:?} failure"),
    }
}

#[rocket::async_trait]
impl YouTubeApi for MockApi {
    async fn search(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> FetchResult<SearchPage> {
        self.searches
            .lock()
            .unwrap()
            .push((page_size, page_token.map(str::to_string)));
        self.enter(Field::Search, query).await?;

        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        if self.stall_at.is_some_and(|offset| start >= offset) {
            return Ok(SearchPage {
                items: Vec::new(),
                next_page_token: Some(start.to_string()),
            });
        }
        let end = (start + page_size as usize + self.extra_results).min(self.videos.len());
        let items = self.videos[start.min(end)..end]
            .iter()
            .map(MockVideo::search_item)
            .collect();

        Ok(SearchPage {
            items,
            next_page_token: (end < self.videos.len()).then(|| end.to_string()),
        })
    }

    async fn statistics(&self, video_id: &str) -> FetchResult<RawStatistics> {
        self.enter(Field::Statistics, video_id).await?;
        let video = self.video(video_id)?;
        Ok(RawStatistics {
            view_count: video.views,
            comment_count: video.comments,
        })
    }

    async fn duration(&self, video_id: &str) -> FetchResult<Option<String>> {
        self.enter(Field::Duration, video_id).await?;
        Ok(self.video(video_id)?.duration.clone())
    }

    async fn category_id(&self, video_id: &str) -> FetchResult<String> {
        self.enter(Field::CategoryId, video_id).await?;
        let video = self.video(video_id)?;
        Ok(format!("{CATEGORY_PREFIX}{}", video.id))
    }

    async fn category_title(&self, category_id: &str) -> FetchResult<String> {
        let video_id = category_id
            .strip_prefix(CATEGORY_PREFIX)
            .unwrap_or(category_id);
        self.enter(Field::CategoryTitle, video_id).await?;
        Ok(self.video(video_id)?.category.clone())
    }

    async fn recording_location(&self, video_id: &str) -> FetchResult<Option<String>> {
        self.enter(Field::Location, video_id).await?;
        Ok(self.video(video_id)?.location.clone())
    }
}

#[derive(Default)]
pub struct MockTranscripts {
    texts: HashMap<String, String>,
}

impl MockTranscripts {
    pub fn with(mut self, video_id: &str, text: &str) -> Self {
        self.texts.insert(video_id.to_string(), text.to_string());
        self
    }
}

#[rocket::async_trait]
impl TranscriptSource for MockTranscripts {
    async fn fetch_text(&self, video_id: &str) -> FetchResult<String> {
        self.texts
            .get(video_id)
            .cloned()
            .ok_or_else(|| FetchError::Transcript(format!("no captions for {video_id}")))
    }
}
