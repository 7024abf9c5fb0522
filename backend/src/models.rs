use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;
use std::path::PathBuf;

/// Placeholder stored in the location column when a video has no recording location.
pub const LOCATION_NOT_MENTIONED: &str = "location not mentioned";

/// Placeholder transcript text when captions could not be retrieved.
pub const NO_TRANSCRIPT: &str = "no transcripts found";

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub search_query: String,
    pub no_of_results: usize,
}

/// One item of a search results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub video_id: Option<String>,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<SearchResultItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoStatistics {
    pub view_count: u64,
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "TranscriptPair")]
pub enum TranscriptResult {
    Available(String),
    Unavailable(String),
}

impl TranscriptResult {
    pub fn text(&self) -> &str {
        match self {
            TranscriptResult::Available(text) | TranscriptResult::Unavailable(text) => text,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, TranscriptResult::Available(_))
    }
}

#[derive(Serialize)]
struct TranscriptPair {
    text: String,
    available: bool,
}

impl From<TranscriptResult> for TranscriptPair {
    fn from(result: TranscriptResult) -> Self {
        let available = result.is_available();
        let text = match result {
            TranscriptResult::Available(text) | TranscriptResult::Unavailable(text) => text,
        };
        TranscriptPair { text, available }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum LocationResult {
    Recorded(String),
    NotMentioned,
    Failed(String),
}

impl LocationResult {
    pub fn as_text(&self) -> &str {
        match self {
            LocationResult::Recorded(location) => location,
            LocationResult::NotMentioned => LOCATION_NOT_MENTIONED,
            LocationResult::Failed(reason) => reason,
        }
    }
}

impl From<LocationResult> for String {
    fn from(location: LocationResult) -> Self {
        location.as_text().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub video_url: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub tags: Vec<String>,
    pub topic: String,
    pub published_at: String,
    pub view_count: u64,
    pub comment_count: u64,
    pub duration: String,
    pub category: String,
    pub transcript: TranscriptResult,
    pub location: LocationResult,
}

/// A batch position: either an assembled record or the reason the item could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Complete(VideoRecord),
    Failed {
        video_id: Option<String>,
        topic: String,
        error: String,
    },
}

impl BatchEntry {
    pub fn record(&self) -> Option<&VideoRecord> {
        match self {
            BatchEntry::Complete(record) => Some(record),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistenceStatus {
    Written { path: PathBuf, rows: usize },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct HarvestReport {
    pub data: Vec<BatchEntry>,
    pub persistence: PersistenceStatus,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: Status, error: &str, message: String) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message,
            status: status.code,
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = Status::from_code(self.status).unwrap_or(Status::BadRequest);
        let json = serde_json::to_string(&self).unwrap_or_default();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
