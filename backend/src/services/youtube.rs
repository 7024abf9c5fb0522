use crate::error::{FetchError, FetchResult};
use crate::models::{SearchPage, SearchResultItem};
use crate::utils::parse_count;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Largest `maxResults` the search endpoint accepts.
pub const SEARCH_PAGE_CAP: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatistics {
    pub view_count: u64,
    pub comment_count: Option<u64>,
}

/// The subset of the YouTube Data API v3 the harvester reads.
#[rocket::async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> FetchResult<SearchPage>;

    async fn statistics(&self, video_id: &str) -> FetchResult<RawStatistics>;

    /// ISO-8601 duration, `None` when the API omits it.
    async fn duration(&self, video_id: &str) -> FetchResult<Option<String>>;

    async fn category_id(&self, video_id: &str) -> FetchResult<String>;

    async fn category_title(&self, category_id: &str) -> FetchResult<String>;

    async fn recording_location(&self, video_id: &str) -> FetchResult<Option<String>>;
}

// Documentation: https://developers.google.com/youtube/v3/docs

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SearchSnippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    tags: Option<Vec<String>>,
}

impl SearchItem {
    fn into_result_item(self) -> SearchResultItem {
        SearchResultItem {
            video_id: self.id.video_id.filter(|id| !id.is_empty()),
            title: self.snippet.title,
            description: self.snippet.description,
            channel_title: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            tags: self.snippet.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    statistics: Option<WireStatistics>,
    content_details: Option<WireContentDetails>,
    snippet: Option<WireVideoSnippet>,
    recording_details: Option<WireRecordingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStatistics {
    view_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVideoSnippet {
    category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecordingDetails {
    location_description: Option<String>,
    location: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CategoryItem {
    snippet: CategorySnippet,
}

#[derive(Debug, Deserialize)]
struct CategorySnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Prefers the message of Google's error envelope, falling back to the raw body.
fn api_error(status: u16, body: String) -> FetchError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    FetchError::Api { status, message }
}

impl WireRecordingDetails {
    fn into_location(self) -> Option<String> {
        if let Some(description) = self.location_description.filter(|d| !d.trim().is_empty()) {
            return Some(description);
        }
        match self.location {
            Some(GeoPoint {
                latitude: Some(lat),
                longitude: Some(lon),
            }) => Some(format!("{lat},{lon}")),
            _ => None,
        }
    }
}

impl WireStatistics {
    fn into_raw(self) -> FetchResult<RawStatistics> {
        let views = self
            .view_count
            .ok_or(FetchError::MissingField("statistics.viewCount"))?;
        let view_count = parse_count(&views).ok_or(FetchError::InvalidNumber {
            field: "statistics.viewCount",
            value: views,
        })?;
        let comment_count = match self.comment_count {
            Some(comments) => Some(parse_count(&comments).ok_or(FetchError::InvalidNumber {
                field: "statistics.commentCount",
                value: comments,
            })?),
            None => None,
        };
        Ok(RawStatistics {
            view_count,
            comment_count,
        })
    }
}

pub struct YouTubeClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl YouTubeClient {
    pub fn new(
        api_key: String,
        base_url: Url,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(YouTubeClient {
            http,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> FetchResult<ListResponse<T>> {
        debug!("GET {resource} {params:?}");
        let response = self
            .http
            .get(self.endpoint(resource))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        Ok(response.json::<ListResponse<T>>().await?)
    }

    async fn video(&self, video_id: &str, part: &str) -> FetchResult<VideoItem> {
        self.get_list::<VideoItem>("videos", &[("part", part), ("id", video_id)])
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound {
                resource: "video",
                id: video_id.to_string(),
            })
    }
}

#[rocket::async_trait]
impl YouTubeApi for YouTubeClient {
    async fn search(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> FetchResult<SearchPage> {
        let max_results = page_size.min(SEARCH_PAGE_CAP).to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("q", query),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.get_list::<SearchItem>("search", &params).await?;
        Ok(SearchPage {
            items: response
                .items
                .into_iter()
                .map(SearchItem::into_result_item)
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn statistics(&self, video_id: &str) -> FetchResult<RawStatistics> {
        self.video(video_id, "statistics")
            .await?
            .statistics
            .ok_or(FetchError::MissingField("statistics"))?
            .into_raw()
    }

    async fn duration(&self, video_id: &str) -> FetchResult<Option<String>> {
        Ok(self
            .video(video_id, "contentDetails")
            .await?
            .content_details
            .and_then(|details| details.duration))
    }

    async fn category_id(&self, video_id: &str) -> FetchResult<String> {
        self.video(video_id, "snippet")
            .await?
            .snippet
            .and_then(|snippet| snippet.category_id)
            .filter(|id| !id.is_empty())
            .ok_or(FetchError::MissingField("snippet.categoryId"))
    }

    async fn category_title(&self, category_id: &str) -> FetchResult<String> {
        self.get_list::<CategoryItem>("videoCategories", &[("part", "snippet"), ("id", category_id)])
            .await?
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet.title)
            .ok_or_else(|| FetchError::NotFound {
                resource: "video category",
                id: category_id.to_string(),
            })
    }

    async fn recording_location(&self, video_id: &str) -> FetchResult<Option<String>> {
        Ok(self
            .video(video_id, "recordingDetails")
            .await?
            .recording_details
            .and_then(WireRecordingDetails::into_location))
    }
}
