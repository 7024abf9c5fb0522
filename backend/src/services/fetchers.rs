use crate::error::{FetchError, FetchResult};
use crate::models::{LocationResult, TranscriptResult, VideoStatistics, NO_TRANSCRIPT};
use crate::services::transcript::TranscriptSource;
use crate::services::youtube::YouTubeApi;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Budget for one collaborator call, not counting the wait for a request slot.
    pub timeout: Duration,
    /// Extra attempts for statistics, duration and category lookups.
    pub retries: u32,
    pub retry_delay: Duration,
    pub max_concurrent_items: usize,
    pub page_cap: u32,
    /// Collaborator calls in flight across all requests sharing these settings.
    pub in_flight: Arc<Semaphore>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout: Duration::from_secs(15),
            retries: 0,
            retry_delay: Duration::from_millis(250),
            max_concurrent_items: 10,
            page_cap: crate::services::youtube::SEARCH_PAGE_CAP,
            in_flight: Arc::new(Semaphore::new(
                crate::config::DEFAULT_MAX_CONCURRENT_REQUESTS,
            )),
        }
    }
}

/// Waits for a request slot, then runs `call` under the fetch timeout.
pub async fn timed_call<T, F>(settings: &FetchSettings, call: F) -> FetchResult<T>
where
    F: Future<Output = FetchResult<T>>,
{
    let _permit = settings
        .in_flight
        .acquire()
        .await
        .map_err(|_| FetchError::LimiterClosed)?;
    tokio::time::timeout(settings.timeout, call)
        .await
        .map_err(|_| FetchError::Timeout(settings.timeout))?
}

async fn with_retry<T, F, Fut>(settings: &FetchSettings, label: &str, mut call: F) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempt = 0;
    loop {
        match timed_call(settings, call()).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < settings.retries => {
                attempt += 1;
                debug!("{label} failed ({e}), retry {attempt}/{}", settings.retries);
                tokio::time::sleep(settings.retry_delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn fetch_statistics(
    api: &dyn YouTubeApi,
    settings: &FetchSettings,
    video_id: &str,
) -> FetchResult<VideoStatistics> {
    let raw = with_retry(settings, "statistics", || api.statistics(video_id)).await?;
    Ok(VideoStatistics {
        view_count: raw.view_count,
        // Comments may be disabled, in which case the API omits the count.
        comment_count: raw.comment_count.unwrap_or(0),
    })
}

pub async fn fetch_duration(
    api: &dyn YouTubeApi,
    settings: &FetchSettings,
    video_id: &str,
) -> FetchResult<String> {
    let duration = with_retry(settings, "duration", || api.duration(video_id)).await?;
    Ok(duration.unwrap_or_default())
}

pub async fn fetch_category(
    api: &dyn YouTubeApi,
    settings: &FetchSettings,
    video_id: &str,
) -> FetchResult<String> {
    let category_id = with_retry(settings, "category id", || api.category_id(video_id)).await?;
    with_retry(settings, "category title", || api.category_title(&category_id)).await
}

pub async fn fetch_transcript(
    source: &dyn TranscriptSource,
    settings: &FetchSettings,
    video_id: &str,
) -> TranscriptResult {
    match timed_call(settings, source.fetch_text(video_id)).await {
        Ok(text) if !text.is_empty() => TranscriptResult::Available(text),
        Ok(_) => TranscriptResult::Unavailable(NO_TRANSCRIPT.to_string()),
        Err(e) => {
            debug!("No transcript for video ID {video_id}: {e}");
            TranscriptResult::Unavailable(NO_TRANSCRIPT.to_string())
        }
    }
}

pub async fn fetch_location(
    api: &dyn YouTubeApi,
    settings: &FetchSettings,
    video_id: &str,
) -> LocationResult {
    match timed_call(settings, api.recording_location(video_id)).await {
        Ok(Some(location)) => LocationResult::Recorded(location),
        Ok(None) => LocationResult::NotMentioned,
        Err(e) => {
            warn!("Failed to fetch recording location for video ID {video_id}: {e}");
            LocationResult::Failed(format!("location lookup failed: {e}"))
        }
    }
}
