use crate::models::{BatchEntry, SearchResultItem, VideoRecord};
use crate::services::fetchers::{
    fetch_category, fetch_duration, fetch_location, fetch_statistics, fetch_transcript,
};
use crate::services::harvest_service::Harvester;
use crate::utils::{merge_tags, video_url};
use futures::stream::{self, StreamExt};
use log::{debug, warn};

/// Builds the batch entry for one search result.
///
/// The five field lookups run concurrently and are all awaited before the record is built.
/// A failed statistics, duration or category lookup turns the item into a
/// [`BatchEntry::Failed`]; transcript and location never fail the item.
pub async fn assemble_record(
    harvester: &Harvester,
    topic: &str,
    item: SearchResultItem,
) -> BatchEntry {
    let Some(video_id) = item.video_id.clone() else {
        warn!("Skipping search result without video id: {:?}", item.title);
        return BatchEntry::Failed {
            video_id: None,
            topic: topic.to_string(),
            error: "search result has no video id".to_string(),
        };
    };

    let tags = merge_tags(item.tags.as_deref(), &item.description);

    let api = harvester.api.as_ref();
    let settings = &harvester.settings;
    let (statistics, duration, category, transcript, location) = tokio::join!(
        fetch_statistics(api, settings, &video_id),
        fetch_duration(api, settings, &video_id),
        fetch_category(api, settings, &video_id),
        fetch_transcript(harvester.transcripts.as_ref(), settings, &video_id),
        fetch_location(api, settings, &video_id),
    );

    match (statistics, duration, category) {
        (Ok(statistics), Ok(duration), Ok(category)) => {
            debug!("Assembled video {video_id}: {}", item.title);
            BatchEntry::Complete(VideoRecord {
                video_url: video_url(&video_id),
                title: item.title,
                description: item.description,
                channel_title: item.channel_title,
                tags,
                topic: topic.to_string(),
                published_at: item.published_at,
                view_count: statistics.view_count,
                comment_count: statistics.comment_count,
                duration,
                category,
                transcript,
                location,
            })
        }
        (statistics, duration, category) => {
            let errors: Vec<String> = [
                statistics.err().map(|e| format!("statistics: {e}")),
                duration.err().map(|e| format!("duration: {e}")),
                category.err().map(|e| format!("category: {e}")),
            ]
            .into_iter()
            .flatten()
            .collect();
            let error = errors.join("; ");
            warn!("Failed to assemble video {video_id}: {error}");
            BatchEntry::Failed {
                video_id: Some(video_id),
                topic: topic.to_string(),
                error,
            }
        }
    }
}

/// Assembles a whole page, several items at a time, keeping the page's item order.
pub async fn assemble_page(
    harvester: &Harvester,
    topic: &str,
    items: Vec<SearchResultItem>,
) -> Vec<BatchEntry> {
    stream::iter(items)
        .map(|item| assemble_record(harvester, topic, item))
        .buffered(harvester.settings.max_concurrent_items.max(1))
        .collect()
        .await
}
