use crate::error::HarvestError;
use crate::models::{HarvestReport, PersistenceStatus};
use crate::services::crawler::crawl_search_results;
use crate::services::fetchers::FetchSettings;
use crate::services::storage::CsvSink;
use crate::services::transcript::TranscriptSource;
use crate::services::youtube::YouTubeApi;
use log::{error, info};
use std::sync::Arc;

/// Collaborators and limits shared by every harvest request.
pub struct Harvester {
    pub api: Arc<dyn YouTubeApi>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub settings: FetchSettings,
}

impl Harvester {
    pub fn new(
        api: Arc<dyn YouTubeApi>,
        transcripts: Arc<dyn TranscriptSource>,
        settings: FetchSettings,
    ) -> Self {
        Harvester {
            api,
            transcripts,
            settings,
        }
    }
}

/// Searches for `query`, enriches up to `count` results and appends them to the sink.
///
/// Only a failing search call aborts the request. Item failures stay in the returned
/// batch and a write failure is reported in [`HarvestReport::persistence`].
pub async fn harvest_videos(
    harvester: &Harvester,
    sink: &CsvSink,
    query: &str,
    count: usize,
) -> Result<HarvestReport, HarvestError> {
    if count == 0 {
        return Err(HarvestError::InvalidCount(count));
    }

    let data = crawl_search_results(harvester, query, count)
        .await
        .map_err(|e| {
            error!("Search for '{query}' failed: {e}");
            HarvestError::Search(e)
        })?;

    let persistence = match sink.append(&data).await {
        Ok(rows) => PersistenceStatus::Written {
            path: sink.path().to_path_buf(),
            rows,
        },
        Err(e) => {
            error!("Failed to persist {} videos to {}: {e}", data.len(), sink.path().display());
            PersistenceStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    info!("Harvested {} of {count} requested videos for '{query}'", data.len());
    Ok(HarvestReport { data, persistence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::services::mock::{Field, MockApi, MockTranscripts};
    use std::time::Duration;

    fn harvester(api: MockApi) -> Harvester {
        Harvester::new(
            Arc::new(api),
            Arc::new(MockTranscripts::default()),
            FetchSettings::default(),
        )
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("videos.csv"));

        let err = harvest_videos(&harvester(MockApi::corpus(3)), &sink, "q", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidCount(0)));
        assert!(!sink.path().exists());
    }

    #[tokio::test]
    async fn search_failure_is_request_level() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("videos.csv"));
        let api = MockApi::corpus(3).failing(Field::Search, "q");

        let err = harvest_videos(&harvester(api), &sink, "q", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::Search(_)));
        assert!(!sink.path().exists());
    }

    #[tokio::test]
    async fn search_timeout_is_request_level() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("videos.csv"));
        let api = MockApi::corpus(3).slow(Field::Search, "q", Duration::from_secs(5));
        let harvester = Harvester::new(
            Arc::new(api),
            Arc::new(MockTranscripts::default()),
            FetchSettings {
                timeout: Duration::from_millis(100),
                ..FetchSettings::default()
            },
        );

        let err = harvest_videos(&harvester, &sink, "q", 2).await.unwrap_err();
        assert!(matches!(err, HarvestError::Search(FetchError::Timeout(_))));
        assert!(!sink.path().exists());
    }

    #[tokio::test]
    async fn persistence_failure_keeps_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());

        let report = harvest_videos(&harvester(MockApi::corpus(3)), &sink, "q", 3)
            .await
            .unwrap();
        assert_eq!(report.data.len(), 3);
        assert!(matches!(report.persistence, PersistenceStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn written_rows_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        let sink = CsvSink::new(&path);

        let report = harvest_videos(&harvester(MockApi::corpus(3)), &sink, "q", 2)
            .await
            .unwrap();
        assert_eq!(
            report.persistence,
            PersistenceStatus::Written { path, rows: 2 }
        );
    }
}
