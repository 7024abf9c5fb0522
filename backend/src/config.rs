use crate::services::fetchers::FetchSettings;
use crate::services::harvest_service::Harvester;
use crate::services::storage::CsvSink;
use crate::services::transcript::YtTranscriptSource;
use crate::services::youtube::{YouTubeClient, SEARCH_PAGE_CAP};
use crate::AppState;
use anyhow::{anyhow, Context, Result};
use env_logger::Builder;
use log::{info, LevelFilter};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_OUTPUT_CSV: &str = "videos.csv";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;
pub const DEFAULT_MAX_CONCURRENT_ITEMS: usize = 10;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 250;

/// Process-wide settings, built once at startup and handed to the services explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube_api_key: String,
    pub youtube_api_base_url: Url,
    pub output_csv: PathBuf,
    pub fetch_timeout: Duration,
    pub max_concurrent_requests: usize,
    pub max_concurrent_items: usize,
    pub fetch_retries: u32,
    pub retry_delay: Duration,
    pub transcript_languages: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let youtube_api_key = lookup("YOUTUBE_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("YOUTUBE_API_KEY environment variable must be set"))?;

        let base_url = lookup("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let youtube_api_base_url = Url::parse(&base_url)
            .with_context(|| format!("invalid YOUTUBE_API_BASE_URL: {base_url}"))?;

        let output_csv = lookup("OUTPUT_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_CSV));

        let fetch_timeout = Duration::from_secs(parse_or(
            &lookup,
            "FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?);
        let max_concurrent_requests: usize = parse_or(
            &lookup,
            "MAX_CONCURRENT_REQUESTS",
            DEFAULT_MAX_CONCURRENT_REQUESTS,
        )?;
        let max_concurrent_items: usize =
            parse_or(&lookup, "MAX_CONCURRENT_ITEMS", DEFAULT_MAX_CONCURRENT_ITEMS)?;
        if max_concurrent_requests == 0 || max_concurrent_items == 0 {
            return Err(anyhow!("concurrency limits must be at least 1"));
        }

        let fetch_retries = parse_or(&lookup, "FETCH_RETRIES", 0)?;
        let retry_delay =
            Duration::from_millis(parse_or(&lookup, "RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?);

        let transcript_languages: Vec<String> = lookup("TRANSCRIPT_LANGUAGES")
            .unwrap_or_else(|| "en".to_string())
            .split(',')
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect();

        Ok(AppConfig {
            youtube_api_key,
            youtube_api_base_url,
            output_csv,
            fetch_timeout,
            max_concurrent_requests,
            max_concurrent_items,
            fetch_retries,
            retry_delay,
            transcript_languages,
        })
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: self.fetch_timeout,
            retries: self.fetch_retries,
            retry_delay: self.retry_delay,
            max_concurrent_items: self.max_concurrent_items,
            page_cap: SEARCH_PAGE_CAP,
            in_flight: Arc::new(Semaphore::new(self.max_concurrent_requests)),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {key} ({raw}): {e}")),
        None => Ok(default),
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting video harvest backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_app_state(config: &AppConfig) -> Result<AppState> {
    info!(
        "Using YouTube API at {} with {} concurrent requests",
        config.youtube_api_base_url, config.max_concurrent_requests
    );

    let api = YouTubeClient::new(
        config.youtube_api_key.clone(),
        config.youtube_api_base_url.clone(),
        config.fetch_timeout,
    )?;
    let transcripts = YtTranscriptSource::new(config.transcript_languages.clone())?;

    info!("Writing harvested videos to {}", config.output_csv.display());

    Ok(AppState {
        harvester: Harvester::new(Arc::new(api), Arc::new(transcripts), config.fetch_settings()),
        sink: CsvSink::new(config.output_csv.clone()),
    })
}
