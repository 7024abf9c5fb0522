use std::time::Duration;
use thiserror::Error;

/// A single collaborator call failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no {resource} found for id {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("response is missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transcript unavailable: {0}")]
    Transcript(String),

    #[error("request limiter closed")]
    LimiterClosed,
}

/// Failures surfaced by one harvest request.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("requested count must be positive, got {0}")]
    InvalidCount(usize),

    #[error("search request failed: {0}")]
    Search(#[source] FetchError),
}

/// Writing a batch to the output file failed. Reported alongside the batch, never instead of it.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write output: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output writer stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type FetchResult<T> = Result<T, FetchError>;
