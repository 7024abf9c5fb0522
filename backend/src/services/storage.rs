use crate::error::SinkError;
use crate::models::BatchEntry;
use crate::utils::video_url;
use csv::WriterBuilder;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column order of the output file. Downstream consumers rely on it.
pub const COLUMNS: [&str; 13] = [
    "video_url",
    "title",
    "description",
    "channel_title",
    "tags",
    "topic",
    "published_at",
    "view_count",
    "comment_count",
    "duration",
    "category",
    "transcript",
    "location",
];

/// Title written for rows of items that could not be assembled.
pub const FAILED_ROW_MARKER: &str = "ERROR";

type Row = [String; 13];

/// Appends batches to one CSV file. Clones share the file and its write lock, so
/// concurrent requests never interleave rows or race on the header.
#[derive(Clone)]
pub struct CsvSink {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row per entry, writing the header first if the file is new or empty.
    pub async fn append(&self, entries: &[BatchEntry]) -> Result<usize, SinkError> {
        let rows: Vec<Row> = entries.iter().map(entry_row).collect();
        let path = self.path.clone();
        // The guard moves into the blocking task so it is held until the file is flushed,
        // even if the caller stops waiting.
        let guard = self.lock.clone().lock_owned().await;

        tokio::task::spawn_blocking(move || {
            let written = write_rows(&path, &rows);
            drop(guard);
            written
        })
        .await?
    }
}

fn write_rows(path: &Path, rows: &[Row]) -> Result<usize, SinkError> {
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if needs_header {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(
        "Appended {} rows to {}{}",
        rows.len(),
        path.display(),
        if needs_header { " (new file)" } else { "" }
    );
    Ok(rows.len())
}

fn entry_row(entry: &BatchEntry) -> Row {
    match entry {
        BatchEntry::Complete(record) => [
            record.video_url.clone(),
            record.title.clone(),
            record.description.clone(),
            record.channel_title.clone(),
            record.tags.join(", "),
            record.topic.clone(),
            record.published_at.clone(),
            record.view_count.to_string(),
            record.comment_count.to_string(),
            record.duration.clone(),
            record.category.clone(),
            record.transcript.text().to_string(),
            record.location.as_text().to_string(),
        ],
        BatchEntry::Failed {
            video_id,
            topic,
            error,
        } => {
            let mut row: Row = Default::default();
            row[0] = video_id.as_deref().map(video_url).unwrap_or_default();
            row[1] = FAILED_ROW_MARKER.to_string();
            row[2] = error.clone();
            row[5] = topic.clone();
            row
        }
    }
}
