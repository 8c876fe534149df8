//! Append-only CSV ledger of performance records.
//!
//! [`CsvLedger`] does the file I/O. [`LedgerHandle`] is the only path the
//! pipeline writes through: appends and scans are sent over a channel to a
//! single blocking writer thread that owns the file, so writes are serialized.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;
use vgate_core::{Channel, PerformanceRecord};

use crate::error::LedgerError;

/// Column order of the ledger file. External reporting depends on it.
pub const LEDGER_COLUMNS: [&str; 10] = [
    "content_id",
    "title",
    "channel",
    "viral_potential",
    "quality_score",
    "simulated_views",
    "simulated_engagement_rate",
    "simulated_revenue",
    "created_at",
    "performance_at",
];

const COMMAND_BUFFER: usize = 256;

#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file (and parent directories) with a
    /// header row if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be opened or written.
    pub fn append(&self, record: &PerformanceRecord) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let needs_header = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Full scan. A missing file is an empty ledger; rows that fail to parse
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<PerformanceRecord>, LedgerError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<PerformanceRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        row = index + 1,
                        error = %e,
                        "ledger: skipping malformed row"
                    );
                }
            }
        }
        Ok(records)
    }
}

enum Command {
    Append {
        record: Box<PerformanceRecord>,
        reply: oneshot::Sender<Result<PerformanceRecord, LedgerError>>,
    },
    ReadAll {
        reply: oneshot::Sender<Result<Vec<PerformanceRecord>, LedgerError>>,
    },
}

/// Cloneable handle to the single ledger writer.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<Command>,
    min_quality: f64,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Append { record, .. } => f
                .debug_struct("Append")
                .field("content_id", &record.content_id)
                .field("channel", &record.channel)
                .finish_non_exhaustive(),
            Command::ReadAll { .. } => f.write_str("ReadAll"),
        }
    }
}

impl LedgerHandle {
    /// Start the writer thread for `ledger`. Records with a quality score
    /// below `min_quality` are refused.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(ledger: CsvLedger, min_quality: f64) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::task::spawn_blocking(move || run_writer(&ledger, rx));
        Self { tx, min_quality }
    }

    #[must_use]
    pub fn min_quality(&self) -> f64 {
        self.min_quality
    }

    /// Append a record, returning the row as written.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BelowThreshold`] for records under the
    /// configured quality threshold, [`LedgerError::Closed`] if the writer has
    /// stopped, or the underlying I/O error.
    pub async fn try_append(
        &self,
        record: PerformanceRecord,
    ) -> Result<PerformanceRecord, LedgerError> {
        if record.quality_score < self.min_quality {
            return Err(LedgerError::BelowThreshold {
                score: record.quality_score,
                threshold: self.min_quality,
            });
        }

        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Append {
                record: Box::new(record),
                reply,
            })
            .await
            .map_err(|_| LedgerError::Closed)?;
        rx.await.map_err(|_| LedgerError::Closed)?
    }

    /// Best-effort append: failures are logged and swallowed. Returns whether
    /// the row was written.
    pub async fn append(&self, record: PerformanceRecord) -> bool {
        let content_id = record.content_id;
        let channel = record.channel;
        match self.try_append(record).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    %content_id,
                    %channel,
                    error = %e,
                    "ledger: write failed; continuing without persisting row"
                );
                false
            }
        }
    }

    /// Full scan, ordered after every append queued before it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the writer has stopped or the file cannot be read.
    pub async fn read_all(&self) -> Result<Vec<PerformanceRecord>, LedgerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::ReadAll { reply })
            .await
            .map_err(|_| LedgerError::Closed)?;
        rx.await.map_err(|_| LedgerError::Closed)?
    }
}

fn run_writer(ledger: &CsvLedger, mut rx: mpsc::Receiver<Command>) {
    let mut last_written = match ledger.read_all() {
        Ok(records) => latest_per_key(&records),
        Err(e) => {
            tracing::warn!(
                path = %ledger.path().display(),
                error = %e,
                "ledger: could not scan existing rows at startup"
            );
            HashMap::new()
        }
    };

    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Append { record, reply } => {
                let mut record = *record;
                let key = (record.content_id, record.channel);
                if let Some(previous) = last_written.get(&key) {
                    record.performance_at = next_unique(*previous, record.performance_at);
                }
                let result = ledger.append(&record).map(|()| {
                    last_written.insert(key, record.performance_at);
                    record
                });
                let _ = reply.send(result);
            }
            Command::ReadAll { reply } => {
                let _ = reply.send(ledger.read_all());
            }
        }
    }

    tracing::debug!(path = %ledger.path().display(), "ledger: writer stopped");
}

type RecordKey = (Uuid, Channel);

fn latest_per_key(records: &[PerformanceRecord]) -> HashMap<RecordKey, DateTime<Utc>> {
    let mut latest: HashMap<RecordKey, DateTime<Utc>> = HashMap::new();
    for record in records {
        latest
            .entry((record.content_id, record.channel))
            .and_modify(|at| *at = (*at).max(record.performance_at))
            .or_insert(record.performance_at);
    }
    latest
}

/// `candidate`, or one microsecond past `previous` if it would not sort after it.
fn next_unique(previous: DateTime<Utc>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    if candidate > previous {
        candidate
    } else {
        previous + Duration::microseconds(1)
    }
}
