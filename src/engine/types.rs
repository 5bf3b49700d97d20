//! Engine types
//!
//! Configuration, statistics and run summaries for the sync engine.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Phases a stream moves through while it syncs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// Queued, waiting for a concurrency slot
    Idle,
    /// Resolving the starting bookmark and request path
    Discovering,
    Paginating,
    Extracting,
    Normalizing,
    /// Handing records to the sink and advancing the bookmark
    Emitting,
    Done,
    Failed,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Paginating => "paginating",
            Self::Extracting => "extracting",
            Self::Normalizing => "normalizing",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Lower bound used when a stream has no bookmark
    pub start_date: Option<DateTime<Utc>>,
    /// Upper bound sent as `to`
    pub end_date: Option<DateTime<Utc>>,
    /// Records per stream invocation before stopping (0 = unlimited)
    pub max_records_per_stream: usize,
    /// Abort the run on the first failing top-level stream
    pub fail_fast: bool,
    /// Top-level streams synced at the same time
    pub max_concurrent_streams: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            max_records_per_stream: 0,
            fail_fast: false,
            max_concurrent_streams: 1,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Set the end date
    #[must_use]
    pub fn with_end_date(mut self, end_date: Option<DateTime<Utc>>) -> Self {
        self.end_date = end_date;
        self
    }

    /// Set max records per stream
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records_per_stream = max;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set how many top-level streams run at once
    #[must_use]
    pub fn with_max_concurrent_streams(mut self, max: usize) -> Self {
        self.max_concurrent_streams = max.max(1);
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records emitted, by stream
    pub records: BTreeMap<String, usize>,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// STATE messages emitted after a page
    pub checkpoints: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record of a stream
    pub fn add_record(&mut self, stream: &str) {
        *self.records.entry(stream.to_string()).or_default() += 1;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a checkpoint
    pub fn add_checkpoint(&mut self) {
        self.checkpoints += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> usize {
        self.records.get(stream).copied().unwrap_or_default()
    }

    /// Records emitted across all streams
    pub fn records_synced(&self) -> usize {
        self.records.values().sum()
    }
}

/// Outcome of one top-level stream, including its children
#[derive(Debug, Clone)]
pub struct StreamSummary {
    /// Top-level stream name
    pub stream: String,
    /// Work done before finishing or failing
    pub stats: SyncStats,
    /// Failure cause, if the stream did not complete
    pub error: Option<String>,
}

impl StreamSummary {
    /// Whether the stream completed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// One entry per top-level stream, in catalog order
    pub streams: Vec<StreamSummary>,
}

impl SyncSummary {
    /// Whether every stream completed
    pub fn is_success(&self) -> bool {
        self.streams.iter().all(StreamSummary::is_success)
    }

    /// Streams that failed
    pub fn failures(&self) -> impl Iterator<Item = &StreamSummary> {
        self.streams.iter().filter(|s| !s.is_success())
    }

    /// Records emitted across the run
    pub fn records_synced(&self) -> usize {
        self.streams.iter().map(|s| s.stats.records_synced()).sum()
    }
}
