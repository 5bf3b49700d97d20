//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - walks the stream graph, paginating each stream and
//!   recursing into child streams once per parent record
//! - `SyncConfig` - Configuration for sync operations
//! - `SyncStats` / `SyncSummary` - what a run did

mod types;

pub use types::{StreamPhase, StreamSummary, SyncConfig, SyncStats, SyncSummary};

use crate::decode::normalize;
use crate::discovery::DeselectedFields;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::output::{MessageSink, SingerMessage};
use crate::pagination::{NextPageLinkPaginator, PaginationState, Paginator};
use crate::partition::describe_context;
use crate::state::{compare_bookmarks, IncrementalParams, StateManager};
use crate::streams::{StreamCatalog, StreamDefinition};
use crate::template;
use crate::types::{ContextMap, JsonValue, Record};
use chrono::Utc;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client, shared by every stream
    client: Arc<HttpClient>,
    /// Stream definitions and their graph
    catalog: Arc<StreamCatalog>,
    /// State manager
    state: StateManager,
    /// Where messages go
    sink: Arc<dyn MessageSink>,
    /// Cursor extraction
    paginator: NextPageLinkPaginator,
    /// Sync configuration
    config: SyncConfig,
    /// Streams whose records are emitted
    selected: HashSet<String>,
    /// Fields dropped from emitted records, per stream
    deselected: DeselectedFields,
}

impl SyncEngine {
    /// Create a new sync engine selecting the streams enabled by default
    pub fn new(
        client: Arc<HttpClient>,
        catalog: Arc<StreamCatalog>,
        state: StateManager,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        let selected = catalog
            .iter()
            .filter(|s| s.selected_by_default())
            .map(|s| s.name().to_string())
            .collect();

        Self {
            client,
            catalog,
            state,
            sink,
            paginator: NextPageLinkPaginator::new(),
            config: SyncConfig::default(),
            selected,
            deselected: DeselectedFields::new(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the set of selected streams
    #[must_use]
    pub fn with_selection<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = streams.into_iter().map(Into::into).collect();
        self
    }

    /// Drop fields from the records and schemas of some streams
    #[must_use]
    pub fn with_field_selection(mut self, deselected: DeselectedFields) -> Self {
        self.deselected = deselected;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get the sync configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether a stream's records are emitted
    pub fn is_selected(&self, stream: &str) -> bool {
        self.selected.contains(stream)
    }

    /// Whether a stream has to be fetched: it is selected itself, or one of
    /// its descendants is and needs its records as contexts
    fn is_needed(&self, stream: &str) -> bool {
        self.is_selected(stream)
            || self
                .catalog
                .graph()
                .descendants(stream)
                .into_iter()
                .any(|d| self.is_selected(d))
    }

    /// Sync every needed top-level stream, then emit the final STATE.
    ///
    /// A failing stream is recorded in the summary and its siblings carry
    /// on, unless `fail_fast` is set or the API rejected the credentials.
    pub async fn run(&self) -> Result<SyncSummary> {
        let started = Instant::now();
        let roots: Vec<&StreamDefinition> = self
            .catalog
            .roots()
            .filter(|s| self.is_needed(s.name()))
            .collect();

        info!(
            streams = roots.len(),
            concurrency = self.config.max_concurrent_streams,
            "Starting sync"
        );

        for root in &roots {
            debug!(stream = root.name(), phase = %StreamPhase::Idle);
        }

        let mut outcomes = futures::stream::iter(roots)
            .map(|root| self.sync_root(root))
            .buffer_unordered(self.config.max_concurrent_streams.max(1));

        let mut summary = SyncSummary::default();
        let mut fatal = None;
        while let Some((stream_summary, err)) = outcomes.next().await {
            summary.streams.push(stream_summary);
            if let Some(e) = err {
                if self.config.fail_fast || matches!(e, Error::Auth { .. }) {
                    fatal = Some(e);
                    break;
                }
            }
        }
        drop(outcomes);

        let order: Vec<&str> = self.catalog.names().collect();
        summary
            .streams
            .sort_by_key(|s| order.iter().position(|n| *n == s.stream));

        self.emit_state().await?;
        self.sink.flush().await?;

        if let Some(e) = fatal {
            return Err(e);
        }

        info!(
            records = summary.records_synced(),
            failed = summary.failures().count(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Sync complete"
        );
        Ok(summary)
    }

    /// Sync one top-level stream and everything below it
    async fn sync_root(&self, root: &StreamDefinition) -> (StreamSummary, Option<Error>) {
        let started = Instant::now();
        let mut stats = SyncStats::new();

        let result = match self.emit_schemas(root).await {
            Ok(()) => self.sync_into(root, None, &mut stats).await,
            Err(e) => Err(e),
        };
        stats.set_duration(started.elapsed().as_millis() as u64);

        let err = match result {
            Ok(()) => {
                info!(
                    stream = root.name(),
                    records = stats.records_synced(),
                    pages = stats.pages_fetched,
                    "Stream complete"
                );
                None
            }
            Err(e) => {
                error!(stream = root.name(), error = %e, "Stream failed");
                Some(e)
            }
        };

        let summary = StreamSummary {
            stream: root.name().to_string(),
            stats,
            error: err.as_ref().map(ToString::to_string),
        };
        (summary, err)
    }

    /// SCHEMA messages for a root and its selected descendants
    async fn emit_schemas(&self, root: &StreamDefinition) -> Result<()> {
        let mut names = vec![root.name()];
        names.extend(self.catalog.graph().descendants(root.name()));

        for name in names.into_iter().filter(|n| self.is_selected(n)) {
            let stream = self.catalog.require(name)?;
            let message = match self.deselected.get(name) {
                Some(fields) => SingerMessage::schema_excluding(stream, fields),
                None => SingerMessage::schema(stream),
            };
            self.sink.write(message).await?;
        }
        Ok(())
    }

    /// Sync a stream and its needed children for one context.
    ///
    /// Top-level streams pass `None`; child streams pass the context built
    /// from their parent record.
    fn sync_into<'a>(
        &'a self,
        stream: &'a StreamDefinition,
        context: Option<&'a ContextMap>,
        stats: &'a mut SyncStats,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let name = stream.name();
            let result = self.paginate(stream, context, stats).await;
            let phase = if result.is_ok() {
                StreamPhase::Done
            } else {
                StreamPhase::Failed
            };
            debug!(stream = name, %phase);
            result
        }
        .boxed()
    }

    async fn paginate(
        &self,
        stream: &StreamDefinition,
        context: Option<&ContextMap>,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let name = stream.name();
        let emit = self.is_selected(name);
        // A parent walked only for its children leaves its bookmark alone
        let checkpointed = emit && stream.is_bookmarked();
        debug!(
            stream = name,
            phase = %StreamPhase::Discovering,
            context = %context.map(describe_context).unwrap_or_default()
        );

        let partition = stream.state_partitioning().partition_key(context);
        let bookmark = if stream.is_bookmarked() {
            self.state.get_bookmark(name, partition).await
        } else {
            None
        };
        let incremental = IncrementalParams::new(
            bookmark.as_ref(),
            self.config.start_date,
            self.config.end_date,
            stream.replication_key().is_some(),
            Utc::now(),
        )?;

        let empty = ContextMap::new();
        let path = template::render(stream.path(), context.unwrap_or(&empty))?;

        info!(
            stream = name,
            path = %path,
            from = incremental.from,
            starting_point = %incremental.starting_point,
            "Syncing stream"
        );

        let children: Vec<&StreamDefinition> = self
            .catalog
            .children(name)
            .filter(|c| self.is_needed(c.name()))
            .collect();
        let limit = self.config.max_records_per_stream;
        let mut emitted = 0usize;
        let mut pagination = PaginationState::new();

        while let PaginationState::HasMore { cursor } = pagination {
            debug!(stream = name, phase = %StreamPhase::Paginating, ?cursor);
            let mut request = RequestConfig::new().queries(incremental.to_query());
            if let Some(page) = cursor {
                request = request.queries(page.to_query());
            }
            let body = self.client.get_json(&path, request).await?;
            stats.add_page();

            let time_extracted = Utc::now();
            let mut page_max: Option<JsonValue> = None;
            let mut page_count = 0usize;
            let mut limit_reached = false;
            debug!(stream = name, phase = %StreamPhase::Extracting);

            for record in stream.decoder().decode_page(&body) {
                trace!(stream = name, phase = %StreamPhase::Normalizing);
                let record = normalize(record?, name, stream.datetime_fields())?;
                page_count += 1;

                if checkpointed {
                    track_max(&mut page_max, stream.replication_key(), &record);
                }

                let contexts = children
                    .iter()
                    .map(|child| {
                        let link = child.parent().ok_or_else(|| {
                            Error::partition(child.name(), "child stream has no parent link")
                        })?;
                        Ok((*child, link.mapper.child_context(name, &record)?))
                    })
                    .collect::<Result<Vec<_>>>()?;

                trace!(stream = name, phase = %StreamPhase::Emitting);
                if emit {
                    let record = self.project(name, record);
                    self.sink
                        .write(SingerMessage::record(name, record, time_extracted))
                        .await?;
                    stats.add_record(name);
                }

                for (child, child_context) in &contexts {
                    self.sync_into(child, Some(child_context), stats).await?;
                }

                emitted += 1;
                if limit > 0 && emitted >= limit {
                    limit_reached = true;
                    break;
                }
            }

            if checkpointed {
                if let (Some(value), Some(key)) = (page_max, stream.replication_key()) {
                    if !self.state.commit_bookmark(name, partition, key, value).await {
                        trace!(stream = name, "Bookmark unchanged");
                    }
                }
                self.emit_state().await?;
                stats.add_checkpoint();
            }

            if limit_reached {
                info!(stream = name, limit, "Record limit reached");
                break;
            }

            pagination.advance(self.paginator.next_page(&body, page_count)?)?;
        }

        Ok(())
    }

    /// Remove the stream's deselected fields from a record
    fn project(&self, stream: &str, mut record: Record) -> Record {
        if let Some(fields) = self.deselected.get(stream) {
            for field in fields {
                record.remove(field);
            }
        }
        record
    }

    async fn emit_state(&self) -> Result<()> {
        let value = self.state.to_value().await?;
        self.sink.write(SingerMessage::state(value)).await
    }
}

/// Keep the largest replication key value seen on the current page
fn track_max(current: &mut Option<JsonValue>, key: Option<&str>, record: &Record) {
    let Some(value) = key.and_then(|k| record.get(k)).filter(|v| !v.is_null()) else {
        return;
    };
    let is_greater = current
        .as_ref()
        .map_or(true, |max| compare_bookmarks(value, max) == Ordering::Greater);
    if is_greater {
        *current = Some(value.clone());
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
