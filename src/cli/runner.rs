//! CLI runner - executes commands

use crate::cli::commands::{AboutFormat, Cli, Mode, TestMode};
use crate::config::{TapConfig, SETTINGS};
use crate::discovery::{Catalog, DeselectedFields};
use crate::engine::{SyncEngine, SyncSummary};
use crate::error::{Error, Result};
use crate::output::{JsonLinesSink, MessageSink, SingerMessage};
use crate::state::StateManager;
use crate::streams::StreamCatalog;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Capabilities advertised by `--about`
pub const CAPABILITIES: &[&str] = &["catalog", "state", "discover", "about"];

/// CLI runner
pub struct Runner {
    cli: Cli,
    sink: Arc<dyn MessageSink>,
}

impl Runner {
    /// Create a runner writing Singer messages to stdout
    pub fn new(cli: Cli) -> Self {
        Self::with_sink(cli, Arc::new(JsonLinesSink::stdout()))
    }

    /// Create a runner writing Singer messages to `sink`
    pub fn with_sink(cli: Cli, sink: Arc<dyn MessageSink>) -> Self {
        Self { cli, sink }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.mode() {
            Mode::About(format) => {
                println!("{}", self.about(format)?);
                Ok(())
            }
            Mode::Discover => {
                println!("{}", self.discover()?);
                Ok(())
            }
            Mode::Test(TestMode::Schema) => self.print_schemas().await,
            Mode::Test(TestMode::All) => {
                info!("Running connection test, one record per stream");
                self.sync(Some(1)).await.map(|_| ())
            }
            Mode::Sync => self.sync(None).await.map(|_| ()),
        }
    }

    /// Tap metadata
    pub fn about(&self, format: AboutFormat) -> Result<String> {
        match format {
            AboutFormat::Json => Ok(serde_json::to_string_pretty(&about_document())?),
            AboutFormat::Markdown => Ok(about_markdown()),
        }
    }

    /// Catalog document for `--discover`.
    ///
    /// Config is validated first so a broken setup fails here rather than
    /// on the first sync.
    pub fn discover(&self) -> Result<String> {
        self.load_config()?;
        let streams = StreamCatalog::aircall()?;
        Catalog::discover(&streams).to_json_pretty()
    }

    /// SCHEMA messages of the selected streams, without syncing
    pub async fn print_schemas(&self) -> Result<()> {
        self.load_config()?;
        let streams = StreamCatalog::aircall()?;
        let (selected, deselected) = self.selection(&streams)?;

        for stream in streams.iter().filter(|s| selected.iter().any(|n| n == s.name())) {
            let message = match deselected.get(stream.name()) {
                Some(fields) => SingerMessage::schema_excluding(stream, fields),
                None => SingerMessage::schema(stream),
            };
            self.sink.write(message).await?;
        }
        self.sink.flush().await
    }

    /// Sync the selected streams, optionally capping records per stream
    pub async fn sync(&self, max_records: Option<usize>) -> Result<SyncSummary> {
        let config = self.load_config()?;
        let streams = Arc::new(StreamCatalog::aircall()?);
        let (selected, deselected) = self.selection(&streams)?;
        let state = self.load_state()?;
        let client = Arc::new(config.http_client()?);

        let mut sync_config = config.sync_config();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }

        let engine = SyncEngine::new(client, streams, state, self.sink.clone())
            .with_config(sync_config)
            .with_selection(selected)
            .with_field_selection(deselected);

        let summary = engine.run().await?;
        for stream in &summary.streams {
            info!(
                stream = %stream.stream,
                records = stream.stats.records_synced(),
                pages = stream.stats.pages_fetched,
                duration_ms = stream.stats.duration_ms,
                "Stream summary"
            );
        }

        let failed: Vec<&str> = summary.failures().map(|s| s.stream.as_str()).collect();
        if !failed.is_empty() {
            for failure in summary.failures() {
                error!(
                    stream = %failure.stream,
                    error = failure.error.as_deref().unwrap_or_default(),
                    "Stream failed"
                );
            }
            return Err(Error::Other(format!(
                "{} stream(s) failed: {}",
                failed.len(),
                failed.join(", ")
            )));
        }
        Ok(summary)
    }

    /// Load and validate config
    fn load_config(&self) -> Result<TapConfig> {
        TapConfig::load(&self.cli.config)
    }

    /// Load prior state
    fn load_state(&self) -> Result<StateManager> {
        match &self.cli.state {
            Some(path) => StateManager::from_file(path),
            None => Ok(StateManager::in_memory()),
        }
    }

    /// Streams to sync and the fields to drop from them, from the catalog
    /// file or the defaults
    fn selection(&self, streams: &StreamCatalog) -> Result<(Vec<String>, DeselectedFields)> {
        if self.cli.properties.is_some() {
            warn!("--properties is deprecated, use --catalog");
        }
        match self.cli.catalog_path() {
            Some(path) => {
                let catalog = Catalog::from_file(path)?;
                Ok((
                    catalog.selected_streams(streams),
                    catalog.deselected_fields(streams),
                ))
            }
            None => Ok((
                streams
                    .iter()
                    .filter(|s| s.selected_by_default())
                    .map(|s| s.name().to_string())
                    .collect(),
                DeselectedFields::new(),
            )),
        }
    }
}

/// JSON schema of the settings
fn settings_schema() -> Value {
    let properties: serde_json::Map<String, Value> = SETTINGS
        .iter()
        .map(|setting| {
            let mut property = json!({
                "type": "string",
                "description": setting.description,
            });
            if setting.kind == crate::config::SettingKind::DateTime {
                property["format"] = json!("date-time");
            }
            if setting.secret {
                property["secret"] = json!(true);
            }
            (setting.name.to_string(), property)
        })
        .collect();
    let required: Vec<&str> = SETTINGS
        .iter()
        .filter(|s| s.required)
        .map(|s| s.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn about_document() -> Value {
    json!({
        "name": crate::NAME,
        "version": crate::VERSION,
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "capabilities": CAPABILITIES,
        "settings": settings_schema(),
    })
}

fn about_markdown() -> String {
    let mut out = format!(
        "# `{}`\n\n{}\n\nVersion: {}\n\n## Capabilities\n\n",
        crate::NAME,
        env!("CARGO_PKG_DESCRIPTION"),
        crate::VERSION
    );
    for capability in CAPABILITIES {
        out.push_str(&format!("* `{capability}`\n"));
    }

    out.push_str("\n## Settings\n\n| Setting | Required | Description |\n|:--------|:--------:|:------------|\n");
    for setting in SETTINGS {
        let required = if setting.required { "True" } else { "False" };
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            setting.name, required, setting.description
        ));
    }
    out.push_str(&format!(
        "\nA full list of supported settings and capabilities is available by running: `{} --about`\n",
        crate::NAME
    ));
    out
}
