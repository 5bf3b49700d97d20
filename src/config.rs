//! Tap configuration
//!
//! Settings come from one or more JSON or YAML files merged left to right,
//! or from `TAP_AIRCALL_*` environment variables when the path `ENV` is
//! given. Everything is validated before any stream starts.

use crate::auth::AuthConfig;
use crate::engine::SyncConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use crate::streams::API_BASE_URL;
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Config path that reads settings from the environment
pub const ENV_CONFIG: &str = "ENV";

/// Prefix of the environment variables read in `ENV` mode
pub const ENV_PREFIX: &str = "TAP_AIRCALL_";

// ============================================================================
// Settings
// ============================================================================

/// Kind of value a setting holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    String,
    DateTime,
}

/// Description of one setting, listed by `--about`
#[derive(Debug, Clone, Serialize)]
pub struct Setting {
    /// Key in the config file
    pub name: &'static str,
    /// Value type
    #[serde(rename = "type")]
    pub kind: SettingKind,
    /// Whether the run fails without it
    pub required: bool,
    /// Whether the value is a credential
    pub secret: bool,
    /// Human-readable description
    pub description: &'static str,
}

/// Every setting the tap accepts
pub const SETTINGS: &[Setting] = &[
    Setting {
        name: "api_id",
        kind: SettingKind::String,
        required: true,
        secret: false,
        description: "Aircall API ID, used as the Basic auth username",
    },
    Setting {
        name: "api_token",
        kind: SettingKind::String,
        required: true,
        secret: true,
        description: "Aircall API token, used as the Basic auth password",
    },
    Setting {
        name: "start_date",
        kind: SettingKind::DateTime,
        required: true,
        secret: false,
        description: "Earliest record date to sync when no bookmark exists",
    },
    Setting {
        name: "end_date",
        kind: SettingKind::DateTime,
        required: false,
        secret: false,
        description: "Latest record date to sync",
    },
    Setting {
        name: "user_agent",
        kind: SettingKind::String,
        required: false,
        secret: false,
        description: "User-Agent header sent with every request",
    },
];

// ============================================================================
// Tap Config
// ============================================================================

/// Config document as written, before validation
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    api_id: Option<String>,
    #[serde(default)]
    api_token: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
}

/// Validated tap configuration
#[derive(Clone, PartialEq, Eq)]
pub struct TapConfig {
    /// Basic auth username
    pub api_id: String,
    /// Basic auth password
    pub api_token: String,
    /// Lower bound for streams without a bookmark
    pub start_date: DateTime<Utc>,
    /// Upper bound sent as `to`
    pub end_date: Option<DateTime<Utc>>,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
}

impl TapConfig {
    /// Load and merge config sources, in order.
    ///
    /// Later sources override earlier ones key by key.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::config("No config given (use -c/--config)"));
        }

        let mut merged = JsonObject::new();
        for path in paths {
            let path = path.as_ref();
            let layer = if path.as_os_str() == ENV_CONFIG {
                debug!("Reading config from environment");
                env_object(std::env::vars())
            } else {
                debug!(path = %path.display(), "Reading config file");
                read_config_file(path)?
            };
            merged.extend(layer);
        }

        Self::from_value(JsonValue::Object(merged))
    }

    /// Validate a config document
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;

        let api_id = raw
            .api_id
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("api_id"))?;
        let api_token = raw
            .api_token
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("api_token"))?;
        let start_date = raw
            .start_date
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("start_date"))
            .and_then(|s| parse_datetime("start_date", &s))?;
        let end_date = raw
            .end_date
            .none_if_empty()
            .map(|s| parse_datetime("end_date", &s))
            .transpose()?;

        if let Some(end) = end_date {
            if end < start_date {
                return Err(Error::invalid_value(
                    "end_date",
                    format!("{end} is before start_date {start_date}"),
                ));
            }
        }

        Ok(Self {
            api_id,
            api_token,
            start_date,
            end_date,
            user_agent: raw.user_agent.none_if_empty(),
        })
    }

    /// Basic auth credentials
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::basic(&self.api_id, &self.api_token)
    }

    /// HTTP settings for the Aircall API
    pub fn http_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder().base_url(API_BASE_URL);
        match &self.user_agent {
            Some(agent) => builder.user_agent(agent.clone()).build(),
            None => builder.build(),
        }
    }

    /// Authenticated client for the Aircall API
    pub fn http_client(&self) -> Result<HttpClient> {
        HttpClient::with_auth(self.http_config(), self.auth())
    }

    /// Engine settings derived from this config
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new()
            .with_start_date(self.start_date)
            .with_end_date(self.end_date)
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_id", &self.api_id)
            .field("api_token", &"***")
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Read a JSON or YAML config file into an object
fn read_config_file(path: &Path) -> Result<JsonObject> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let value: JsonValue = if is_yaml {
        serde_yaml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(JsonObject::new()),
        _ => Err(Error::config(format!(
            "Config file {} must contain an object",
            path.display()
        ))),
    }
}

/// Collect `TAP_AIRCALL_*` variables into a config object
fn env_object<I>(vars: I) -> JsonObject
where
    I: IntoIterator<Item = (String, String)>,
{
    let names: Vec<&str> = SETTINGS.iter().map(|s| s.name).collect();
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(ENV_PREFIX)?.to_ascii_lowercase();
            names
                .contains(&name.as_str())
                .then(|| (name, JsonValue::String(value)))
        })
        .collect()
}

/// Parse an ISO-8601 date or datetime; values without an offset are UTC
fn parse_datetime(field: &str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::invalid_value(
        field,
        format!("'{value}' is not an ISO-8601 date"),
    ))
}
