//! Configuration types for walk definitions
//!
//! A walk definition describes an HTTP paged source and the retry policy used
//! against it, in YAML:
//!
//! ```yaml
//! kind: walk
//! name: students
//! source:
//!   base_url: "https://api.example.com"
//!   records:
//!     path: /students
//!     page_param: page
//!     records_field: data
//!   meta:
//!     path: /students/meta
//!     total_records_field: total
//!     total_pages_field: pages
//! retry:
//!   retries: 3
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::retry::{RetryPolicy, DEFAULT_RETRIES};
use crate::source::HttpSourceConfig;
use crate::types::{BackoffType, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Walk Config
// ============================================================================

/// Complete walk configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Kind of config (always "walk")
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Config version
    #[serde(default = "default_version")]
    pub version: String,

    /// Name of the collection being walked
    pub name: String,

    /// Paged source definition
    pub source: SourceConfig,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_kind() -> String {
    "walk".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

impl WalkConfig {
    /// Build the HTTP source configuration
    pub fn http_source(&self) -> HttpSourceConfig {
        self.source.to_http_config()
    }

    /// Build the retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.to_policy()
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// HTTP paged source definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL for API requests
    pub base_url: String,

    /// Paged records endpoint
    pub records: RecordsConfig,

    /// Counts endpoint
    pub meta: MetaConfig,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,
}

fn default_timeout() -> u64 {
    30
}

impl SourceConfig {
    /// Convert into the runtime HTTP source configuration
    pub fn to_http_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.base_url.clone(),
            records_path: self.records.path.clone(),
            page_param: self.records.page_param.clone(),
            start_page: self.records.start_page,
            page_size_param: self.records.page_size_param.clone().none_if_empty(),
            page_size: self.records.page_size,
            records_field: self.records.records_field.clone(),
            meta_path: self.meta.path.clone(),
            total_records_field: self.meta.total_records_field.clone(),
            total_pages_field: self.meta.total_pages_field.clone().none_if_empty(),
            timeout: Duration::from_secs(self.timeout_seconds),
            headers: self.headers.clone(),
            ..HttpSourceConfig::default()
        }
    }
}

/// Paged records endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Endpoint path
    pub path: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Page number of the first page (usually 0 or 1)
    #[serde(default)]
    pub start_page: usize,

    /// Optional page size parameter name
    #[serde(default)]
    pub page_size_param: Option<String>,

    /// Page size value
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Dot path to the record array (empty = body is the array)
    #[serde(default)]
    pub records_field: String,
}

fn default_page_param() -> String {
    "page".to_string()
}

/// Counts endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Endpoint path
    pub path: String,

    /// Dot path to the total record count
    pub total_records_field: String,

    /// Dot path to the total page count (derived from page_size when absent)
    #[serde(default)]
    pub total_pages_field: Option<String>,
}

// ============================================================================
// Retry Config
// ============================================================================

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Backoff between retries
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff: BackoffConfig::default(),
        }
    }
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

impl RetryConfig {
    /// Convert into a runtime retry policy
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .retries(self.retries)
            .backoff(
                self.backoff.backoff_type,
                Duration::from_millis(self.backoff.initial_ms),
                Duration::from_millis(self.backoff.max_ms),
            )
            .build()
    }
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default)]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: 0,
            max_ms: default_max_ms(),
        }
    }
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Loading
// ============================================================================

/// Load a walk configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<WalkConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let yaml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read walk definition {}", path.display()))?;
    load_config_from_str(&yaml)
}

/// Load a walk configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<WalkConfig> {
    let config: WalkConfig = serde_yaml::from_str(yaml)?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate a walk configuration
pub fn validate_config(config: &WalkConfig) -> Result<()> {
    if config.kind != "walk" {
        return Err(Error::invalid_value(
            "kind",
            format!("expected 'walk', got '{}'", config.kind),
        ));
    }

    if config.name.is_empty() {
        return Err(Error::config("Walk name cannot be empty"));
    }

    let source = &config.source;
    if source.base_url.is_empty() {
        return Err(Error::missing_field("source.base_url"));
    }
    Url::parse(&source.base_url)?;

    if source.records.path.is_empty() {
        return Err(Error::missing_field("source.records.path"));
    }
    if source.records.page_param.is_empty() {
        return Err(Error::missing_field("source.records.page_param"));
    }
    if source.meta.path.is_empty() {
        return Err(Error::missing_field("source.meta.path"));
    }
    if source.meta.total_records_field.is_empty() {
        return Err(Error::missing_field("source.meta.total_records_field"));
    }

    let has_pages_field = source
        .meta
        .total_pages_field
        .as_deref()
        .is_some_and(|field| !field.is_empty());
    if !has_pages_field && source.records.page_size.unwrap_or(0) == 0 {
        return Err(Error::invalid_value(
            "source.records.page_size",
            "a non-zero page_size is required when meta.total_pages_field is not set",
        ));
    }

    if source.timeout_seconds == 0 {
        return Err(Error::invalid_value(
            "source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(())
}
