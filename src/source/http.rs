//! HTTP/JSON paged source
//!
//! Reads pages from a JSON API with a blocking client:
//! - Pages: `GET {base_url}{records_path}?{page_param}={index}`
//! - Counts: `GET {base_url}{meta_path}`
//!
//! Request timeouts and gateway timeouts surface as
//! [`Error::QueryTimedOut`] so the iterator can retry them. Everything else
//! is returned as a fatal error.

use super::types::{extract_path, extract_path_mut, PagedSource, Totals};
use crate::error::{Error, Result};
use crate::types::{FetchTarget, JsonValue, StringMap};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for an HTTP paged source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Path of the paged records endpoint
    pub records_path: String,
    /// Query parameter carrying the page index
    pub page_param: String,
    /// First page number on the wire (usually 0 or 1)
    pub start_page: usize,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
    /// Page size value
    pub page_size: Option<usize>,
    /// Dot path to the record array in a page response (empty = body is the array)
    pub records_field: String,
    /// Path of the endpoint reporting collection counts
    pub meta_path: String,
    /// Dot path to the total record count in the meta response
    pub total_records_field: String,
    /// Dot path to the total page count (derived from `page_size` when absent)
    pub total_pages_field: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Headers sent with every request
    pub headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            records_path: "/records".to_string(),
            page_param: "page".to_string(),
            start_page: 0,
            page_size_param: None,
            page_size: None,
            records_field: "records".to_string(),
            meta_path: "/records/meta".to_string(),
            total_records_field: "total_records".to_string(),
            total_pages_field: Some("total_pages".to_string()),
            timeout: Duration::from_secs(30),
            headers: StringMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSourceConfig {
    /// Create a new config builder
    pub fn builder() -> HttpSourceConfigBuilder {
        HttpSourceConfigBuilder::default()
    }
}

/// Builder for HTTP source config
#[derive(Default)]
pub struct HttpSourceConfigBuilder {
    config: HttpSourceConfig,
}

impl HttpSourceConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the records endpoint, page parameter and record field
    pub fn records(
        mut self,
        path: impl Into<String>,
        page_param: impl Into<String>,
        records_field: impl Into<String>,
    ) -> Self {
        self.config.records_path = path.into();
        self.config.page_param = page_param.into();
        self.config.records_field = records_field.into();
        self
    }

    /// Set the first page number used on the wire
    pub fn start_page(mut self, start_page: usize) -> Self {
        self.config.start_page = start_page;
        self
    }

    /// Send a page size parameter with every page request
    pub fn page_size(mut self, param: impl Into<String>, size: usize) -> Self {
        self.config.page_size_param = Some(param.into());
        self.config.page_size = Some(size);
        self
    }

    /// Set the meta endpoint and the fields holding the counts
    pub fn meta(
        mut self,
        path: impl Into<String>,
        total_records_field: impl Into<String>,
        total_pages_field: Option<String>,
    ) -> Self {
        self.config.meta_path = path.into();
        self.config.total_records_field = total_records_field.into();
        self.config.total_pages_field = total_pages_field;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpSourceConfig {
        self.config
    }
}

/// Paged source backed by a JSON HTTP API
pub struct HttpPageSource {
    client: Client,
    config: HttpSourceConfig,
    base: Url,
}

impl HttpPageSource {
    /// Create a new HTTP source
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        if config.total_pages_field.is_none() && config.page_size.unwrap_or(0) == 0 {
            return Err(Error::config(
                "either total_pages_field or a non-zero page_size is required",
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// Get the source configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self.base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    fn get_json(&self, url: Url, target: FetchTarget) -> Result<JsonValue> {
        let mut req = self.client.get(url.clone());
        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().map_err(|e| classify_transport(e, target))?;
        let response = check_status(response, target)?;
        debug!("Fetched {} from {}", target, url);

        response.json().map_err(|e| classify_transport(e, target))
    }

    fn meta(&self) -> Result<JsonValue> {
        let url = self.build_url(&self.config.meta_path)?;
        self.get_json(url, FetchTarget::Totals)
    }

    fn count_field(&self, meta: &JsonValue, field: &str) -> Result<usize> {
        extract_path(meta, field)
            .and_then(JsonValue::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                Error::extraction(field, "expected a non-negative integer in meta response")
            })
    }

    /// Page count from the meta document, derived from the record count
    /// when no page field is configured
    fn page_count(&self, meta: &JsonValue, total_records: Option<usize>) -> Result<usize> {
        if let Some(field) = &self.config.total_pages_field {
            return self.count_field(meta, field);
        }

        let records = match total_records {
            Some(records) => records,
            None => self.count_field(meta, &self.config.total_records_field)?,
        };
        let page_size = self.config.page_size.unwrap_or(1).max(1);
        Ok(records.div_ceil(page_size))
    }
}

impl PagedSource for HttpPageSource {
    type Record = JsonValue;

    fn total_records(&self) -> Result<usize> {
        let meta = self.meta()?;
        self.count_field(&meta, &self.config.total_records_field)
    }

    fn total_pages(&self) -> Result<usize> {
        let meta = self.meta()?;
        self.page_count(&meta, None)
    }

    fn totals(&self) -> Result<Totals> {
        let meta = self.meta()?;
        let records = self.count_field(&meta, &self.config.total_records_field)?;
        let pages = self.page_count(&meta, Some(records))?;
        Ok(Totals { records, pages })
    }

    fn page(&self, index: usize) -> Result<Vec<JsonValue>> {
        let mut url = self.build_url(&self.config.records_path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(
                &self.config.page_param,
                &(index + self.config.start_page).to_string(),
            );
            if let (Some(param), Some(size)) =
                (&self.config.page_size_param, self.config.page_size)
            {
                query.append_pair(param, &size.to_string());
            }
        }

        let mut body = self.get_json(url, FetchTarget::Page(index))?;
        let field = &self.config.records_field;
        match extract_path_mut(&mut body, field).map(JsonValue::take) {
            Some(JsonValue::Array(records)) => Ok(records),
            Some(JsonValue::Null) | None => Err(Error::extraction(field, "field not found")),
            Some(_) => Err(Error::extraction(field, "expected an array of records")),
        }
    }
}

impl std::fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Map a transport error, keeping timeouts retryable
fn classify_transport(e: reqwest::Error, target: FetchTarget) -> Error {
    if e.is_timeout() {
        Error::timed_out(target)
    } else {
        Error::Http(e)
    }
}

/// Check the response status; 408 and 504 count as timeouts
fn check_status(response: Response, target: FetchTarget) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return Err(Error::timed_out(target));
    }

    let body = response.text().unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}
