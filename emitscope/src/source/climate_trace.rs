//! Climate TRACE v6 API client.
//!
//! # Endpoints
//!
//! - `GET /v6/assets?countries={iso3}&year={year}&limit={n}&offset={k}`
//! - `GET /v6/admins/search?name={name}&level={1|2}&limit={n}`
//! - `GET /v6/admins/{id}/geojson`
//!
//! No authentication is required. Failed requests are never retried here;
//! the caller decides what a failure means for the request as a whole.

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::{AssetSource, RegionSource};
use super::types::{AdminUnit, AssetPage, PageRequest, RegionBoundary, RegionLevel, SourceError};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.climatetrace.org";

/// Country whose assets are listed and whose admin units are preferred.
pub const DEFAULT_COUNTRY: &str = "ARG";

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Results requested from the admin search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_DETAIL: usize = 200;

/// Connection settings for [`ClimateTraceClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// ISO3 country code.
    pub country: String,
    pub request_timeout: Duration,
    pub search_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into().to_uppercase();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }
}

/// Async client for the Climate TRACE API.
///
/// Implements both [`AssetSource`] and [`RegionSource`].
///
/// # Example
///
/// ```ignore
/// use emitscope::source::{ApiConfig, ClimateTraceClient};
///
/// let client = ClimateTraceClient::new(ApiConfig::default())?;
/// let units = client.search_admins("Misiones", RegionLevel::Province).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ClimateTraceClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ClimateTraceClient {
    /// Creates a client with the configured timeout.
    pub fn new(config: ApiConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("emitscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, SourceError> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))
            .map_err(|e| SourceError::Transport(format!("Invalid URL {}{}: {}", base, path, e)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn assets_url(&self, request: &PageRequest) -> Result<Url, SourceError> {
        self.endpoint(
            "/v6/assets",
            &[
                ("countries", request.country.clone()),
                ("year", request.year.to_string()),
                ("limit", request.limit.to_string()),
                ("offset", request.offset.to_string()),
            ],
        )
    }

    fn search_url(&self, name: &str, level: RegionLevel) -> Result<Url, SourceError> {
        self.endpoint(
            "/v6/admins/search",
            &[
                ("name", name.to_string()),
                ("level", level.admin_level().to_string()),
                ("limit", self.config.search_limit.to_string()),
            ],
        )
    }

    fn boundary_url(&self, admin_id: &str) -> Result<Url, SourceError> {
        let mut url = self.endpoint("/v6/admins", &[])?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport(format!("Invalid base URL {}", self.config.base_url)))?
            .push(admin_id)
            .push("geojson");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Transport(format!("Request to {} timed out", url))
            } else {
                SourceError::Transport(format!("Request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = truncate_detail(&body);
            warn!(url = %url, status = status.as_u16(), "Upstream returned an error");
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                detail,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(format!("{}: {}", url, e)))
    }
}

fn truncate_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_ERROR_DETAIL).collect())
}

impl AssetSource for ClimateTraceClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<AssetPage, SourceError> {
        let url = self.assets_url(request)?;
        self.get_json(url).await
    }
}

impl RegionSource for ClimateTraceClient {
    async fn search_admins(
        &self,
        name: &str,
        level: RegionLevel,
    ) -> Result<Vec<AdminUnit>, SourceError> {
        let url = self.search_url(name, level)?;
        let value: Value = self.get_json(url).await?;

        // The search answers with a bare array; tolerate a wrapped one.
        let items = match value {
            Value::Array(items) => Value::Array(items),
            Value::Object(mut map) => map
                .remove("admins")
                .or_else(|| map.remove("results"))
                .unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        serde_json::from_value(items).map_err(|e| SourceError::Decode(e.to_string()))
    }

    async fn fetch_boundary(&self, admin_id: &str) -> Result<RegionBoundary, SourceError> {
        let url = self.boundary_url(admin_id)?;
        let value: Value = self.get_json(url).await?;
        Ok(RegionBoundary::from_geojson(admin_id, &value)?)
    }
}
