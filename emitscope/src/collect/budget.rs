//! Resource budget for one collection run.

use std::time::Duration;

use serde::Serialize;

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Pages fetched before giving up.
pub const DEFAULT_MAX_PAGES: usize = 200;

/// In-region records aggregated before giving up.
pub const DEFAULT_MAX_ASSETS: usize = 50_000;

/// Wall-clock limit for one run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Limits on a collection run. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectBudget {
    pub page_size: usize,
    pub max_pages: Option<usize>,
    /// Counted against records retained by the region filter.
    pub max_assets: Option<usize>,
    /// Checked at page boundaries only.
    pub timeout: Option<Duration>,
}

impl Default for CollectBudget {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: Some(DEFAULT_MAX_PAGES),
            max_assets: Some(DEFAULT_MAX_ASSETS),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl CollectBudget {
    /// A budget with no limits.
    pub fn unlimited() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            max_assets: None,
            timeout: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_assets(mut self, max_assets: Option<usize>) -> Self {
        self.max_assets = max_assets;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why a run stopped before the source ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "maxAssets")]
    MaxAssets,
    #[serde(rename = "maxPages")]
    MaxPages,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Timeout => "timeout",
            StopReason::MaxAssets => "maxAssets",
            StopReason::MaxPages => "maxPages",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
