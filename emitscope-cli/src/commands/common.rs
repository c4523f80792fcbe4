//! Settings resolution shared by commands.
//!
//! Every setting follows the same precedence: command line, then the
//! config file, then the library default.

use std::time::Duration;

use clap::ValueEnum;
use emitscope::config::ConfigFile;
use emitscope::source::ApiConfig;
use emitscope::ServiceConfig;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Command-line overrides of configured settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub country: Option<String>,
    pub page_size: Option<usize>,
    pub max_pages: Option<usize>,
    pub max_assets: Option<usize>,
    /// Collection timeout in seconds.
    pub timeout: Option<u64>,
    /// Lift the page and asset limits.
    pub unlimited: bool,
    pub include_bunkers: bool,
}

/// Resolve API settings from CLI overrides and config.
pub fn resolve_api(overrides: &Overrides, config: &ConfigFile) -> ApiConfig {
    let mut api = config.api_config();
    if let Some(url) = &overrides.base_url {
        api = api.with_base_url(url.clone());
    }
    if let Some(country) = &overrides.country {
        api = api.with_country(country.clone());
    }
    api
}

/// Resolve service settings from CLI overrides and config.
pub fn resolve_service(overrides: &Overrides, config: &ConfigFile) -> ServiceConfig {
    let mut service = config.service_config();

    if let Some(country) = &overrides.country {
        service.country = country.trim().to_uppercase();
    }

    let mut budget = service.budget;
    if overrides.unlimited {
        budget = budget.with_max_pages(None).with_max_assets(None);
    }
    if let Some(page_size) = overrides.page_size {
        budget = budget.with_page_size(page_size);
    }
    if let Some(max_pages) = overrides.max_pages {
        budget = budget.with_max_pages(Some(max_pages));
    }
    if let Some(max_assets) = overrides.max_assets {
        budget = budget.with_max_assets(Some(max_assets));
    }
    if let Some(secs) = overrides.timeout {
        budget = budget.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    service.budget = budget;

    if overrides.include_bunkers {
        service.policy.extended_includes_bunkers = true;
    }
    service
}
