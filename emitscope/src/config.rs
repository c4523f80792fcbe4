//! Configuration file.
//!
//! Settings live in an INI file at `~/.emitscope/config.ini`:
//!
//! ```ini
//! [api]
//! base_url = https://api.climatetrace.org
//! country = ARG
//! timeout = 30
//! search_limit = 20
//!
//! [budget]
//! page_size = 500
//! max_pages = 200
//! max_assets = 50000
//! timeout = 120
//!
//! [inventory]
//! level = province
//! gas = co2e_100yr
//! scope = ipcc
//! extended_includes_bunkers = false
//!
//! [cache]
//! admin_ttl = 21600
//!
//! [logging]
//! level = info
//! file = /var/log/emitscope.log
//! ```
//!
//! Missing keys keep their defaults. Budget limits accept `0` or
//! `unlimited` to disable a limit.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::admin_cache::DEFAULT_ADMIN_CACHE_TTL;
use crate::collect::{
    CollectBudget, DEFAULT_MAX_ASSETS, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT,
};
use crate::inventory::{Gas, InventoryScope, ScopePolicy};
use crate::logging::LoggingOptions;
use crate::query::QueryDefaults;
use crate::service::ServiceConfig;
use crate::source::{
    ApiConfig, RegionLevel, DEFAULT_BASE_URL, DEFAULT_COUNTRY, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SEARCH_LIMIT,
};

/// Directory under the home directory holding emitscope files.
pub const CONFIG_DIR_NAME: &str = ".emitscope";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Path of the emitscope directory (`~/.emitscope`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of the configuration file (`~/.emitscope/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub country: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    pub search_limit: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// `[budget]` section. `None` disables a limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetSettings {
    pub page_size: usize,
    pub max_pages: Option<usize>,
    pub max_assets: Option<usize>,
    /// Wall-clock limit in seconds.
    pub timeout: Option<u64>,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: Some(DEFAULT_MAX_PAGES),
            max_assets: Some(DEFAULT_MAX_ASSETS),
            timeout: Some(DEFAULT_TIMEOUT.as_secs()),
        }
    }
}

/// `[inventory]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySettings {
    pub level: RegionLevel,
    pub gas: Gas,
    pub scope: InventoryScope,
    pub extended_includes_bunkers: bool,
}

impl Default for InventorySettings {
    fn default() -> Self {
        let defaults = QueryDefaults::default();
        Self {
            level: defaults.level,
            gas: defaults.gas,
            scope: defaults.scope,
            extended_includes_bunkers: ScopePolicy::default().extended_includes_bunkers,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Admin search cache lifetime in seconds.
    pub admin_ttl: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            admin_ttl: DEFAULT_ADMIN_CACHE_TTL.as_secs(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub api: ApiSettings,
    pub budget: BudgetSettings,
    pub inventory: InventorySettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to the default path, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::default()
            .with_base_url(self.api.base_url.clone())
            .with_country(self.api.country.clone())
            .with_request_timeout(Duration::from_secs(self.api.timeout))
            .with_search_limit(self.api.search_limit)
    }

    pub fn collect_budget(&self) -> CollectBudget {
        CollectBudget::default()
            .with_page_size(self.budget.page_size)
            .with_max_pages(self.budget.max_pages)
            .with_max_assets(self.budget.max_assets)
            .with_timeout(self.budget.timeout.map(Duration::from_secs))
    }

    pub fn scope_policy(&self) -> ScopePolicy {
        ScopePolicy {
            extended_includes_bunkers: self.inventory.extended_includes_bunkers,
        }
    }

    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            level: self.inventory.level,
            year: None,
            gas: self.inventory.gas,
            scope: self.inventory.scope,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            country: self.api.country.to_uppercase(),
            budget: self.collect_budget(),
            policy: self.scope_policy(),
            defaults: self.query_defaults(),
        }
    }

    pub fn admin_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.admin_ttl)
    }

    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions::default()
            .with_level(self.logging.level.clone())
            .with_file(self.logging.file.clone())
    }
}

/// Every settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBaseUrl,
    ApiCountry,
    ApiTimeout,
    ApiSearchLimit,
    BudgetPageSize,
    BudgetMaxPages,
    BudgetMaxAssets,
    BudgetTimeout,
    InventoryLevel,
    InventoryGas,
    InventoryDefaultScope,
    InventoryExtendedIncludesBunkers,
    CacheAdminTtl,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            ApiBaseUrl,
            ApiCountry,
            ApiTimeout,
            ApiSearchLimit,
            BudgetPageSize,
            BudgetMaxPages,
            BudgetMaxAssets,
            BudgetTimeout,
            InventoryLevel,
            InventoryGas,
            InventoryDefaultScope,
            InventoryExtendedIncludesBunkers,
            CacheAdminTtl,
            LoggingLevel,
            LoggingFile,
        ]
    }

    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            ApiBaseUrl | ApiCountry | ApiTimeout | ApiSearchLimit => "api",
            BudgetPageSize | BudgetMaxPages | BudgetMaxAssets | BudgetTimeout => "budget",
            InventoryLevel | InventoryGas | InventoryDefaultScope | InventoryExtendedIncludesBunkers => {
                "inventory"
            }
            CacheAdminTtl => "cache",
            LoggingLevel | LoggingFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            ApiBaseUrl => "base_url",
            ApiCountry => "country",
            ApiTimeout => "timeout",
            ApiSearchLimit => "search_limit",
            BudgetPageSize => "page_size",
            BudgetMaxPages => "max_pages",
            BudgetMaxAssets => "max_assets",
            BudgetTimeout => "timeout",
            InventoryLevel => "level",
            InventoryGas => "gas",
            InventoryDefaultScope => "scope",
            InventoryExtendedIncludesBunkers => "extended_includes_bunkers",
            CacheAdminTtl => "admin_ttl",
            LoggingLevel => "level",
            LoggingFile => "file",
        }
    }

    /// Full name in `section.key` form.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as it would be written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            ApiBaseUrl => config.api.base_url.clone(),
            ApiCountry => config.api.country.clone(),
            ApiTimeout => config.api.timeout.to_string(),
            ApiSearchLimit => config.api.search_limit.to_string(),
            BudgetPageSize => config.budget.page_size.to_string(),
            BudgetMaxPages => format_limit(config.budget.max_pages),
            BudgetMaxAssets => format_limit(config.budget.max_assets),
            BudgetTimeout => format_limit(config.budget.timeout),
            InventoryLevel => config.inventory.level.to_string(),
            InventoryGas => config.inventory.gas.to_string(),
            InventoryDefaultScope => config.inventory.scope.to_string(),
            InventoryExtendedIncludesBunkers => {
                config.inventory.extended_includes_bunkers.to_string()
            }
            CacheAdminTtl => config.cache.admin_ttl.to_string(),
            LoggingLevel => config.logging.level.clone(),
            LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            ApiBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "expected an http(s) URL"));
                }
                config.api.base_url = value.trim_end_matches('/').to_string();
            }
            ApiCountry => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(self.invalid(value, "expected an ISO3 country code"));
                }
                config.api.country = value.to_uppercase();
            }
            ApiTimeout => config.api.timeout = self.positive(value)?,
            ApiSearchLimit => config.api.search_limit = self.positive(value)?,
            BudgetPageSize => config.budget.page_size = self.positive(value)?,
            BudgetMaxPages => config.budget.max_pages = self.limit(value)?,
            BudgetMaxAssets => config.budget.max_assets = self.limit(value)?,
            BudgetTimeout => config.budget.timeout = self.limit(value)?,
            InventoryLevel => config.inventory.level = self.parsed(value)?,
            InventoryGas => config.inventory.gas = self.parsed(value)?,
            InventoryDefaultScope => config.inventory.scope = self.parsed(value)?,
            InventoryExtendedIncludesBunkers => {
                config.inventory.extended_includes_bunkers = parse_bool(value)
                    .ok_or_else(|| self.invalid(value, "expected true or false"))?;
            }
            CacheAdminTtl => config.cache.admin_ttl = self.parsed(value)?,
            LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "expected a level such as info or debug"));
                }
                config.logging.level = value.to_string();
            }
            LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parsed<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn positive<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + Default + PartialEq,
        T::Err: fmt::Display,
    {
        let parsed: T = self.parsed(value)?;
        if parsed == T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(parsed)
    }

    fn limit<T>(&self, value: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr + Default + PartialEq,
        T::Err: fmt::Display,
    {
        match value.to_lowercase().as_str() {
            "" | "unlimited" | "none" => Ok(None),
            _ => {
                let parsed: T = self.parsed(value)?;
                Ok((parsed != T::default()).then_some(parsed))
            }
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| format!("unknown configuration key '{}'", s))
    }
}

fn format_limit<T: fmt::Display>(limit: Option<T>) -> String {
    limit
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unlimited".to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.collect_budget(), CollectBudget::default());
        assert_eq!(config.api_config(), ApiConfig::default());
        assert_eq!(config.scope_policy(), ScopePolicy::default());
        assert_eq!(config.admin_cache_ttl(), DEFAULT_ADMIN_CACHE_TTL);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::parse(
            "[budget]\nmax_pages = unlimited\nmax_assets = 0\ntimeout = 30\n\
             [inventory]\nscope = extended\nextended_includes_bunkers = yes\n",
        )
        .unwrap();

        assert_eq!(config.budget.max_pages, None);
        assert_eq!(config.budget.max_assets, None);
        assert_eq!(config.budget.timeout, Some(30));
        assert_eq!(config.budget.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.inventory.scope, InventoryScope::Extended);
        assert!(config.scope_policy().extended_includes_bunkers);
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = ConfigFile::parse("[inventory]\ngas = co2e\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "inventory.gas"
        ));

        let err = ConfigFile::parse("[budget]\npage_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = ConfigFile::default();
        ConfigKey::ApiCountry.set(&mut config, "pry").unwrap();
        ConfigKey::BudgetMaxPages.set(&mut config, "unlimited").unwrap();
        ConfigKey::LoggingFile
            .set(&mut config, "/tmp/emitscope.log")
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.service_config().country, "PRY");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_key_names_unique_and_parseable() {
        let mut names: Vec<String> = ConfigKey::all().iter().map(|k| k.name()).collect();
        for (key, name) in ConfigKey::all().iter().zip(&names) {
            assert_eq!(name.parse::<ConfigKey>().unwrap(), *key);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
        assert!("budget.nope".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_key_get_formats_limits() {
        let mut config = ConfigFile::default();
        config.budget.timeout = None;
        assert_eq!(ConfigKey::BudgetTimeout.get(&config), "unlimited");
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
    }

    #[test]
    fn test_country_and_url_validation() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::ApiCountry.set(&mut config, "Argentina").is_err());
        assert!(ConfigKey::ApiBaseUrl.set(&mut config, "ftp://x").is_err());
        ConfigKey::ApiBaseUrl
            .set(&mut config, "http://localhost:8080/")
            .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
    }
}
