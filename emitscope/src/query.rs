//! Inventory query validation.
//!
//! Raw caller input (CLI flags, query strings) is validated here, before
//! anything is fetched. Every rejection carries a message meant for the
//! caller.

use std::sync::OnceLock;

use chrono::Datelike;
use regex::Regex;
use thiserror::Error;

use crate::inventory::{Gas, InventoryScope};
use crate::source::RegionLevel;

/// Earliest year the asset inventory covers.
pub const MIN_YEAR: i32 = 2015;

/// Rejected query input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("A region name or admin id is required")]
    MissingRegion,

    #[error("Invalid level '{0}': expected 'province' or 'department'")]
    InvalidLevel(String),

    #[error("Invalid year '{0}': expected a single four-digit year")]
    InvalidYear(String),

    #[error("Only a single year is supported, got '{0}'")]
    MultiYear(String),

    #[error("Year {year} is outside the supported range {min}-{max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("Invalid gas '{0}': expected one of co2, ch4, n2o, co2e_100yr, co2e_20yr")]
    InvalidGas(String),

    #[error("Invalid scope '{0}': expected 'ipcc' or 'extended'")]
    InvalidScope(String),
}

/// How the caller identified the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionRef {
    /// A name to resolve through the admin search.
    Name(String),
    /// An admin id used as-is.
    AdminId(String),
}

impl RegionRef {
    pub fn as_str(&self) -> &str {
        match self {
            RegionRef::Name(name) | RegionRef::AdminId(name) => name,
        }
    }
}

/// A validated inventory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryQuery {
    pub region: RegionRef,
    pub level: RegionLevel,
    pub year: i32,
    pub gas: Gas,
    pub scope: InventoryScope,
}

/// Unvalidated query input. Missing optional fields take defaults.
#[derive(Debug, Clone, Default)]
pub struct RawQuery<'a> {
    pub name: Option<&'a str>,
    pub admin_id: Option<&'a str>,
    pub level: Option<&'a str>,
    pub year: Option<&'a str>,
    pub gas: Option<&'a str>,
    pub scope: Option<&'a str>,
}

/// Defaults applied to fields the caller left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub level: RegionLevel,
    /// `None` means the previous calendar year.
    pub year: Option<i32>,
    pub gas: Gas,
    pub scope: InventoryScope,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            level: RegionLevel::Province,
            year: None,
            gas: Gas::Co2e100yr,
            scope: InventoryScope::Ipcc,
        }
    }
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("year pattern is valid"))
}

fn multi_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}\s*([,;]|-|\.\.)\s*\d{4}").expect("multi-year pattern is valid")
    })
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Validate a year string against `MIN_YEAR..=max_year`.
pub fn parse_year(raw: &str, max_year: i32) -> Result<i32, QueryError> {
    let trimmed = raw.trim();
    if multi_year_pattern().is_match(trimmed) {
        return Err(QueryError::MultiYear(trimmed.to_string()));
    }
    if !year_pattern().is_match(trimmed) {
        return Err(QueryError::InvalidYear(trimmed.to_string()));
    }

    let year: i32 = trimmed
        .parse()
        .map_err(|_| QueryError::InvalidYear(trimmed.to_string()))?;
    if !(MIN_YEAR..=max_year).contains(&year) {
        return Err(QueryError::YearOutOfRange {
            year,
            min: MIN_YEAR,
            max: max_year,
        });
    }
    Ok(year)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl InventoryQuery {
    /// Validate raw input against the current calendar year.
    pub fn parse(raw: &RawQuery<'_>, defaults: &QueryDefaults) -> Result<Self, QueryError> {
        Self::parse_with_year(raw, defaults, current_year())
    }

    /// Validate raw input with an explicit current year.
    pub fn parse_with_year(
        raw: &RawQuery<'_>,
        defaults: &QueryDefaults,
        current_year: i32,
    ) -> Result<Self, QueryError> {
        let region = match (non_empty(raw.admin_id), non_empty(raw.name)) {
            (Some(id), _) => RegionRef::AdminId(id.to_string()),
            (None, Some(name)) => RegionRef::Name(name.to_string()),
            (None, None) => return Err(QueryError::MissingRegion),
        };

        let level = match non_empty(raw.level) {
            Some(level) => level
                .parse()
                .map_err(|_| QueryError::InvalidLevel(level.to_string()))?,
            None => defaults.level,
        };

        let year = match non_empty(raw.year) {
            Some(year) => parse_year(year, current_year)?,
            None => defaults.year.unwrap_or(current_year - 1),
        };

        let gas = match non_empty(raw.gas) {
            Some(gas) => gas
                .parse()
                .map_err(|_| QueryError::InvalidGas(gas.to_string()))?,
            None => defaults.gas,
        };

        let scope = match non_empty(raw.scope) {
            Some(scope) => scope
                .parse()
                .map_err(|_| QueryError::InvalidScope(scope.to_string()))?,
            None => defaults.scope,
        };

        Ok(Self {
            region,
            level,
            year,
            gas,
            scope,
        })
    }
}
