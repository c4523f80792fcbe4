//! Upstream data sources.
//!
//! Two collaborators feed an inventory request:
//!
//! - [`AssetSource`] - a paged listing of point-located emission assets
//! - [`RegionSource`] - admin-unit search and boundary geometry
//!
//! [`ClimateTraceClient`] implements both over the Climate TRACE v6 API.
//! Upstream records are loosely typed; decoding is lenient and leaves
//! judgement (unusable coordinates, missing quantities) to the caller.

mod climate_trace;
mod traits;
mod types;

pub use climate_trace::{
    ApiConfig, ClimateTraceClient, DEFAULT_BASE_URL, DEFAULT_COUNTRY, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SEARCH_LIMIT,
};
pub use traits::{AssetSource, RegionSource};
pub use types::{
    parent_gid, pick_candidate, AdminUnit, AssetPage, EmissionAsset, GasQuantity, PageRequest,
    RegionBoundary, RegionLevel, SourceError,
};
