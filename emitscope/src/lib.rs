//! Emitscope - region-scoped greenhouse gas inventories
//!
//! Builds an IPCC-structured emissions inventory for one sub-national
//! region of a country from point-located Climate TRACE asset records:
//! assets are paged from the API, filtered to those whose centroid falls
//! inside the region boundary, classified into the IPCC sector hierarchy
//! and summed under a chosen inventory scope.
//!
//! The entry point is [`service::InventoryService`]; the CLI in
//! `emitscope-cli` is a thin layer on top of it.

pub mod admin_cache;
pub mod clock;
pub mod collect;
pub mod config;
pub mod geometry;
pub mod inventory;
pub mod logging;
pub mod query;
pub mod service;
pub mod source;
pub mod taxonomy;

pub use admin_cache::{AdminCache, AdminCacheStats};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collect::{CollectBudget, CollectReport, ProgressReporter, StopReason};
pub use inventory::{Gas, InventoryResult, InventoryScope, ScopePolicy};
pub use query::{InventoryQuery, RawQuery};
pub use service::{InventoryError, InventoryService, ServiceConfig};
pub use source::{ClimateTraceClient, RegionLevel};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
