//! Inventory aggregation.
//!
//! Turns classified, region-filtered records into hierarchical totals:
//!
//! - **Scopes**: `ipcc` counts categories flagged `included_in_total`;
//!   `extended` adds whatever [`ScopePolicy`] enables (international bunkers).
//! - **Memo items**: bunker subsectors, always listed with their own total.
//! - **Stock change**: land-use carbon stock change, may be negative, never
//!   part of either scope.
//!
//! Each request owns its [`Aggregator`]; nothing here is shared.

mod aggregate;
mod result;
mod types;

pub use aggregate::Aggregator;
pub use result::{
    Diagnostics, InventoryMetadata, InventoryResult, RegionDescriptor, ResultContext,
    DATA_SOURCE,
};
pub use types::{
    AfoluBalance, Gas, InventoryScope, InventoryTotals, ScopePolicy, SectorTotal, SubsectorTotal,
};
