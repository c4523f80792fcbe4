//! Bounded pagination over the asset listing.
//!
//! # State Machine
//!
//! ```text
//! CheckBudget --[timeout / maxPages]--> Stopped (truncated)
//! CheckBudget --> FetchPage --[error]--> Failed
//! FetchPage --[empty page]--> Done
//! FetchPage --> FilterPage --[maxAssets]--> Stopped (truncated)
//! FilterPage --[short page]--> Done
//! FilterPage --> CheckBudget
//! ```
//!
//! Each record goes through the same stages: centroid normalization against
//! the region's bounding box, exact containment, classification, then
//! aggregation. The [`CollectReport`] counts what happened at each stage.

mod budget;
mod driver;
mod progress;
mod report;

pub use budget::{
    CollectBudget, StopReason, DEFAULT_MAX_ASSETS, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
    DEFAULT_TIMEOUT,
};
pub use driver::{collect, CollectError, CollectRequest, Collection};
pub use progress::{CollectEvent, ProgressReporter, SilentReporter, TracingReporter};
pub use report::CollectReport;
