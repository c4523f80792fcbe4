//! Bookkeeping for one collection run.

use serde::Serialize;

use super::budget::StopReason;

/// Counts and stop condition of a collection run.
///
/// Every counter describes a consistent prefix of pages: the page being
/// processed when a budget trips is counted only up to the record that
/// tripped it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub pages_fetched: usize,
    /// Raw records seen across all fetched pages.
    pub assets_scanned: usize,
    /// Records retained by the region filter.
    pub in_region: usize,
    /// Records that contributed a usable value.
    pub aggregated: usize,
    /// Records dropped for a missing or non-finite centroid.
    pub dropped_coordinates: usize,
    /// Records accepted only after swapping the axis order.
    pub swapped_coordinates: usize,
    pub truncated: bool,
    pub stopped_by: Option<StopReason>,
    pub elapsed_ms: u64,
}

impl CollectReport {
    /// Mark the run as stopped early.
    pub(crate) fn stop(&mut self, reason: StopReason) {
        self.truncated = true;
        self.stopped_by = Some(reason);
    }
}
