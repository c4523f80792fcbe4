//! Progress reporting for collection runs.
//!
//! The driver emits [`CollectEvent`]s; what happens to them (log lines, a
//! terminal spinner, nothing) is up to the [`ProgressReporter`].

use super::budget::StopReason;
use super::report::CollectReport;

/// Events emitted while walking the asset listing.
#[derive(Debug, Clone)]
pub enum CollectEvent<'a> {
    /// A page request is about to be sent.
    PageRequested {
        /// Zero-based page index.
        page: usize,
        offset: usize,
    },

    /// A page was fetched and processed.
    PageProcessed {
        page: usize,
        /// Raw records in this page.
        records: usize,
        /// Running totals so far.
        report: &'a CollectReport,
    },

    /// A budget stopped the run early.
    BudgetExhausted { reason: StopReason },

    /// The run finished, truncated or not.
    Finished { report: &'a CollectReport },
}

/// Receiver of collection progress.
///
/// The default implementation does nothing.
///
/// # Example
///
/// ```
/// use emitscope::collect::{CollectEvent, ProgressReporter};
///
/// struct PageCounter;
///
/// impl ProgressReporter for PageCounter {
///     fn report(&self, event: CollectEvent<'_>) {
///         if let CollectEvent::PageProcessed { page, .. } = event {
///             println!("page {} done", page + 1);
///         }
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: CollectEvent<'_>) {
        let _ = event;
    }
}

/// Ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: CollectEvent<'_>) {
        use tracing::{debug, info, warn};

        match event {
            CollectEvent::PageRequested { page, offset } => {
                debug!(page = page + 1, offset, "Fetching asset page");
            }
            CollectEvent::PageProcessed {
                page,
                records,
                report,
            } => {
                debug!(
                    page = page + 1,
                    records,
                    in_region = report.in_region,
                    aggregated = report.aggregated,
                    "Asset page processed"
                );
            }
            CollectEvent::BudgetExhausted { reason } => {
                warn!(reason = %reason, "Collection budget exhausted, result is truncated");
            }
            CollectEvent::Finished { report } => {
                info!(
                    pages = report.pages_fetched,
                    scanned = report.assets_scanned,
                    in_region = report.in_region,
                    aggregated = report.aggregated,
                    truncated = report.truncated,
                    elapsed_ms = report.elapsed_ms,
                    "Collection finished"
                );
            }
        }
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &R {
    fn report(&self, event: CollectEvent<'_>) {
        (**self).report(event)
    }
}
