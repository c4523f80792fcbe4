//! The bounded pagination loop.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::geometry::{normalize_oriented, Orientation, Region};
use crate::inventory::{Aggregator, Gas};
use crate::source::{AssetSource, PageRequest, SourceError};
use crate::taxonomy::Classifier;

use super::budget::{CollectBudget, StopReason};
use super::progress::{CollectEvent, ProgressReporter};
use super::report::CollectReport;

/// Errors that end a collection run without a result.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A page fetch failed. Pages are never retried.
    #[error("Asset listing failed: {0}")]
    Upstream(#[from] SourceError),

    /// The caller abandoned the request.
    #[error("Collection cancelled")]
    Cancelled,
}

/// What to list from the asset source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectRequest {
    /// ISO3 country code.
    pub country: String,
    pub year: i32,
    pub gas: Gas,
}

/// Output of a finished run.
#[derive(Debug, Clone)]
pub struct Collection {
    pub aggregator: Aggregator,
    pub report: CollectReport,
}

/// Walk the paged asset listing, feeding in-region records to a fresh
/// [`Aggregator`].
///
/// Pages are fetched strictly one after another. Before each fetch the
/// timeout is checked, then the page budget. The record budget is checked
/// per in-region record. The run ends naturally on an empty page or a page
/// shorter than the page size.
///
/// On a failed fetch or cancellation, all state of the run is dropped and
/// an error is returned; partial results are only ever returned for budget
/// truncation, flagged in the report.
#[allow(clippy::too_many_arguments)]
pub async fn collect<S, C, P>(
    source: &S,
    request: &CollectRequest,
    region: &Region,
    classifier: &mut Classifier,
    budget: &CollectBudget,
    clock: &C,
    cancel: &CancellationToken,
    reporter: &P,
) -> Result<Collection, CollectError>
where
    S: AssetSource,
    C: Clock + ?Sized,
    P: ProgressReporter + ?Sized,
{
    let started = clock.now();
    let mut aggregator = Aggregator::new();
    let mut report = CollectReport::default();
    let mut page_request = PageRequest {
        country: request.country.clone(),
        year: request.year,
        gas: request.gas,
        limit: budget.page_size.max(1),
        offset: 0,
    };

    info!(
        country = %request.country,
        year = request.year,
        gas = %request.gas,
        page_size = page_request.limit,
        "Collecting assets"
    );

    let mut page_index = 0;
    'pages: loop {
        if let Some(timeout) = budget.timeout {
            if clock.now().duration_since(started) >= timeout {
                report.stop(StopReason::Timeout);
                break;
            }
        }
        if let Some(max_pages) = budget.max_pages {
            if page_index >= max_pages {
                report.stop(StopReason::MaxPages);
                break;
            }
        }

        reporter.report(CollectEvent::PageRequested {
            page: page_index,
            offset: page_request.offset,
        });

        let page = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(page = page_index + 1, "Collection cancelled");
                return Err(CollectError::Cancelled);
            }

            result = source.fetch_page(&page_request) => result?,
        };
        report.pages_fetched += 1;

        let records = page.assets.len();
        if records == 0 {
            break;
        }

        for asset in &page.assets {
            report.assets_scanned += 1;

            let Some(raw) = asset
                .centroid
                .filter(|(a, b)| a.is_finite() && b.is_finite())
            else {
                report.dropped_coordinates += 1;
                continue;
            };
            let Some((point, orientation)) = normalize_oriented(raw, Some(region.bbox())) else {
                continue;
            };
            if !region.contains(&point) {
                continue;
            }

            if budget.max_assets.is_some_and(|max| report.in_region >= max) {
                report.stop(StopReason::MaxAssets);
                break 'pages;
            }
            report.in_region += 1;
            if orientation == Orientation::Swapped {
                report.swapped_coordinates += 1;
            }

            let classification = classifier.classify(&asset.sector);
            let value = asset.quantity(request.gas).unwrap_or(0.0);
            if aggregator.add(&classification, value) {
                report.aggregated += 1;
            }
        }

        reporter.report(CollectEvent::PageProcessed {
            page: page_index,
            records,
            report: &report,
        });

        if records < page_request.limit {
            break;
        }
        page_request = page_request.next();
        page_index += 1;
    }

    report.elapsed_ms = clock.now().duration_since(started).as_millis() as u64;
    if let Some(reason) = report.stopped_by {
        reporter.report(CollectEvent::BudgetExhausted { reason });
    }
    reporter.report(CollectEvent::Finished { report: &report });

    Ok(Collection { aggregator, report })
}
