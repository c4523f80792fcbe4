//! Terminal progress for inventory collection.

use std::time::Duration;

use emitscope::collect::{CollectEvent, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed}] {msg}";

/// Shows a spinner with the page being fetched and running counts.
///
/// Hidden when stderr is not a terminal or when disabled.
pub struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message("Resolving region...");
        Self { bar }
    }

    /// Clear the spinner, e.g. when the request fails before collection ends.
    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, event: CollectEvent<'_>) {
        match event {
            CollectEvent::PageRequested { page, offset } => {
                self.bar
                    .set_message(format!("Fetching page {} (offset {})", page + 1, offset));
            }
            CollectEvent::PageProcessed {
                page,
                records,
                report,
            } => {
                self.bar.set_message(format!(
                    "Page {}: {} records, {} scanned, {} in region",
                    page + 1,
                    records,
                    report.assets_scanned,
                    report.in_region
                ));
            }
            CollectEvent::BudgetExhausted { reason } => {
                self.bar
                    .println(format!("Collection stopped early: {} limit reached", reason));
            }
            CollectEvent::Finished { .. } => self.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emitscope::collect::{CollectReport, StopReason};

    #[test]
    fn test_hidden_reporter_accepts_events() {
        let reporter = SpinnerReporter::new(false);
        let report = CollectReport::default();
        reporter.report(CollectEvent::PageRequested { page: 0, offset: 0 });
        reporter.report(CollectEvent::PageProcessed {
            page: 0,
            records: 3,
            report: &report,
        });
        reporter.report(CollectEvent::BudgetExhausted {
            reason: StopReason::MaxPages,
        });
        reporter.report(CollectEvent::Finished { report: &report });
        assert!(reporter.bar.is_finished());
    }
}
