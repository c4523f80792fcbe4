//! Single-pass accumulation of classified records.

use crate::taxonomy::{Classification, ClassificationFlags, Sector, Tier};

use super::types::{
    share_of, AfoluBalance, InventoryScope, InventoryTotals, ScopePolicy, SectorTotal,
    SubsectorTotal,
};

/// Running sum for one subsector.
#[derive(Debug, Clone)]
struct SubsectorAccumulator {
    code: Option<&'static str>,
    group: Option<&'static str>,
    name: &'static str,
    flags: ClassificationFlags,
    tier: Tier,
    notes: &'static str,
    total: f64,
    records: usize,
}

impl SubsectorAccumulator {
    fn new(classification: &Classification) -> Self {
        let node = &classification.node;
        Self {
            code: node.subsector,
            group: node.group,
            name: node.name,
            flags: classification.flags,
            tier: node.tier,
            notes: node.notes,
            total: 0.0,
            records: 0,
        }
    }

    /// Records share a bucket only when their flags agree, so a bunker or
    /// stock-change label never inherits another record's scope.
    fn matches(&self, classification: &Classification) -> bool {
        self.code == classification.node.subsector
            && self.name == classification.node.name
            && self.flags == classification.flags
    }

    fn to_total(&self) -> SubsectorTotal {
        SubsectorTotal {
            ipcc_code: self.code,
            group_code: self.group,
            name: self.name,
            total: self.total,
            share: 0.0,
            records: self.records,
            ipcc_flags: self.flags,
            tier: self.tier,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone)]
struct SectorAccumulator {
    sector: Sector,
    subsectors: Vec<SubsectorAccumulator>,
}

/// Accumulates classified records into sector and subsector totals.
///
/// Accumulators are created on first sight, so discovery order is kept for
/// tie-breaking when the output is sorted. Stock-change records are kept in
/// their own list and never enter the sector accumulators.
///
/// # Example
///
/// ```
/// use emitscope::inventory::{Aggregator, InventoryScope, ScopePolicy};
/// use emitscope::taxonomy::Classifier;
///
/// let mut classifier = Classifier::new();
/// let mut aggregator = Aggregator::new();
/// aggregator.add(&classifier.classify("road-transportation"), 100.0);
/// aggregator.add(&classifier.classify("international-aviation"), 50.0);
///
/// let totals = aggregator.totals(&ScopePolicy::default());
/// assert_eq!(totals.restricted, 100.0);
/// assert_eq!(totals.international_bunkers, 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    sectors: Vec<SectorAccumulator>,
    stock_change: Vec<SubsectorAccumulator>,
    aggregated: usize,
    skipped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record's value.
    ///
    /// Returns `false` if the value was unusable: non-finite values are
    /// always skipped, zero is skipped for stock change, and non-positive
    /// values are skipped for everything else.
    pub fn add(&mut self, classification: &Classification, value: f64) -> bool {
        let usable = if classification.flags.is_stock_change {
            value.is_finite() && value != 0.0
        } else {
            value.is_finite() && value > 0.0
        };
        if !usable {
            self.skipped += 1;
            return false;
        }

        let accumulator = if classification.flags.is_stock_change {
            subsector_entry(&mut self.stock_change, classification)
        } else {
            let sector = classification.node.sector;
            let index = match self.sectors.iter().position(|s| s.sector == sector) {
                Some(index) => index,
                None => {
                    self.sectors.push(SectorAccumulator {
                        sector,
                        subsectors: Vec::new(),
                    });
                    self.sectors.len() - 1
                }
            };
            subsector_entry(&mut self.sectors[index].subsectors, classification)
        };

        accumulator.total += value;
        accumulator.records += 1;
        self.aggregated += 1;
        true
    }

    /// Records that contributed a value.
    pub fn aggregated(&self) -> usize {
        self.aggregated
    }

    /// Records rejected for an unusable value.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Totals under every scope.
    pub fn totals(&self, policy: &ScopePolicy) -> InventoryTotals {
        let mut totals = InventoryTotals::default();
        for subsector in self.sectors.iter().flat_map(|s| s.subsectors.iter()) {
            if InventoryScope::Ipcc.counts(&subsector.flags, policy) {
                totals.restricted += subsector.total;
            }
            if InventoryScope::Extended.counts(&subsector.flags, policy) {
                totals.extended += subsector.total;
            }
            if subsector.flags.is_international_bunker {
                totals.international_bunkers += subsector.total;
            }
        }
        totals.stock_change = sum(self.stock_change.iter().map(|s| s.total));
        totals
    }

    /// Sector breakdown for a scope, sorted by descending total.
    ///
    /// Only subsectors counted by the scope appear, so sector totals sum to
    /// the scope total. Sector shares are relative to the scope total and
    /// subsector shares to their sector.
    pub fn breakdown(&self, scope: InventoryScope, policy: &ScopePolicy) -> Vec<SectorTotal> {
        let mut sectors: Vec<SectorTotal> = self
            .sectors
            .iter()
            .filter_map(|sector| {
                let mut subsectors: Vec<SubsectorTotal> = sector
                    .subsectors
                    .iter()
                    .filter(|s| scope.counts(&s.flags, policy))
                    .map(SubsectorAccumulator::to_total)
                    .collect();
                if subsectors.is_empty() {
                    return None;
                }

                let total: f64 = subsectors.iter().map(|s| s.total).sum();
                for subsector in &mut subsectors {
                    subsector.share = share_of(subsector.total, total);
                }
                sort_descending(&mut subsectors, |s| s.total);

                Some(SectorTotal {
                    sector: sector.sector,
                    ipcc_code: sector.sector.code(),
                    name: sector.sector.name(),
                    total,
                    share: 0.0,
                    subsectors,
                })
            })
            .collect();

        let grand_total: f64 = sectors.iter().map(|s| s.total).sum();
        for sector in &mut sectors {
            sector.share = share_of(sector.total, grand_total);
        }
        sort_descending(&mut sectors, |s| s.total);
        sectors
    }

    /// International bunker subsectors, reported outside the national total.
    pub fn memo_items(&self) -> Vec<SubsectorTotal> {
        let mut items: Vec<SubsectorTotal> = self
            .sectors
            .iter()
            .flat_map(|s| s.subsectors.iter())
            .filter(|s| s.flags.is_international_bunker)
            .map(SubsectorAccumulator::to_total)
            .collect();

        let total: f64 = items.iter().map(|s| s.total).sum();
        for item in &mut items {
            item.share = share_of(item.total, total);
        }
        sort_descending(&mut items, |s| s.total);
        items
    }

    /// Stock-change subsectors, sorted by descending magnitude.
    ///
    /// Values may be negative, so shares are taken against the sum of
    /// magnitudes.
    pub fn stock_change_breakdown(&self) -> Vec<SubsectorTotal> {
        let mut items: Vec<SubsectorTotal> = self
            .stock_change
            .iter()
            .map(SubsectorAccumulator::to_total)
            .collect();

        let magnitude: f64 = items.iter().map(|s| s.total.abs()).sum();
        for item in &mut items {
            item.share = share_of(item.total.abs(), magnitude);
        }
        sort_descending(&mut items, |s| s.total.abs());
        items
    }

    /// Gross AFOLU emissions in a scope against net stock change.
    pub fn afolu_balance(&self, scope: InventoryScope, policy: &ScopePolicy) -> AfoluBalance {
        let gross_emissions = sum(
            self.sectors
                .iter()
                .filter(|s| s.sector == Sector::Afolu)
                .flat_map(|s| s.subsectors.iter())
                .filter(|s| scope.counts(&s.flags, policy))
                .map(|s| s.total),
        );
        let net_stock_change = sum(self.stock_change.iter().map(|s| s.total));

        AfoluBalance {
            gross_emissions,
            net_stock_change,
            net: gross_emissions + net_stock_change,
        }
    }
}

fn subsector_entry<'a>(
    accumulators: &'a mut Vec<SubsectorAccumulator>,
    classification: &Classification,
) -> &'a mut SubsectorAccumulator {
    let index = match accumulators.iter().position(|a| a.matches(classification)) {
        Some(index) => index,
        None => {
            accumulators.push(SubsectorAccumulator::new(classification));
            accumulators.len() - 1
        }
    };
    &mut accumulators[index]
}

/// Sum starting from positive zero. `Iterator::sum` of nothing is `-0.0`.
fn sum(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| acc + v)
}

/// Stable sort, largest key first.
fn sort_descending<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}
