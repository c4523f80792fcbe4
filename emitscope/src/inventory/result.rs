//! The assembled inventory returned to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collect::CollectReport;
use crate::source::RegionLevel;

use super::aggregate::Aggregator;
use super::types::{
    AfoluBalance, Gas, InventoryScope, InventoryTotals, ScopePolicy, SectorTotal, SubsectorTotal,
};

/// Name of the upstream dataset, echoed in result metadata.
pub const DATA_SOURCE: &str = "Climate TRACE v6 assets";

/// Which region an inventory covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionDescriptor {
    pub admin_id: String,
    pub name: String,
    pub full_name: String,
    pub level: RegionLevel,
    /// ISO3 code of the country, if the source reported one.
    pub country: Option<String>,
    /// Hierarchical code of the parent unit, if any.
    pub parent_code: Option<String>,
}

/// Static context of how the numbers were produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryMetadata {
    pub source: &'static str,
    pub scope_description: &'static str,
    pub policy: ScopePolicy,
    pub generated_at: DateTime<Utc>,
}

/// Non-fatal conditions observed while building the inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Sector labels that matched no rule, sorted.
    pub unmapped_sectors: Vec<String>,
    /// Records dropped for an unusable emission value.
    pub skipped_values: usize,
    pub collection: CollectReport,
}

/// A region-scoped, taxonomy-organised emissions inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryResult {
    pub region: RegionDescriptor,
    pub year: i32,
    pub gas: Gas,
    pub unit: &'static str,
    pub scope: InventoryScope,
    /// Headline total for `scope`.
    pub total: f64,
    pub totals: InventoryTotals,
    pub sectors: Vec<SectorTotal>,
    pub memo_items: Vec<SubsectorTotal>,
    pub stock_change: Vec<SubsectorTotal>,
    pub afolu: AfoluBalance,
    pub metadata: InventoryMetadata,
    pub diagnostics: Diagnostics,
}

/// Everything besides the aggregation needed to assemble a result.
#[derive(Debug, Clone)]
pub struct ResultContext {
    pub region: RegionDescriptor,
    pub year: i32,
    pub gas: Gas,
    pub scope: InventoryScope,
    pub policy: ScopePolicy,
    pub generated_at: DateTime<Utc>,
}

impl InventoryResult {
    /// Assemble the result from a finished aggregation.
    pub fn assemble(
        context: ResultContext,
        aggregator: &Aggregator,
        unmapped_sectors: Vec<String>,
        collection: CollectReport,
    ) -> Self {
        let ResultContext {
            region,
            year,
            gas,
            scope,
            policy,
            generated_at,
        } = context;
        let totals = aggregator.totals(&policy);

        Self {
            region,
            year,
            gas,
            unit: gas.unit(),
            scope,
            total: totals.for_scope(scope),
            totals,
            sectors: aggregator.breakdown(scope, &policy),
            memo_items: aggregator.memo_items(),
            stock_change: aggregator.stock_change_breakdown(),
            afolu: aggregator.afolu_balance(scope, &policy),
            metadata: InventoryMetadata {
                source: DATA_SOURCE,
                scope_description: scope.description(&policy),
                policy,
                generated_at,
            },
            diagnostics: Diagnostics {
                unmapped_sectors,
                skipped_values: aggregator.skipped(),
                collection,
            },
        }
    }

    /// True if the budget stopped collection before the source ran out.
    pub fn is_truncated(&self) -> bool {
        self.diagnostics.collection.truncated
    }
}
