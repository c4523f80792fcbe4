//! Label classification.

use std::collections::BTreeSet;

use serde::Serialize;

use super::rules::{
    Sector, TaxonomyRule, Tier, BUNKER_MARKERS, GENERIC_RULES, OVERRIDE_RULES,
    STOCK_CHANGE_MARKERS,
};

/// Which table produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Override,
    Generic,
    Residual,
}

/// The taxonomy position of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyNode {
    pub sector: Sector,
    /// IPCC category code; `None` for residual labels.
    pub subsector: Option<&'static str>,
    /// Parent category code; `None` for residual labels.
    pub group: Option<&'static str>,
    pub name: &'static str,
    pub tier: Tier,
    pub notes: &'static str,
    pub source: MatchSource,
}

impl TaxonomyNode {
    /// The node for labels no rule matched.
    pub const RESIDUAL: TaxonomyNode = TaxonomyNode {
        sector: Sector::Other,
        subsector: None,
        group: None,
        name: "Unclassified",
        tier: Tier::Tier1,
        notes: "",
        source: MatchSource::Residual,
    };

    fn from_rule(rule: &TaxonomyRule, source: MatchSource) -> Self {
        Self {
            sector: rule.sector,
            subsector: Some(rule.subsector),
            group: Some(rule.group),
            name: rule.name,
            tier: rule.tier,
            notes: rule.notes,
            source,
        }
    }

    pub fn is_residual(&self) -> bool {
        self.source == MatchSource::Residual
    }
}

/// Inventory-scope flags of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassificationFlags {
    /// False for bunker and stock-change categories.
    pub included_in_total: bool,
    pub is_international_bunker: bool,
    pub is_stock_change: bool,
    pub is_residual_category: bool,
}

/// A classified label: taxonomy node plus scope flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub node: TaxonomyNode,
    pub flags: ClassificationFlags,
}

/// Case-fold and trim a raw label.
pub fn fold_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Look a label up in the override table, then the generic table.
///
/// Pure and total: every label, including the empty string, yields a node.
pub fn classify_label(raw: &str) -> TaxonomyNode {
    let label = fold_label(raw);
    first_match(OVERRIDE_RULES, &label)
        .map(|rule| TaxonomyNode::from_rule(rule, MatchSource::Override))
        .or_else(|| {
            first_match(GENERIC_RULES, &label)
                .map(|rule| TaxonomyNode::from_rule(rule, MatchSource::Generic))
        })
        .unwrap_or(TaxonomyNode::RESIDUAL)
}

/// Derive scope flags from the raw label.
///
/// Independent of the matched node, so residual labels still get bunker and
/// stock-change flags.
pub fn flags_for(raw: &str) -> ClassificationFlags {
    let label = fold_label(raw);
    let is_international_bunker = BUNKER_MARKERS.iter().any(|m| label.contains(m));
    let is_stock_change = STOCK_CHANGE_MARKERS.iter().any(|m| label.contains(m))
        || (label.contains("net") && label.contains("carbon stock"));
    let is_residual_category =
        first_match(OVERRIDE_RULES, &label).is_none() && first_match(GENERIC_RULES, &label).is_none();

    ClassificationFlags {
        included_in_total: !is_international_bunker && !is_stock_change,
        is_international_bunker,
        is_stock_change,
        is_residual_category,
    }
}

fn first_match<'a>(rules: &'a [TaxonomyRule], label: &str) -> Option<&'a TaxonomyRule> {
    rules.iter().find(|rule| label.contains(rule.pattern))
}

/// Per-request classifier that records unmapped labels for diagnostics.
#[derive(Debug, Default)]
pub struct Classifier {
    unmapped: BTreeSet<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a label, remembering it if no rule matched.
    pub fn classify(&mut self, raw: &str) -> Classification {
        let node = classify_label(raw);
        let flags = flags_for(raw);

        if node.is_residual() && self.unmapped.insert(fold_label(raw)) {
            tracing::debug!(label = raw, "Unmapped sector label");
        }

        Classification { node, flags }
    }

    /// Folded labels seen so far that matched no rule, sorted.
    pub fn unmapped(&self) -> &BTreeSet<String> {
        &self.unmapped
    }

    pub fn into_unmapped(self) -> Vec<String> {
        self.unmapped.into_iter().collect()
    }
}
