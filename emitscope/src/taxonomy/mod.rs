//! Sector classification.
//!
//! Maps free-text Climate TRACE sector labels onto IPCC 2006 categories and
//! derives the flags that decide which inventory scope a category counts
//! towards.
//!
//! # Lookup Order
//!
//! 1. [`OVERRIDE_RULES`] - specific subsector labels, first substring match wins
//! 2. [`GENERIC_RULES`] - coarse keywords, first substring match wins
//! 3. Residual node (`Sector::Other`, no subsector)
//!
//! Flags come from the raw label, not from the matched node, so a residual
//! label can still be recognised as a bunker or stock-change category.
//!
//! # Example
//!
//! ```
//! use emitscope::taxonomy::{Classifier, Sector};
//!
//! let mut classifier = Classifier::new();
//! let road = classifier.classify("road-transportation");
//! assert_eq!(road.node.sector, Sector::Energy);
//! assert!(road.flags.included_in_total);
//!
//! let aviation = classifier.classify("international-aviation");
//! assert!(aviation.flags.is_international_bunker);
//! ```

mod classifier;
mod rules;

pub use classifier::{
    classify_label, flags_for, fold_label, Classification, ClassificationFlags, Classifier,
    MatchSource, TaxonomyNode,
};
pub use rules::{
    Sector, TaxonomyRule, Tier, BUNKER_MARKERS, GENERIC_RULES, OVERRIDE_RULES,
    STOCK_CHANGE_MARKERS,
};
