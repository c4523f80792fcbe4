//! Inventory value types: gases, scopes, and breakdown rows.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::taxonomy::{ClassificationFlags, Sector, Tier};

/// Gas keys accepted by the asset source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gas {
    #[serde(rename = "co2")]
    Co2,
    #[serde(rename = "ch4")]
    Ch4,
    #[serde(rename = "n2o")]
    N2o,
    #[serde(rename = "co2e_100yr")]
    Co2e100yr,
    #[serde(rename = "co2e_20yr")]
    Co2e20yr,
}

impl Gas {
    pub const ALL: [Gas; 5] = [Gas::Co2, Gas::Ch4, Gas::N2o, Gas::Co2e100yr, Gas::Co2e20yr];

    /// Key used in the upstream `EmissionsSummary` records.
    pub fn key(&self) -> &'static str {
        match self {
            Gas::Co2 => "co2",
            Gas::Ch4 => "ch4",
            Gas::N2o => "n2o",
            Gas::Co2e100yr => "co2e_100yr",
            Gas::Co2e20yr => "co2e_20yr",
        }
    }

    /// Unit label for quantities of this gas.
    pub fn unit(&self) -> &'static str {
        match self {
            Gas::Co2 => "t CO2",
            Gas::Ch4 => "t CH4",
            Gas::N2o => "t N2O",
            Gas::Co2e100yr => "t CO2e (100-yr GWP)",
            Gas::Co2e20yr => "t CO2e (20-yr GWP)",
        }
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Gas {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Gas::ALL
            .into_iter()
            .find(|gas| gas.key() == key)
            .ok_or_else(|| format!("unknown gas '{}'", s))
    }
}

/// Which categories contribute to the headline total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryScope {
    /// IPCC national-inventory scope: bunkers and stock change excluded.
    #[default]
    Ipcc,
    /// IPCC scope plus the categories enabled by [`ScopePolicy`].
    Extended,
}

impl InventoryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryScope::Ipcc => "ipcc",
            InventoryScope::Extended => "extended",
        }
    }

    /// Human-readable description of what the scope counts.
    pub fn description(&self, policy: &ScopePolicy) -> &'static str {
        match (self, policy.extended_includes_bunkers) {
            (InventoryScope::Ipcc, _) => {
                "IPCC inventory (excludes international bunkers and carbon stock change)"
            }
            (InventoryScope::Extended, true) => {
                "Extended inventory (includes international bunkers, excludes carbon stock change)"
            }
            (InventoryScope::Extended, false) => {
                "Extended inventory (same categories as IPCC under the current policy)"
            }
        }
    }

    /// Returns true if a category with these flags counts towards the scope.
    ///
    /// Stock-change categories never count; they are reported on their own.
    pub fn counts(&self, flags: &ClassificationFlags, policy: &ScopePolicy) -> bool {
        if flags.is_stock_change {
            return false;
        }
        match self {
            InventoryScope::Ipcc => flags.included_in_total,
            InventoryScope::Extended => {
                flags.included_in_total
                    || (policy.extended_includes_bunkers && flags.is_international_bunker)
            }
        }
    }
}

impl fmt::Display for InventoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ipcc" => Ok(InventoryScope::Ipcc),
            "extended" => Ok(InventoryScope::Extended),
            _ => Err(format!("unknown inventory scope '{}'", s)),
        }
    }
}

/// Categories the extended scope adds on top of the IPCC scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScopePolicy {
    /// Count international aviation and shipping in the extended total.
    pub extended_includes_bunkers: bool,
}

/// One subsector row of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsectorTotal {
    pub ipcc_code: Option<&'static str>,
    pub group_code: Option<&'static str>,
    pub name: &'static str,
    pub total: f64,
    /// Share of the parent sector total (or of the list total for memo and
    /// stock-change lists).
    pub share: f64,
    pub records: usize,
    pub ipcc_flags: ClassificationFlags,
    pub tier: Tier,
    pub notes: &'static str,
}

/// One sector row of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorTotal {
    pub sector: Sector,
    pub ipcc_code: &'static str,
    pub name: &'static str,
    pub total: f64,
    /// Share of the scope total.
    pub share: f64,
    pub subsectors: Vec<SubsectorTotal>,
}

/// The totals under every scope definition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InventoryTotals {
    /// IPCC scope.
    pub restricted: f64,
    pub extended: f64,
    /// Net carbon stock change, may be negative.
    pub stock_change: f64,
    /// International aviation and shipping.
    pub international_bunkers: f64,
}

impl InventoryTotals {
    /// The headline total for a scope.
    pub fn for_scope(&self, scope: InventoryScope) -> f64 {
        match scope {
            InventoryScope::Ipcc => self.restricted,
            InventoryScope::Extended => self.extended,
        }
    }
}

/// Gross AFOLU emissions against net land-use stock change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AfoluBalance {
    pub gross_emissions: f64,
    pub net_stock_change: f64,
    pub net: f64,
}

/// `part / whole`, or 0 when the whole is zero.
pub(crate) fn share_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(bunker: bool, stock: bool) -> ClassificationFlags {
        ClassificationFlags {
            included_in_total: !bunker && !stock,
            is_international_bunker: bunker,
            is_stock_change: stock,
            is_residual_category: false,
        }
    }

    #[test]
    fn test_gas_parse_and_key() {
        assert_eq!("co2e_100yr".parse::<Gas>().unwrap(), Gas::Co2e100yr);
        assert_eq!(" CH4 ".parse::<Gas>().unwrap(), Gas::Ch4);
        assert!("co2e".parse::<Gas>().is_err());
        assert_eq!(Gas::N2o.to_string(), "n2o");
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!("IPCC".parse::<InventoryScope>().unwrap(), InventoryScope::Ipcc);
        assert_eq!(
            "extended".parse::<InventoryScope>().unwrap(),
            InventoryScope::Extended
        );
        assert!("national".parse::<InventoryScope>().is_err());
    }

    #[test]
    fn test_scope_counts_default_policy() {
        let policy = ScopePolicy::default();
        for scope in [InventoryScope::Ipcc, InventoryScope::Extended] {
            assert!(scope.counts(&flags(false, false), &policy));
            assert!(!scope.counts(&flags(true, false), &policy));
            assert!(!scope.counts(&flags(false, true), &policy));
        }
    }

    #[test]
    fn test_extended_with_bunkers() {
        let policy = ScopePolicy {
            extended_includes_bunkers: true,
        };
        assert!(InventoryScope::Extended.counts(&flags(true, false), &policy));
        assert!(!InventoryScope::Ipcc.counts(&flags(true, false), &policy));
        assert!(!InventoryScope::Extended.counts(&flags(false, true), &policy));
    }

    #[test]
    fn test_share_of_zero_whole() {
        assert_eq!(share_of(5.0, 0.0), 0.0);
        assert_eq!(share_of(5.0, 20.0), 0.25);
    }

    #[test]
    fn test_totals_for_scope() {
        let totals = InventoryTotals {
            restricted: 10.0,
            extended: 12.0,
            stock_change: -3.0,
            international_bunkers: 2.0,
        };
        assert_eq!(totals.for_scope(InventoryScope::Ipcc), 10.0);
        assert_eq!(totals.for_scope(InventoryScope::Extended), 12.0);
    }
}
