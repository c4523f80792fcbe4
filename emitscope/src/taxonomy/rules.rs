//! Static classification tables.
//!
//! Two ordered lists of substring rules, evaluated top to bottom with the
//! first match winning:
//!
//! - [`OVERRIDE_RULES`]: exact Climate TRACE subsector labels mapped to the
//!   most specific IPCC 2006 category available
//! - [`GENERIC_RULES`]: coarse keywords mapped to a parent category, for
//!   labels the override table does not know
//!
//! Order is significant. Where one pattern is a substring of another
//! (`residential-onsite` inside `non-residential-onsite`, `oil` inside
//! `soil`, `waste` inside `wastewater`), the longer pattern must come first.

use serde::Serialize;

/// IPCC 2006 top-level sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    /// 1 - Energy
    Energy,
    /// 2 - Industrial processes and product use
    Ippu,
    /// 3 - Agriculture, forestry and other land use
    Afolu,
    /// 4 - Waste
    Waste,
    /// Labels no rule matched.
    Other,
}

impl Sector {
    /// IPCC sector code, or `"other"` for residual records.
    pub fn code(&self) -> &'static str {
        match self {
            Sector::Energy => "1",
            Sector::Ippu => "2",
            Sector::Afolu => "3",
            Sector::Waste => "4",
            Sector::Other => "other",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Energy => "Energy",
            Sector::Ippu => "Industrial Processes and Product Use",
            Sector::Afolu => "Agriculture, Forestry and Other Land Use",
            Sector::Waste => "Waste",
            Sector::Other => "Other",
        }
    }
}

/// Estimation tier of the upstream data for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    #[serde(rename = "tier1")]
    Tier1,
    #[serde(rename = "tier2")]
    Tier2,
    #[serde(rename = "tier3")]
    Tier3,
}

/// One substring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyRule {
    /// Lowercase substring matched against the folded label.
    pub pattern: &'static str,
    pub sector: Sector,
    /// IPCC category code of the matched subsector.
    pub subsector: &'static str,
    /// Parent category code.
    pub group: &'static str,
    pub name: &'static str,
    pub tier: Tier,
    pub notes: &'static str,
}

impl TaxonomyRule {
    const fn new(
        pattern: &'static str,
        sector: Sector,
        subsector: &'static str,
        group: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            pattern,
            sector,
            subsector,
            group,
            name,
            tier: Tier::Tier1,
            notes: "",
        }
    }

    const fn tier(self, tier: Tier) -> Self {
        Self { tier, ..self }
    }

    const fn notes(self, notes: &'static str) -> Self {
        Self { notes, ..self }
    }
}

use Sector::{Afolu, Energy, Ippu, Waste};

const FACILITY: &str = "Facility-level estimates";
const REMOTE_SENSING: &str = "Remote-sensing estimates";
const MEMO_ITEM: &str = "Memo item, excluded from national totals";
const STOCK_CHANGE: &str = "Carbon stock change, reported separately";

/// Specific subsector labels. Checked before [`GENERIC_RULES`].
pub const OVERRIDE_RULES: &[TaxonomyRule] = &[
    // Energy industries
    TaxonomyRule::new("electricity-generation", Energy, "1.A.1.a", "1.A.1", "Electricity and heat production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("heat-plants", Energy, "1.A.1.a", "1.A.1", "Electricity and heat production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("oil-and-gas-refining", Energy, "1.A.1.b", "1.A.1", "Petroleum refining")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("solid-fuel-transformation", Energy, "1.A.1.c", "1.A.1", "Manufacture of solid fuels")
        .tier(Tier::Tier2),
    // Transport
    TaxonomyRule::new("international-aviation", Energy, "1.A.3.a.i", "1.A.3.a", "International aviation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("domestic-aviation", Energy, "1.A.3.a.ii", "1.A.3.a", "Domestic aviation")
        .tier(Tier::Tier2),
    TaxonomyRule::new("road-transportation", Energy, "1.A.3.b", "1.A.3", "Road transportation")
        .tier(Tier::Tier2),
    TaxonomyRule::new("railways", Energy, "1.A.3.c", "1.A.3", "Railways"),
    TaxonomyRule::new("international-shipping", Energy, "1.A.3.d.i", "1.A.3.d", "International water-borne navigation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("domestic-shipping", Energy, "1.A.3.d.ii", "1.A.3.d", "Domestic water-borne navigation")
        .tier(Tier::Tier2),
    // Space-separated forms of the bunker labels
    TaxonomyRule::new("international aviation", Energy, "1.A.3.a.i", "1.A.3.a", "International aviation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("international shipping", Energy, "1.A.3.d.i", "1.A.3.d", "International water-borne navigation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("international navigation", Energy, "1.A.3.d.i", "1.A.3.d", "International water-borne navigation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("international-navigation", Energy, "1.A.3.d.i", "1.A.3.d", "International water-borne navigation")
        .tier(Tier::Tier2)
        .notes(MEMO_ITEM),
    TaxonomyRule::new("other-transport", Energy, "1.A.3.e", "1.A.3", "Other transportation"),
    // Other sectors
    TaxonomyRule::new("non-residential-onsite-fuel-usage", Energy, "1.A.4.a", "1.A.4", "Commercial and institutional"),
    TaxonomyRule::new("residential-onsite-fuel-usage", Energy, "1.A.4.b", "1.A.4", "Residential"),
    TaxonomyRule::new("other-onsite-fuel-usage", Energy, "1.A.5", "1.A", "Non-specified fuel combustion"),
    TaxonomyRule::new("other-energy-use", Energy, "1.A.5", "1.A", "Non-specified fuel combustion"),
    // Fugitive emissions
    TaxonomyRule::new("coal-mining", Energy, "1.B.1.a", "1.B.1", "Coal mining and handling")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("oil-and-gas-production", Energy, "1.B.2.a", "1.B.2", "Oil and gas production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("oil-and-gas-transport", Energy, "1.B.2.b", "1.B.2", "Oil and gas transport")
        .tier(Tier::Tier2),
    TaxonomyRule::new("other-fossil-fuel-operations", Energy, "1.B.3", "1.B", "Other fugitive emissions"),
    // Industrial processes
    TaxonomyRule::new("cement", Ippu, "2.A.1", "2.A", "Cement production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("lime", Ippu, "2.A.2", "2.A", "Lime production"),
    TaxonomyRule::new("glass", Ippu, "2.A.3", "2.A", "Glass production"),
    TaxonomyRule::new("petrochemical-steam-cracking", Ippu, "2.B.8", "2.B", "Petrochemical production")
        .tier(Tier::Tier3),
    TaxonomyRule::new("iron-manufacturing", Ippu, "2.C.1", "2.C", "Iron and steel production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("steel", Ippu, "2.C.1", "2.C", "Iron and steel production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("aluminum", Ippu, "2.C.3", "2.C", "Aluminium production")
        .tier(Tier::Tier3)
        .notes(FACILITY),
    TaxonomyRule::new("fluorinated-gases", Ippu, "2.F", "2", "Product uses as substitutes for ODS"),
    TaxonomyRule::new("pulp-and-paper", Ippu, "2.H.1", "2.H", "Pulp and paper industry")
        .tier(Tier::Tier3),
    TaxonomyRule::new("food-beverage-tobacco", Ippu, "2.H.2", "2.H", "Food and beverages industry"),
    // Livestock and agricultural soils
    TaxonomyRule::new("enteric-fermentation", Afolu, "3.A.1", "3.A", "Enteric fermentation")
        .tier(Tier::Tier2),
    TaxonomyRule::new("manure-management", Afolu, "3.A.2", "3.A", "Manure management")
        .tier(Tier::Tier2),
    TaxonomyRule::new("manure-left-on-pasture", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("manure-applied-to-soils", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("synthetic-fertilizer-application", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("crop-residues", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("other-agricultural-soil-emissions", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("rice-cultivation", Afolu, "3.C.7", "3.C", "Rice cultivation")
        .tier(Tier::Tier2),
    // Biomass burning
    TaxonomyRule::new("forest-land-fires", Afolu, "3.C.1.a", "3.C.1", "Biomass burning in forest land")
        .tier(Tier::Tier2)
        .notes(REMOTE_SENSING),
    TaxonomyRule::new("cropland-fires", Afolu, "3.C.1.b", "3.C.1", "Biomass burning in cropland")
        .tier(Tier::Tier2)
        .notes(REMOTE_SENSING),
    TaxonomyRule::new("shrubgrass-fires", Afolu, "3.C.1.c", "3.C.1", "Biomass burning in grassland")
        .tier(Tier::Tier2)
        .notes(REMOTE_SENSING),
    TaxonomyRule::new("wetland-fires", Afolu, "3.C.1.d", "3.C.1", "Biomass burning in other land")
        .tier(Tier::Tier2)
        .notes(REMOTE_SENSING),
    // Land use, stock change
    TaxonomyRule::new("net-forest-land", Afolu, "3.B.1", "3.B", "Forest land")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("forest-land-clearing", Afolu, "3.B.1", "3.B", "Forest land")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("forest-land-degradation", Afolu, "3.B.1", "3.B", "Forest land")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("removals", Afolu, "3.B.1", "3.B", "Forest land")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("net-shrubgrass", Afolu, "3.B.3", "3.B", "Grassland")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("net-wetland", Afolu, "3.B.4", "3.B", "Wetlands")
        .tier(Tier::Tier2)
        .notes(STOCK_CHANGE),
    TaxonomyRule::new("water-reservoirs", Afolu, "3.B.4.b", "3.B.4", "Flooded land")
        .tier(Tier::Tier2),
    // Waste
    TaxonomyRule::new("solid-waste-disposal", Waste, "4.A", "4", "Solid waste disposal")
        .tier(Tier::Tier2),
    TaxonomyRule::new("biological-treatment", Waste, "4.B", "4", "Biological treatment of solid waste"),
    TaxonomyRule::new("incineration-and-open-burning", Waste, "4.C", "4", "Incineration and open burning of waste"),
    TaxonomyRule::new("domestic-wastewater", Waste, "4.D.1", "4.D", "Domestic wastewater treatment and discharge"),
    TaxonomyRule::new("industrial-wastewater", Waste, "4.D.2", "4.D", "Industrial wastewater treatment and discharge"),
];

/// Coarse keywords. Checked only when no override matched.
pub const GENERIC_RULES: &[TaxonomyRule] = &[
    // Waste
    TaxonomyRule::new("wastewater", Waste, "4.D", "4", "Wastewater treatment and discharge"),
    TaxonomyRule::new("landfill", Waste, "4.A", "4", "Solid waste disposal"),
    TaxonomyRule::new("incinerat", Waste, "4.C", "4", "Incineration and open burning of waste"),
    TaxonomyRule::new("waste", Waste, "4", "4", "Waste"),
    TaxonomyRule::new("fluorinated", Ippu, "2.F", "2", "Product uses as substitutes for ODS"),
    // Agriculture
    TaxonomyRule::new("soil", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("fertili", Afolu, "3.C.4", "3.C", "Direct N2O from managed soils"),
    TaxonomyRule::new("enteric", Afolu, "3.A.1", "3.A", "Enteric fermentation"),
    TaxonomyRule::new("manure", Afolu, "3.A.2", "3.A", "Manure management"),
    TaxonomyRule::new("livestock", Afolu, "3.A", "3", "Livestock"),
    TaxonomyRule::new("rice", Afolu, "3.C.7", "3.C", "Rice cultivation"),
    TaxonomyRule::new("agricultur", Afolu, "3.C", "3", "Aggregate sources and non-CO2 emissions on land"),
    // Biomass burning before land classes so "<land>-fires" lands here
    TaxonomyRule::new("fire", Afolu, "3.C.1", "3.C", "Biomass burning"),
    TaxonomyRule::new("burning", Afolu, "3.C.1", "3.C", "Biomass burning"),
    // Land
    TaxonomyRule::new("forestry", Afolu, "3.B", "3", "Land"),
    TaxonomyRule::new("forest", Afolu, "3.B.1", "3.B", "Forest land"),
    TaxonomyRule::new("cropland", Afolu, "3.B.2", "3.B", "Cropland"),
    TaxonomyRule::new("shrubgrass", Afolu, "3.B.3", "3.B", "Grassland"),
    TaxonomyRule::new("grassland", Afolu, "3.B.3", "3.B", "Grassland"),
    TaxonomyRule::new("wetland", Afolu, "3.B.4", "3.B", "Wetlands"),
    TaxonomyRule::new("reservoir", Afolu, "3.B.4.b", "3.B.4", "Flooded land"),
    TaxonomyRule::new("land", Afolu, "3.B", "3", "Land"),
    // Transport
    TaxonomyRule::new("aviation", Energy, "1.A.3.a", "1.A.3", "Civil aviation"),
    TaxonomyRule::new("shipping", Energy, "1.A.3.d", "1.A.3", "Water-borne navigation"),
    TaxonomyRule::new("navigation", Energy, "1.A.3.d", "1.A.3", "Water-borne navigation"),
    TaxonomyRule::new("rail", Energy, "1.A.3.c", "1.A.3", "Railways"),
    TaxonomyRule::new("road", Energy, "1.A.3.b", "1.A.3", "Road transportation"),
    TaxonomyRule::new("transport", Energy, "1.A.3", "1.A", "Transport"),
    // Energy industries
    TaxonomyRule::new("electricity", Energy, "1.A.1", "1.A", "Energy industries"),
    TaxonomyRule::new("power", Energy, "1.A.1", "1.A", "Energy industries"),
    TaxonomyRule::new("heat-", Energy, "1.A.1", "1.A", "Energy industries"),
    TaxonomyRule::new("refin", Energy, "1.A.1.b", "1.A.1", "Petroleum refining"),
    // Fugitive
    TaxonomyRule::new("coal", Energy, "1.B.1", "1.B", "Solid fuels"),
    TaxonomyRule::new("oil", Energy, "1.B.2", "1.B", "Oil and natural gas"),
    TaxonomyRule::new("gas", Energy, "1.B.2", "1.B", "Oil and natural gas"),
    TaxonomyRule::new("fossil", Energy, "1.B", "1", "Fugitive emissions from fuels"),
    // Mining
    TaxonomyRule::new("extraction", Energy, "1.A.2.i", "1.A.2", "Mining and quarrying"),
    TaxonomyRule::new("mining", Energy, "1.A.2.i", "1.A.2", "Mining and quarrying"),
    TaxonomyRule::new("quarry", Energy, "1.A.2.i", "1.A.2", "Mining and quarrying"),
    // Industry
    TaxonomyRule::new("mineral", Ippu, "2.A", "2", "Mineral industry"),
    TaxonomyRule::new("chemical", Ippu, "2.B", "2", "Chemical industry"),
    TaxonomyRule::new("iron", Ippu, "2.C.1", "2.C", "Iron and steel production"),
    TaxonomyRule::new("metal", Ippu, "2.C", "2", "Metal industry"),
    TaxonomyRule::new("paper", Ippu, "2.H.1", "2.H", "Pulp and paper industry"),
    TaxonomyRule::new("food", Ippu, "2.H.2", "2.H", "Food and beverages industry"),
    TaxonomyRule::new("textile", Ippu, "2.H", "2", "Other industrial processes"),
    TaxonomyRule::new("wood", Ippu, "2.H", "2", "Other industrial processes"),
    TaxonomyRule::new("manufactur", Ippu, "2.H", "2", "Other industrial processes"),
    // Fuel combustion in other sectors
    TaxonomyRule::new("residential", Energy, "1.A.4.b", "1.A.4", "Residential"),
    TaxonomyRule::new("building", Energy, "1.A.4", "1.A", "Other sectors"),
    TaxonomyRule::new("fuel", Energy, "1.A.4", "1.A", "Other sectors"),
];

/// Substrings marking international bunker categories.
pub const BUNKER_MARKERS: &[&str] = &[
    "international-aviation",
    "international aviation",
    "international-shipping",
    "international shipping",
    "international-navigation",
    "international navigation",
];

/// Substrings marking one-off land-use carbon stock change categories.
pub const STOCK_CHANGE_MARKERS: &[&str] = &[
    "net-forest",
    "net-shrubgrass",
    "net-grassland",
    "net-wetland",
    "net-cropland",
    "forest-land-clearing",
    "forest-land-degradation",
    "removals",
    "carbon-stock",
];
