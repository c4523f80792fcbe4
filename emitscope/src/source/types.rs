//! Records exchanged with the upstream inventory API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geometry::{Geometry, GeometryError};
use crate::inventory::Gas;

/// Errors from an upstream source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The upstream answered with a non-success status.
    #[error("Climate TRACE API error ({status}) from {url}{}", detail_suffix(.detail))]
    Http {
        status: u16,
        url: String,
        detail: Option<String>,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not what we expected.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The boundary could not be turned into a polygon geometry.
    #[error("Invalid boundary geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl SourceError {
    /// The HTTP status, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Administrative level of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLevel {
    Province,
    Department,
}

impl RegionLevel {
    /// Numeric GADM level used by the admin search endpoint.
    pub fn admin_level(&self) -> u8 {
        match self {
            RegionLevel::Province => 1,
            RegionLevel::Department => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLevel::Province => "province",
            RegionLevel::Department => "department",
        }
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "province" | "provincia" | "1" => Ok(RegionLevel::Province),
            "department" | "departamento" | "2" => Ok(RegionLevel::Department),
            _ => Err(format!("unknown region level '{}'", s)),
        }
    }
}

/// One page request against the asset endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// ISO3 country code.
    pub country: String,
    pub year: i32,
    pub gas: Gas,
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// The request for the page after this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            ..self.clone()
        }
    }
}

/// Emission quantity for one gas.
#[derive(Debug, Clone, PartialEq)]
pub struct GasQuantity {
    pub gas: String,
    /// `None` when absent or not a number.
    pub quantity: Option<f64>,
}

/// A point-located emission source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAsset")]
pub struct EmissionAsset {
    pub id: Option<String>,
    pub name: Option<String>,
    pub sector: String,
    /// Centroid pair as delivered; axis order is not trusted.
    pub centroid: Option<(f64, f64)>,
    pub emissions: Vec<GasQuantity>,
}

impl EmissionAsset {
    /// Quantity reported for a gas, if any.
    pub fn quantity(&self, gas: Gas) -> Option<f64> {
        self.emissions
            .iter()
            .find(|e| e.gas == gas.key())
            .and_then(|e| e.quantity)
    }
}

/// One page of assets. An empty page ends the listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assets: Vec<EmissionAsset>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<EmissionAsset>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<EmissionAsset>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// An administrative unit returned by the admin search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAdmin")]
pub struct AdminUnit {
    pub id: String,
    pub name: String,
    pub full_name: String,
    /// ISO3 country code (`Gid0`).
    pub country: Option<String>,
}

impl AdminUnit {
    /// True if the unit belongs to the given ISO3 country.
    pub fn is_in_country(&self, iso3: &str) -> bool {
        self.country
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(iso3))
            || self.full_name.contains(&format!(", {}", iso3.to_uppercase()))
    }

    /// True if the full name leads with the unit's own name (`"Posadas, Misiones, ARG"`).
    ///
    /// Department searches also return units that merely mention the name
    /// further down the hierarchy.
    pub fn is_named_unit(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && self.full_name.trim().starts_with(&format!("{},", name))
    }

    /// GID of the parent unit.
    pub fn parent_code(&self) -> Option<String> {
        parent_gid(&self.id)
    }
}

/// Parent of a GADM identifier (`ARG.14.3_1` -> `ARG.14`).
pub fn parent_gid(gid: &str) -> Option<String> {
    let gid = gid.split('_').next().unwrap_or(gid);
    gid.rsplit_once('.').map(|(parent, _)| parent.to_string())
}

/// Pick the admin unit for a country from search results.
///
/// Prefers a unit in `iso3`; falls back to the first result. Department
/// lookups first try units in `iso3` whose full name leads with their own
/// name. Units without an identifier are never picked.
pub fn pick_candidate<'a>(
    units: &'a [AdminUnit],
    iso3: &str,
    level: RegionLevel,
) -> Option<&'a AdminUnit> {
    let usable = || units.iter().filter(|u| !u.id.is_empty());
    let named = match level {
        RegionLevel::Department => usable().find(|u| u.is_in_country(iso3) && u.is_named_unit()),
        RegionLevel::Province => None,
    };
    named
        .or_else(|| usable().find(|u| u.is_in_country(iso3)))
        .or_else(|| usable().next())
}

/// A decoded admin boundary with its descriptive properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    pub admin_id: String,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub country: Option<String>,
    pub geometry: Geometry,
}

impl RegionBoundary {
    /// Decode the admin GeoJSON response.
    ///
    /// Properties are read from the first feature when present.
    pub fn from_geojson(admin_id: &str, value: &Value) -> Result<Self, GeometryError> {
        let geometry = Geometry::from_geojson(value)?;
        let properties = value
            .get("features")
            .and_then(Value::as_array)
            .and_then(|f| f.first())
            .or(Some(value))
            .and_then(|feature| feature.get("properties"));
        let text = |key: &str| {
            properties
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            admin_id: admin_id.to_string(),
            name: text("Name"),
            full_name: text("FullName"),
            country: text("Gid0"),
            geometry,
        })
    }
}

// Upstream field names are PascalCase and loosely typed.

#[derive(Deserialize)]
struct RawAsset {
    #[serde(rename = "Id", default)]
    id: Option<Value>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Sector", default)]
    sector: Option<String>,
    #[serde(rename = "Centroid", default)]
    centroid: Option<RawCentroid>,
    #[serde(rename = "EmissionsSummary", default)]
    emissions: Option<Vec<RawSummary>>,
}

#[derive(Deserialize)]
struct RawCentroid {
    #[serde(rename = "Geometry", default)]
    geometry: Option<Value>,
}

#[derive(Deserialize)]
struct RawSummary {
    #[serde(rename = "Gas", default)]
    gas: Option<String>,
    #[serde(rename = "EmissionsQuantity", default)]
    quantity: Option<Value>,
}

#[derive(Deserialize)]
struct RawAdmin {
    #[serde(rename = "Id", alias = "id", default)]
    id: Option<Value>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "FullName", default)]
    full_name: Option<String>,
    #[serde(rename = "Gid0", default)]
    gid0: Option<String>,
}

fn value_to_id(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `[x, y]` or a GeoJSON `Point` object.
fn centroid_pair(value: &Value) -> Option<(f64, f64)> {
    let axes = match value {
        Value::Array(axes) => axes,
        Value::Object(_) => value.get("coordinates")?.as_array()?,
        _ => return None,
    };
    match axes.as_slice() {
        [a, b, ..] => Some((value_to_f64(a)?, value_to_f64(b)?)),
        _ => None,
    }
}

impl From<RawAsset> for EmissionAsset {
    fn from(raw: RawAsset) -> Self {
        Self {
            id: value_to_id(raw.id),
            name: raw.name,
            sector: raw.sector.unwrap_or_default(),
            centroid: raw
                .centroid
                .and_then(|c| c.geometry)
                .as_ref()
                .and_then(centroid_pair),
            emissions: raw
                .emissions
                .unwrap_or_default()
                .into_iter()
                .filter_map(|s| {
                    Some(GasQuantity {
                        gas: s.gas?,
                        quantity: s.quantity.as_ref().and_then(value_to_f64),
                    })
                })
                .collect(),
        }
    }
}

impl From<RawAdmin> for AdminUnit {
    fn from(raw: RawAdmin) -> Self {
        let name = raw.name.unwrap_or_default();
        Self {
            id: value_to_id(raw.id).unwrap_or_default(),
            full_name: raw.full_name.unwrap_or_else(|| name.clone()),
            name,
            country: raw.gid0.filter(|g| !g.is_empty()),
        }
    }
}
