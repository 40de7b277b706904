//! Visited location records for visited_places.
//!
//! This module defines `VisitedLocation`, the record the backend stores for every
//! place the user has been to, and `LocationKind`, the country/region/city
//! classification used to decide how a location is drawn and counted.
//!
//! Type strings coming from the backend or the UI are normalized to their
//! singular lowercase form ("Countries" becomes "country"). Anything that does
//! not normalize to a known kind is kept as `LocationKind::Unknown` so a bad row
//! never breaks a reload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Classification of a visited place
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationKind {
    Country,
    Region,
    City,
    /// Anything the backend sent that we don't know how to draw
    Unknown(String),
}

impl LocationKind {
    /// Parse a type string, normalizing case and plurals
    pub fn parse(raw: &str) -> Self {
        match normalize_type(raw).as_str() {
            "country" => LocationKind::Country,
            "region" => LocationKind::Region,
            "city" => LocationKind::City,
            other => LocationKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LocationKind::Country => "country",
            LocationKind::Region => "region",
            LocationKind::City => "city",
            LocationKind::Unknown(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LocationKind::Unknown(_))
    }
}

impl From<String> for LocationKind {
    fn from(raw: String) -> Self {
        LocationKind::parse(&raw)
    }
}

impl From<LocationKind> for String {
    fn from(kind: LocationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercase a type string and strip its plural ending.
///
/// "ies" plurals map back to "y" so "Cities" and "Countries" land on the known
/// kinds; any other trailing "s" is dropped once.
pub fn normalize_type(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if let Some(stem) = lower.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

/// A place the user has visited, as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedLocation {
    /// Server-assigned identifier
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(rename = "visitDate")]
    pub visit_date: NaiveDate,
}

impl VisitedLocation {
    /// Popup label shown on the location's marker
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    pub fn is_country(&self) -> bool {
        self.kind == LocationKind::Country
    }
}

/// Body of a create request; the backend assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(rename = "visitDate")]
    pub visit_date: NaiveDate,
}

/// Distinct place counts shown in the stats panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationStats {
    pub countries: usize,
    pub regions: usize,
    pub cities: usize,
}

impl LocationStats {
    /// Count distinct names per kind. Repeat visits count once and unknown
    /// kinds are not counted at all.
    pub fn from_locations(locations: &[VisitedLocation]) -> Self {
        let mut countries = HashSet::new();
        let mut regions = HashSet::new();
        let mut cities = HashSet::new();

        for location in locations {
            match &location.kind {
                LocationKind::Country => {
                    countries.insert(location.name.as_str());
                }
                LocationKind::Region => {
                    regions.insert(location.name.as_str());
                }
                LocationKind::City => {
                    cities.insert(location.name.as_str());
                }
                LocationKind::Unknown(kind) => {
                    log::warn!("Unknown location type: {kind}");
                }
            }
        }

        Self {
            countries: countries.len(),
            regions: regions.len(),
            cities: cities.len(),
        }
    }
}
