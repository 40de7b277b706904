//! Reverse geocoding for visited_places.
//!
//! This module converts a clicked map coordinate into the places that contain
//! it (country, state/region, city) so the user can pick which one to record.
//!
//! It defines the `Address` struct holding the raw address components and the
//! `ReverseGeocoder` trait as an interface for different geocoding backends.
//! `NominatimGeocoder` talks to an OpenStreetMap Nominatim server; the
//! `MockGeocoder` returns predefined addresses for a few coordinate ranges and
//! is used for offline runs and tests.

use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::location::LocationKind;

/// Address components returned by a reverse geocoding lookup
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Address {
    /// The full formatted address (e.g., "Chicago, Illinois, United States")
    #[serde(default)]
    pub formatted_address: String,
    /// Country name
    pub country: Option<String>,
    /// State, province, or administrative area
    pub state: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted_address)
    }
}

/// A place the user can choose to record after clicking the map
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOption {
    pub kind: LocationKind,
    pub name: String,
}

/// Build the selectable places for an address: country, region, then city.
///
/// The city falls back to town and then village. Components the geocoder did
/// not return are left out.
pub fn place_options(address: &Address) -> Vec<PlaceOption> {
    let city = address
        .city
        .as_ref()
        .or(address.town.as_ref())
        .or(address.village.as_ref());

    [
        (LocationKind::Country, address.country.as_ref()),
        (LocationKind::Region, address.state.as_ref()),
        (LocationKind::City, city),
    ]
    .into_iter()
    .filter_map(|(kind, name)| {
        name.filter(|name| !name.is_empty()).map(|name| PlaceOption {
            kind,
            name: name.clone(),
        })
    })
    .collect()
}

/// Interface for reverse geocoding services
#[allow(async_fn_in_trait)]
pub trait ReverseGeocoder {
    /// Convert latitude and longitude to an address
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Address>;
}

/// Reverse geocoding against a Nominatim server
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: String,
    address: Option<Address>,
    error: Option<String>,
}

impl NominatimGeocoder {
    /// Nominatim asks every client to identify itself with a User-Agent
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid geocoder URL: {base_url}"))?;
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .context("Failed to build geocoder HTTP client")?;

        Ok(Self { client, base_url })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Address> {
        let mut url = self
            .base_url
            .join("reverse")
            .context("Failed to build geocoder URL")?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string());
        debug!("Reverse geocoding {latitude}, {longitude} via {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to GET {url}"))?
            .error_for_status()
            .context("Geocoder returned an error status")?;

        let body: NominatimResponse = response
            .json()
            .await
            .context("Failed to parse geocoder response")?;

        if let Some(error) = body.error {
            bail!("Geocoder error: {error}");
        }

        let mut address = body
            .address
            .context("Geocoder response has no address")?;
        address.formatted_address = body.display_name;
        Ok(address)
    }
}

/// Mock geocoding service for testing and offline use
pub struct MockGeocoder;

impl MockGeocoder {
    fn lookup(latitude: f64, longitude: f64) -> Address {
        let known = |formatted: &str, city: &str, state: &str, country: &str| Address {
            formatted_address: formatted.to_string(),
            country: Some(country.to_string()),
            state: Some(state.to_string()),
            city: Some(city.to_string()),
            town: None,
            village: None,
        };

        // Chicago area (roughly)
        if latitude > 41.5 && latitude < 42.0 && longitude > -88.0 && longitude < -87.5 {
            return known("Chicago, IL, USA", "Chicago", "Illinois", "United States");
        }

        // Paris area (roughly)
        if latitude > 48.7 && latitude < 49.0 && longitude > 2.2 && longitude < 2.5 {
            return known("Paris, Île-de-France, France", "Paris", "Île-de-France", "France");
        }

        // London area (roughly)
        if latitude > 51.0 && latitude < 52.0 && longitude > -0.5 && longitude < 0.5 {
            return known("London, England, UK", "London", "England", "United Kingdom");
        }

        // Open ocean: nothing to pick
        let ns = if latitude >= 0.0 { "North" } else { "South" };
        let ew = if longitude >= 0.0 { "East" } else { "West" };

        Address {
            formatted_address: format!("{ns} {ew} at {latitude:.4}, {longitude:.4}"),
            ..Address::default()
        }
    }
}

impl ReverseGeocoder for MockGeocoder {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Address> {
        Ok(Self::lookup(latitude, longitude))
    }
}

/// Geocoder selected by configuration
pub enum Geocoder {
    Nominatim(NominatimGeocoder),
    Mock(MockGeocoder),
}

impl ReverseGeocoder for Geocoder {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Address> {
        match self {
            Geocoder::Nominatim(geocoder) => geocoder.reverse_geocode(latitude, longitude).await,
            Geocoder::Mock(geocoder) => geocoder.reverse_geocode(latitude, longitude).await,
        }
    }
}
