//! In-memory stand-ins for the backend and the boundary dataset.
//!
//! Used by the unit and integration tests.

use anyhow::{Result, bail};
use geojson::FeatureCollection;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::api::LocationsApi;
use crate::boundary::{BoundarySource, parse_dataset};
use crate::location::{NewLocation, VisitedLocation};

/// Locations API backed by a `Vec`, assigning ids like a database sequence
#[derive(Debug, Default)]
pub struct InMemoryLocationsApi {
    locations: Mutex<Vec<VisitedLocation>>,
    next_id: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryLocationsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given records; new ids continue after the highest one
    pub fn with_locations(locations: Vec<VisitedLocation>) -> Self {
        let max_id = locations.iter().map(|l| l.id).max().unwrap_or(0);
        Self {
            locations: Mutex::new(locations),
            next_id: AtomicUsize::new(max_id.max(0) as usize),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every following call fail as if the server returned 500
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<VisitedLocation> {
        self.lock().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("HTTP error! status: 500 Internal Server Error, body: ");
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<VisitedLocation>> {
        self.locations.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationsApi for InMemoryLocationsApi {
    async fn list(&self) -> Result<Vec<VisitedLocation>> {
        self.check()?;
        Ok(self.stored())
    }

    async fn create(&self, location: &NewLocation) -> Result<VisitedLocation> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let created = VisitedLocation {
            id,
            name: location.name.clone(),
            lat: location.lat,
            lon: location.lon,
            kind: location.kind.clone(),
            visit_date: location.visit_date,
        };
        self.lock().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.check()?;
        self.lock().retain(|location| location.id != id);
        Ok(())
    }
}

/// Boundary dataset held in memory; counts how often it was loaded
#[derive(Debug)]
pub struct StaticBoundarySource {
    dataset: serde_json::Value,
    loads: AtomicUsize,
}

impl StaticBoundarySource {
    pub fn new(dataset: serde_json::Value) -> Self {
        Self {
            dataset,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl BoundarySource for StaticBoundarySource {
    async fn load(&self) -> Result<FeatureCollection> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Let other pending highlight requests run, as a network fetch would
        tokio::task::yield_now().await;
        parse_dataset(self.dataset.clone())
    }
}

fn square(name: &str, lon: f64, lat: f64) -> serde_json::Value {
    json!({
        "type": "Feature",
        "properties": {"ADMIN": name},
        "geometry": {"type": "Polygon", "coordinates": [[
            [lon, lat], [lon + 2.0, lat], [lon + 2.0, lat + 2.0], [lon, lat + 2.0], [lon, lat]
        ]]}
    })
}

/// Small boundary dataset with a few countries and one nameless feature
pub fn sample_countries() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            square("France", 1.0, 46.0),
            square("Germany", 9.0, 50.0),
            square("United States of America", -100.0, 38.0),
            square("Georgia", 43.0, 41.5),
            square("South Georgia and the Islands", -37.0, -55.0),
            square("Japan", 138.0, 36.0),
            {"type": "Feature", "properties": {"NAME": "Nowhere"}, "geometry": null}
        ]
    })
}
