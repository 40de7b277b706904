//! The visited location store.
//!
//! `LocationStore` owns the in-memory list of visited locations and keeps it in
//! step with the backend. Every change is followed by a full redraw: point
//! markers are rebuilt, every visited country is (re)highlighted, and the
//! sidebar list and stats are re-rendered through the `Presenter`.
//!
//! Failed backend calls never touch the in-memory list. A failed add is shown
//! to the user as an alert, a failed remove is only logged.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::api::LocationsApi;
use crate::boundary::BoundarySource;
use crate::highlight::CountryHighlighter;
use crate::location::{LocationKind, LocationStats, NewLocation, VisitedLocation};
use crate::map::MapView;
use crate::presenter::Presenter;
use crate::render::{ListRow, marker_for};

/// Alert shown when the backend rejects or never receives a new location
pub const ADD_FAILED_MESSAGE: &str = "Failed to add location. Please try again.";

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// In-memory visited locations plus everything needed to draw them
pub struct LocationStore<A, B> {
    api: A,
    highlighter: CountryHighlighter<B>,
    map: Arc<dyn MapView>,
    presenter: Arc<dyn Presenter>,
    locations: Vec<VisitedLocation>,
    today: fn() -> NaiveDate,
}

impl<A: LocationsApi, B: BoundarySource> LocationStore<A, B> {
    /// Creates an empty store; call `load` to fetch what the backend has
    pub fn new(
        api: A,
        highlighter: CountryHighlighter<B>,
        map: Arc<dyn MapView>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            api,
            highlighter,
            map,
            presenter,
            locations: Vec::new(),
            today: local_today,
        }
    }

    /// Replace the clock used for default visit dates and marker colours
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn locations(&self) -> &[VisitedLocation] {
        &self.locations
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn highlighter(&self) -> &CountryHighlighter<B> {
        &self.highlighter
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    pub fn stats(&self) -> LocationStats {
        LocationStats::from_locations(&self.locations)
    }

    /// Fetch all locations from the backend, replacing what we have
    pub async fn load(&mut self) -> Result<()> {
        let locations = self
            .api
            .list()
            .await
            .context("Failed to load visited locations")?;

        info!("Loaded {} visited locations", locations.len());
        self.locations = locations;
        self.redraw().await;

        Ok(())
    }

    /// Record a new visit.
    ///
    /// `kind` is normalized to its singular lowercase form and a missing
    /// `visit_date` means today.
    pub async fn add(
        &mut self,
        name: &str,
        lat: f64,
        lon: f64,
        kind: &str,
        visit_date: Option<NaiveDate>,
    ) -> Result<VisitedLocation> {
        let new_location = NewLocation {
            name: name.to_string(),
            lat,
            lon,
            kind: LocationKind::parse(kind),
            visit_date: visit_date.unwrap_or_else(self.today),
        };
        debug!("Adding location: {new_location:?}");

        let created = match self.api.create(&new_location).await {
            Ok(created) => created,
            Err(err) => {
                error!("Error adding location {name}: {err:#}");
                self.presenter.alert(ADD_FAILED_MESSAGE);
                return Err(err.context(format!("Failed to add location {name}")));
            }
        };

        info!("Location added: {} ({}) #{}", created.name, created.kind, created.id);
        self.locations.push(created.clone());
        self.redraw().await;

        Ok(created)
    }

    /// Delete the location with `id`. Returns the removed record, or `None`
    /// when the backend accepted the delete but we had no such record.
    pub async fn remove(&mut self, id: i64) -> Result<Option<VisitedLocation>> {
        if let Err(err) = self.api.delete(id).await {
            error!("Failed to remove location {id}: {err:#}");
            return Err(err.context(format!("Failed to remove location {id}")));
        }

        let removed = self
            .locations
            .iter()
            .position(|location| location.id == id)
            .map(|index| self.locations.remove(index));

        if let Some(location) = &removed {
            info!("Removed location: {} #{}", location.name, location.id);
            if location.is_country() {
                self.highlighter.remove(self.map.as_ref(), &location.name);
            }
        }
        self.redraw().await;

        Ok(removed)
    }

    /// Rebuild markers, country highlights, the list and the stats
    pub async fn redraw(&self) {
        self.render_markers();
        self.highlight_countries().await;
        self.render_list();
    }

    fn render_markers(&self) {
        let today = (self.today)();
        self.map.clear_markers();

        for location in &self.locations {
            match marker_for(location, today) {
                Some(marker) => self.map.add_marker(marker),
                None => warn!(
                    "Unknown location type: {} for {}",
                    location.kind, location.name
                ),
            }
        }
    }

    async fn highlight_countries(&self) {
        let mut countries: Vec<&str> = Vec::new();
        for location in self.locations.iter().filter(|l| l.is_country()) {
            if !countries.contains(&location.name.as_str()) {
                countries.push(&location.name);
            }
        }

        let map = self.map.as_ref();
        let results = join_all(
            countries
                .iter()
                .map(|country| self.highlighter.highlight(map, country)),
        )
        .await;

        // Failures were logged by the highlighter and don't stop the redraw
        let failed = results.iter().filter(|result| result.is_err()).count();
        if failed > 0 {
            warn!("{failed} country highlight(s) failed");
        }
    }

    fn render_list(&self) {
        let rows: Vec<ListRow> = self.locations.iter().map(ListRow::from_location).collect();
        self.presenter.render_list(&rows);
        self.presenter.render_stats(&self.stats());
    }
}
