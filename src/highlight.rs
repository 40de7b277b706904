//! Country highlighting.
//!
//! Draws a coloured boundary overlay for every visited country. The
//! `CountryHighlighter` keeps a registry keyed by the exact country name so a
//! country is never drawn twice, and cycles through a fixed palette, one colour
//! per overlay drawn.
//!
//! A name is reserved in the registry before the boundary dataset is loaded.
//! Concurrent requests for the same name see the reservation and return
//! without loading anything, and removing a reserved name cancels the draw.

use anyhow::Result;
use log::{error, info};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::boundary::{BoundarySource, features_bounds, matching_features};
use crate::map::{LayerId, MapView, OverlayStyle};

/// Overlay fill colours, used in order and then repeated
pub const PALETTE: [&str; 7] = [
    "#ff7800", "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#00ffff", "#ff00ff",
];

/// A drawn country overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryOverlay {
    pub layer: LayerId,
    pub color: &'static str,
}

/// What a highlight request ended up doing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HighlightOutcome {
    Drawn(CountryOverlay),
    /// The name was already drawn or being drawn
    AlreadyHighlighted,
    /// The name was removed while its dataset was loading
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Pending(u64),
    Drawn(CountryOverlay),
}

#[derive(Debug, Default)]
struct Registry {
    slots: HashMap<String, Slot>,
    color_index: usize,
    next_ticket: u64,
}

/// Draws and removes country overlays on a map
pub struct CountryHighlighter<B> {
    source: B,
    registry: Mutex<Registry>,
}

impl<B: BoundarySource> CountryHighlighter<B> {
    pub fn new(source: B) -> Self {
        Self {
            source,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn source(&self) -> &B {
        &self.source
    }

    /// Highlight every boundary feature matching `country`.
    ///
    /// Does nothing when `country` is already registered. The palette only
    /// advances when an overlay is actually added to the map.
    pub async fn highlight(&self, map: &dyn MapView, country: &str) -> Result<HighlightOutcome> {
        let ticket = {
            let mut registry = self.lock();
            if registry.slots.contains_key(country) {
                return Ok(HighlightOutcome::AlreadyHighlighted);
            }
            let ticket = registry.next_ticket;
            registry.next_ticket += 1;
            registry
                .slots
                .insert(country.to_string(), Slot::Pending(ticket));
            ticket
        };

        let collection = match self.source.load().await {
            Ok(collection) => collection,
            Err(err) => {
                error!("Error loading or parsing GeoJSON for {country}: {err:#}");
                self.release(country, ticket);
                return Err(err);
            }
        };

        let features = matching_features(&collection, country);

        let mut registry = self.lock();
        match registry.slots.get(country) {
            Some(Slot::Pending(pending)) if *pending == ticket => {}
            _ => {
                info!("Highlight for {country} was removed before it was drawn");
                return Ok(HighlightOutcome::Cancelled);
            }
        }

        let color = PALETTE[registry.color_index % PALETTE.len()];
        let layer = match map.add_overlay(&features, &OverlayStyle::filled(color)) {
            Ok(layer) => layer,
            Err(err) => {
                error!("Error drawing overlay for {country}: {err:#}");
                registry.slots.remove(country);
                return Err(err);
            }
        };
        registry.color_index += 1;

        let bounds = features_bounds(&features);
        if bounds.is_valid() {
            map.fit_bounds(bounds);
        } else {
            error!("Unable to find bounds for: {country}");
        }

        let overlay = CountryOverlay { layer, color };
        registry
            .slots
            .insert(country.to_string(), Slot::Drawn(overlay));
        info!(
            "Highlighted {country} with {} matching feature(s) in {color}",
            features.len()
        );

        Ok(HighlightOutcome::Drawn(overlay))
    }

    /// Remove the overlay registered for `country`. Returns false if there was none.
    pub fn remove(&self, map: &dyn MapView, country: &str) -> bool {
        match self.lock().slots.remove(country) {
            Some(Slot::Drawn(overlay)) => {
                map.remove_overlay(overlay.layer);
                info!("Removed highlight for {country}");
                true
            }
            Some(Slot::Pending(_)) => {
                info!("Cancelled pending highlight for {country}");
                true
            }
            None => false,
        }
    }

    /// Overlay currently drawn for `country`
    pub fn overlay(&self, country: &str) -> Option<CountryOverlay> {
        match self.lock().slots.get(country) {
            Some(Slot::Drawn(overlay)) => Some(*overlay),
            _ => None,
        }
    }

    /// Names with a drawn overlay, sorted
    pub fn highlighted(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Drawn(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of overlays drawn so far, which picks the next palette colour
    pub fn color_index(&self) -> usize {
        self.lock().color_index
    }

    fn release(&self, country: &str, ticket: u64) {
        let mut registry = self.lock();
        if matches!(registry.slots.get(country), Some(Slot::Pending(t)) if *t == ticket) {
            registry.slots.remove(country);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
