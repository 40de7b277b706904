//! Map surface used by the store and the highlighter.
//!
//! The real map (tiles, markers, GeoJSON layers) lives in the browser's mapping
//! library. Everything in this crate talks to it through the `MapView` trait so
//! the rendering logic can run against `HeadlessMap`, an in-memory map that
//! records what was drawn. The CLI and the tests both use it.

use anyhow::Result;
use geojson::Feature;
use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::boundary::feature_name;

/// Handle for an overlay layer added to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Bounds that contain nothing yet; `extend` grows them
    pub fn empty() -> Self {
        Self {
            south: f64::INFINITY,
            west: f64::INFINITY,
            north: f64::NEG_INFINITY,
            east: f64::NEG_INFINITY,
        }
    }

    pub fn extend(&mut self, lat: f64, lon: f64) {
        if !lat.is_finite() || !lon.is_finite() {
            return;
        }
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        self.west = self.west.min(lon);
        self.east = self.east.max(lon);
    }

    /// True once at least one point has been added
    pub fn is_valid(&self) -> bool {
        self.south <= self.north && self.west <= self.east
    }
}

/// How a point marker looks
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerShape {
    /// Text icon (a flag emoji or a check mark) for countries
    Icon {
        glyph: String,
        size: (u32, u32),
        anchor: (u32, u32),
    },
    /// Filled circle for regions and cities
    Circle {
        radius: u32,
        fill_color: &'static str,
        stroke_color: &'static str,
        weight: u32,
        opacity: f64,
        fill_opacity: f64,
    },
}

/// A point marker with its popup text
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub shape: MarkerShape,
    pub popup: String,
}

/// Fill and stroke for a country overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub fill_color: &'static str,
    pub stroke_color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl OverlayStyle {
    pub fn filled(fill_color: &'static str) -> Self {
        Self {
            fill_color,
            stroke_color: "white",
            weight: 2,
            opacity: 1.0,
            fill_opacity: 0.7,
        }
    }
}

/// Interface to the mapping library
pub trait MapView {
    /// Remove every point marker. Overlays stay.
    fn clear_markers(&self);

    fn add_marker(&self, marker: Marker);

    /// Draw features as one layer and return its handle
    fn add_overlay(&self, features: &[Feature], style: &OverlayStyle) -> Result<LayerId>;

    fn remove_overlay(&self, layer: LayerId);

    fn fit_bounds(&self, bounds: Bounds);
}

/// An overlay as recorded by `HeadlessMap`
#[derive(Debug, Clone)]
pub struct DrawnOverlay {
    pub feature_names: Vec<String>,
    pub style: OverlayStyle,
}

#[derive(Debug, Default)]
struct HeadlessState {
    markers: Vec<Marker>,
    overlays: HashMap<LayerId, DrawnOverlay>,
    next_layer: u64,
    view: Option<Bounds>,
}

/// Map that keeps everything in memory instead of drawing it
#[derive(Debug, Default)]
pub struct HeadlessMap {
    state: Mutex<HeadlessState>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.lock().markers.clone()
    }

    pub fn overlay_count(&self) -> usize {
        self.lock().overlays.len()
    }

    pub fn overlays(&self) -> Vec<DrawnOverlay> {
        let state = self.lock();
        let mut layers: Vec<_> = state.overlays.iter().collect();
        layers.sort_by_key(|(id, _)| id.0);
        layers.into_iter().map(|(_, overlay)| overlay.clone()).collect()
    }

    /// Last bounds the view was fitted to
    pub fn view(&self) -> Option<Bounds> {
        self.lock().view
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MapView for HeadlessMap {
    fn clear_markers(&self) {
        self.lock().markers.clear();
    }

    fn add_marker(&self, marker: Marker) {
        debug!("Marker at {:.4}, {:.4}: {}", marker.lat, marker.lon, marker.popup);
        self.lock().markers.push(marker);
    }

    fn add_overlay(&self, features: &[Feature], style: &OverlayStyle) -> Result<LayerId> {
        let feature_names = features
            .iter()
            .filter_map(feature_name)
            .map(str::to_string)
            .collect();

        let mut state = self.lock();
        state.next_layer += 1;
        let id = LayerId(state.next_layer);
        state.overlays.insert(
            id,
            DrawnOverlay {
                feature_names,
                style: style.clone(),
            },
        );
        debug!("Overlay {} drawn with {}", id.0, style.fill_color);
        Ok(id)
    }

    fn remove_overlay(&self, layer: LayerId) {
        self.lock().overlays.remove(&layer);
    }

    fn fit_bounds(&self, bounds: Bounds) {
        self.lock().view = Some(bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_invalid() {
        let bounds = Bounds::empty();
        assert!(!bounds.is_valid());
    }

    #[test]
    fn test_bounds_extend() {
        let mut bounds = Bounds::empty();
        bounds.extend(10.0, 20.0);
        assert!(bounds.is_valid());

        bounds.extend(-5.0, 30.0);
        bounds.extend(f64::NAN, 100.0);
        assert_eq!(
            bounds,
            Bounds {
                south: -5.0,
                west: 20.0,
                north: 10.0,
                east: 30.0,
            }
        );
    }

    #[test]
    fn test_headless_markers_and_overlays() -> Result<()> {
        let map = HeadlessMap::new();
        map.add_marker(Marker {
            lat: 1.0,
            lon: 2.0,
            shape: MarkerShape::Icon {
                glyph: "✓".to_string(),
                size: (30, 30),
                anchor: (15, 15),
            },
            popup: "Somewhere (country)".to_string(),
        });

        let layer = map.add_overlay(&[], &OverlayStyle::filled("#ff7800"))?;
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.overlay_count(), 1);

        // Clearing markers keeps overlays
        map.clear_markers();
        assert!(map.markers().is_empty());
        assert_eq!(map.overlay_count(), 1);

        map.remove_overlay(layer);
        assert_eq!(map.overlay_count(), 0);

        Ok(())
    }

    #[test]
    fn test_overlay_records_country_names() -> Result<()> {
        let features: Vec<Feature> = ["Chile", ""]
            .iter()
            .map(|name| {
                Feature::from_json_value(serde_json::json!({
                    "type": "Feature",
                    "properties": {"ADMIN": name},
                    "geometry": null
                }))
            })
            .collect::<Result<_, _>>()?;

        let map = HeadlessMap::new();
        map.add_overlay(&features, &OverlayStyle::filled("#ff0000"))?;

        assert_eq!(map.overlays()[0].feature_names, vec!["Chile"]);

        Ok(())
    }
}
