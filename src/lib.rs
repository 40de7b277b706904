//! # visited_places
//!
//! A map tracker for the countries, regions and cities you have visited.
//!
//! Clicking the map resolves the spot through reverse geocoding into the places
//! that contain it. The one the user picks is stored through the backend
//! locations API and drawn on the map.
//!
//! ## Features
//!
//! - Keeps the visited locations in step with the backend (`/api/locations`)
//! - Draws a marker per visit: a flag for countries, a circle coloured by how
//!   recent the visit was for regions and cities
//! - Highlights every visited country with its boundary from a GeoJSON dataset
//! - Lists visits with distinct country/region/city counts
//!
//! The map and the page around it are reached through the `MapView` and
//! `Presenter` traits, so everything here runs headless as well.

pub mod api;
pub mod app;
pub mod boundary;
pub mod config;
pub mod geocode;
pub mod highlight;
pub mod location;
pub mod map;
pub mod mock;
pub mod presenter;
pub mod render;
pub mod store;
