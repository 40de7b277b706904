//! Country boundary dataset.
//!
//! The boundaries come from a static GeoJSON FeatureCollection with one feature
//! per country and the country name in `properties.ADMIN`. The dataset is
//! read-only; it is loaded on demand for every highlight request.

use anyhow::{Context, Result, bail};
use geojson::{Feature, FeatureCollection, Value};
use log::{debug, error};
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

use crate::map::Bounds;

/// Property holding a feature's country name
pub const NAME_PROPERTY: &str = "ADMIN";

/// Where the boundary dataset is read from
#[allow(async_fn_in_trait)]
pub trait BoundarySource {
    async fn load(&self) -> Result<FeatureCollection>;
}

/// Interpret a parsed JSON document as a FeatureCollection.
///
/// The document itself must be a FeatureCollection with a `features` array.
/// Entries that aren't valid features are logged and dropped.
pub fn parse_dataset(value: serde_json::Value) -> Result<FeatureCollection> {
    let serde_json::Value::Object(mut object) = value else {
        bail!("Invalid GeoJSON data structure: expected a FeatureCollection object");
    };

    match object.get("type").and_then(serde_json::Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => bail!(
            "Invalid GeoJSON data structure: expected a FeatureCollection, got {other}"
        ),
        None => bail!("Invalid GeoJSON data structure: missing type"),
    }

    let Some(serde_json::Value::Array(entries)) = object.remove("features") else {
        bail!("Invalid GeoJSON data structure: features is not an array");
    };

    let features = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match Feature::from_json_value(entry) {
            Ok(feature) => Some(feature),
            Err(err) => {
                error!("Invalid feature structure at index {index}: {err}");
                None
            }
        })
        .collect();

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Dataset served over HTTP, e.g. `/static/data/countries.geojson`
pub struct HttpBoundarySource {
    client: Client,
    url: Url,
}

impl HttpBoundarySource {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

impl BoundarySource for HttpBoundarySource {
    async fn load(&self) -> Result<FeatureCollection> {
        debug!("Loading boundaries from {}", self.url);
        let value: serde_json::Value = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Failed to load boundaries from {}", self.url))?
            .json()
            .await
            .context("Failed to parse boundary dataset as JSON")?;

        parse_dataset(value)
    }
}

/// Dataset read from a local file
pub struct FileBoundarySource {
    path: PathBuf,
}

impl FileBoundarySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BoundarySource for FileBoundarySource {
    async fn load(&self) -> Result<FeatureCollection> {
        debug!("Loading boundaries from {}", self.path.display());
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read boundaries from {}", self.path.display()))?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse boundaries from {}", self.path.display()))?;

        parse_dataset(value)
    }
}

/// Boundary source picked from configuration
pub enum Boundaries {
    Http(HttpBoundarySource),
    File(FileBoundarySource),
}

impl BoundarySource for Boundaries {
    async fn load(&self) -> Result<FeatureCollection> {
        match self {
            Boundaries::Http(source) => source.load().await,
            Boundaries::File(source) => source.load().await,
        }
    }
}

/// Loose country name match used for highlighting.
///
/// Both names are lowercased; they match when equal or when either contains
/// the other. "United States" matches "United States of America", and
/// "Georgia" also matches "South Georgia and the Islands".
pub fn names_match(feature_name: &str, query: &str) -> bool {
    let feature_name = feature_name.to_lowercase();
    let query = query.to_lowercase();

    feature_name == query || feature_name.contains(&query) || query.contains(&feature_name)
}

/// Country name of a feature, if it has a non-empty one
pub fn feature_name(feature: &Feature) -> Option<&str> {
    feature
        .property(NAME_PROPERTY)?
        .as_str()
        .filter(|name| !name.is_empty())
}

/// Collect every feature whose name matches `query`.
///
/// Features without a name are logged and skipped.
pub fn matching_features(collection: &FeatureCollection, query: &str) -> Vec<Feature> {
    collection
        .features
        .iter()
        .filter(|feature| match feature_name(feature) {
            Some(name) => names_match(name, query),
            None => {
                error!(
                    "Invalid feature structure, no {NAME_PROPERTY}: {:?}",
                    feature.properties
                );
                false
            }
        })
        .cloned()
        .collect()
}

/// Bounding box of all features' geometry
pub fn features_bounds(features: &[Feature]) -> Bounds {
    let mut bounds = Bounds::empty();
    for geometry in features.iter().filter_map(|feature| feature.geometry.as_ref()) {
        extend_with_value(&mut bounds, &geometry.value);
    }
    bounds
}

fn extend_with_value(bounds: &mut Bounds, value: &Value) {
    if let Value::GeometryCollection(geometries) = value {
        for geometry in geometries {
            extend_with_value(bounds, &geometry.value);
        }
        return;
    }

    // GeoJSON positions are [lon, lat]
    let mut extend = |position: &Vec<f64>| {
        if let [lon, lat, ..] = position.as_slice() {
            bounds.extend(*lat, *lon);
        }
    };

    match value {
        Value::Point(position) => extend(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter().for_each(&mut extend)
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().for_each(&mut extend)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(&mut extend),
        Value::GeometryCollection(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dataset() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"ADMIN": "United States of America"},
                    "geometry": {"type": "Polygon", "coordinates": [[
                        [-125.0, 25.0], [-67.0, 25.0], [-67.0, 49.0], [-125.0, 49.0], [-125.0, 25.0]
                    ]]}
                },
                {
                    "type": "Feature",
                    "properties": {"ADMIN": "Georgia"},
                    "geometry": {"type": "Polygon", "coordinates": [[
                        [40.0, 41.0], [46.7, 41.0], [46.7, 43.6], [40.0, 43.6], [40.0, 41.0]
                    ]]}
                },
                {
                    "type": "Feature",
                    "properties": {"ADMIN": "South Georgia and the Islands"},
                    "geometry": {"type": "MultiPolygon", "coordinates": [[[
                        [-38.0, -54.9], [-35.8, -54.9], [-35.8, -53.9], [-38.0, -54.9]
                    ]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "Nameless"},
                    "geometry": null
                },
                {
                    "type": "Feature",
                    "properties": {"ADMIN": ""},
                    "geometry": {"type": "Point", "coordinates": [170.0, -80.0]}
                }
            ]
        })
    }

    #[test]
    fn test_names_match_policy() {
        assert!(names_match("France", "france"));
        assert!(names_match("United States of America", "United States"));
        assert!(names_match("Georgia", "Georgia"));
        assert!(names_match("South Georgia and the Islands", "Georgia"));
        assert!(names_match("Niger", "Nigeria"));
        assert!(!names_match("Spain", "Portugal"));
    }

    #[test]
    fn test_parse_dataset_requires_feature_collection() {
        assert!(parse_dataset(dataset()).is_ok());

        let single_feature = json!({
            "type": "Feature",
            "properties": {"ADMIN": "Chad"},
            "geometry": null
        });
        let err = parse_dataset(single_feature).unwrap_err();
        assert!(err.to_string().contains("FeatureCollection"));

        assert!(parse_dataset(json!({"features": "nope"})).is_err());
        assert!(parse_dataset(json!({"type": "FeatureCollection", "features": {}})).is_err());
        assert!(parse_dataset(json!(null)).is_err());
    }

    #[test]
    fn test_parse_dataset_skips_bad_entries() -> Result<()> {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"ADMIN": "France"},
                    "geometry": {"type": "Point", "coordinates": [2.2, 46.2]}
                },
                null,
                {"type": "Feature"},
                {"type": "Polygon", "coordinates": []},
                "France"
            ]
        });

        let collection = parse_dataset(value)?;
        let names: Vec<_> = collection.features.iter().filter_map(feature_name).collect();
        assert_eq!(names, vec!["France"]);

        Ok(())
    }

    #[test]
    fn test_matching_features_skips_nameless() -> Result<()> {
        let collection = parse_dataset(dataset())?;

        let georgia = matching_features(&collection, "Georgia");
        let names: Vec<_> = georgia.iter().filter_map(feature_name).collect();
        assert_eq!(names, vec!["Georgia", "South Georgia and the Islands"]);

        let usa = matching_features(&collection, "united states");
        assert_eq!(usa.len(), 1);

        // The empty ADMIN name is skipped, not matched as a substring
        assert!(matching_features(&collection, "Atlantis").is_empty());

        Ok(())
    }

    #[test]
    fn test_features_bounds() -> Result<()> {
        let collection = parse_dataset(dataset())?;
        let features = matching_features(&collection, "Georgia");
        let bounds = features_bounds(&features);

        assert!(bounds.is_valid());
        assert_eq!(bounds.south, -54.9);
        assert_eq!(bounds.north, 43.6);
        assert_eq!(bounds.west, -38.0);
        assert_eq!(bounds.east, 46.7);

        assert!(!features_bounds(&[]).is_valid());

        Ok(())
    }

    #[tokio::test]
    async fn test_file_source() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", dataset())?;

        let source = FileBoundarySource::new(file.path());
        let collection = source.load().await?;
        assert_eq!(collection.features.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_file_source_missing() {
        let source = FileBoundarySource::new("/nonexistent/countries.geojson");
        assert!(source.load().await.is_err());
    }

    #[tokio::test]
    async fn test_http_source() -> Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/static/data/countries.geojson")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(dataset().to_string())
            .create_async()
            .await;

        let url = Url::parse(&server.url())?.join("/static/data/countries.geojson")?;
        let collection = HttpBoundarySource::new(url).load().await?;

        mock.assert_async().await;
        assert_eq!(collection.features.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_http_source_not_found() -> Result<()> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/static/data/countries.geojson")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&server.url())?.join("/static/data/countries.geojson")?;
        assert!(HttpBoundarySource::new(url).load().await.is_err());

        Ok(())
    }
}
