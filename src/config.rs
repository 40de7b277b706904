use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::boundary::{Boundaries, FileBoundarySource, HttpBoundarySource};
use crate::geocode::{Geocoder, MockGeocoder, NominatimGeocoder};

/// Which reverse geocoder to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderKind {
    Nominatim,
    Mock,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend serving `/api/locations`
    pub api_base_url: String,
    pub geocoder: GeocoderKind,
    pub geocoder_url: String,
    pub user_agent: String,
    /// Country boundaries: a path on the backend (`/static/...`), a full URL,
    /// or a local file as `file:<path>`
    pub boundary_dataset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            geocoder: GeocoderKind::Nominatim,
            geocoder_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: format!("visited_places/{}", env!("CARGO_PKG_VERSION")),
            boundary_dataset: "/static/data/countries.geojson".to_string(),
        }
    }
}

impl Config {
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    pub fn get_config_path(config_arg: &Option<PathBuf>) -> PathBuf {
        config_arg
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.yaml"))
    }

    /// Build the geocoder this config asks for
    pub fn geocoder(&self) -> Result<Geocoder> {
        match self.geocoder {
            GeocoderKind::Nominatim => Ok(Geocoder::Nominatim(NominatimGeocoder::new(
                &self.geocoder_url,
                &self.user_agent,
            )?)),
            GeocoderKind::Mock => Ok(Geocoder::Mock(MockGeocoder)),
        }
    }

    /// Resolve `boundary_dataset` into a source.
    ///
    /// `file:` paths are read from disk, absolute URLs are fetched as-is, and
    /// anything else is a path fetched from the backend.
    pub fn boundaries(&self) -> Result<Boundaries> {
        let dataset = self.boundary_dataset.as_str();

        if let Some(path) = dataset.strip_prefix("file:") {
            if path.is_empty() {
                bail!("Empty boundary dataset file path");
            }
            return Ok(Boundaries::File(FileBoundarySource::new(path)));
        }

        if dataset.starts_with("http://") || dataset.starts_with("https://") {
            let url = Url::parse(dataset)
                .with_context(|| format!("Invalid boundary dataset URL: {dataset}"))?;
            return Ok(Boundaries::Http(HttpBoundarySource::new(url)));
        }

        let url = Url::parse(&self.api_base_url)
            .and_then(|base| base.join(dataset))
            .with_context(|| {
                format!("Invalid boundary dataset path {dataset} for {}", self.api_base_url)
            })?;
        Ok(Boundaries::Http(HttpBoundarySource::new(url)))
    }
}
