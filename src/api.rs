//! Client for the backend locations API.
//!
//! The backend exposes a small CRUD surface:
//! - `GET /api/locations` returns every stored location
//! - `POST /api/locations` creates one and returns it with its new id
//! - `DELETE /api/locations/{id}` removes one
//!
//! `LocationsApi` is the seam the store talks through; `HttpLocationsApi` is
//! the reqwest implementation used against a real server.

use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::{Client, Response};
use url::Url;

use crate::location::{NewLocation, VisitedLocation};

/// Interface for the backend locations API
#[allow(async_fn_in_trait)]
pub trait LocationsApi {
    async fn list(&self) -> Result<Vec<VisitedLocation>>;

    async fn create(&self, location: &NewLocation) -> Result<VisitedLocation>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// `LocationsApi` over HTTP
pub struct HttpLocationsApi {
    client: Client,
    base_url: Url,
}

impl HttpLocationsApi {
    /// Creates a client for the backend at `base_url` (e.g. `http://localhost:5000`)
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build API URL for {path}"))
    }
}

/// Turn a non-success response into an error carrying the status and body
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("HTTP error! status: {status}, body: {body}");
}

impl LocationsApi for HttpLocationsApi {
    async fn list(&self) -> Result<Vec<VisitedLocation>> {
        let url = self.endpoint("/api/locations")?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to GET {url}"))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse locations response")
    }

    async fn create(&self, location: &NewLocation) -> Result<VisitedLocation> {
        let url = self.endpoint("/api/locations")?;
        debug!("POST {url}: {location:?}");

        let response = self
            .client
            .post(url.clone())
            .json(location)
            .send()
            .await
            .with_context(|| format!("Failed to POST {url}"))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse created location")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("/api/locations/{id}"))?;
        debug!("DELETE {url}");

        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to DELETE {url}"))?;

        ensure_success(response).await?;
        Ok(())
    }
}
