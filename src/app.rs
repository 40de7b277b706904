//! Event handlers wiring user interaction to the store.
//!
//! A map click is resolved through the reverse geocoder into the places that
//! contain it. The presenter asks the user which one to record (and on which
//! date), and the choice is added to the store at the clicked coordinates.

use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::api::LocationsApi;
use crate::boundary::BoundarySource;
use crate::geocode::{ReverseGeocoder, place_options};
use crate::location::VisitedLocation;
use crate::store::LocationStore;

/// Alert shown when the click can't be resolved to an address
pub const GEOCODE_FAILED_MESSAGE: &str = "Failed to get location information. Please try again.";

/// A click on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapClick {
    pub lat: f64,
    pub lon: f64,
}

/// A click on a sidebar row's remove control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveClick {
    pub id: i64,
}

/// Handle a map click: geocode, let the user pick a place, add it.
///
/// Returns `Ok(None)` when nothing was picked (no places at that spot, or the
/// dialog was dismissed).
pub async fn handle_map_click<A, B, G>(
    store: &mut LocationStore<A, B>,
    geocoder: &G,
    click: MapClick,
) -> Result<Option<VisitedLocation>>
where
    A: LocationsApi,
    B: BoundarySource,
    G: ReverseGeocoder,
{
    let address = match geocoder.reverse_geocode(click.lat, click.lon).await {
        Ok(address) => address,
        Err(err) => {
            error!("Reverse geocoding {}, {} failed: {err:#}", click.lat, click.lon);
            store.presenter().alert(GEOCODE_FAILED_MESSAGE);
            return Err(err.context("Failed to get location information"));
        }
    };
    debug!("Reverse geocoding data: {address:?}");

    let options = place_options(&address);
    if options.is_empty() {
        info!("Nothing to add at {}, {} ({address})", click.lat, click.lon);
        return Ok(None);
    }

    let Some(choice) = store.presenter().choose_place(&options) else {
        debug!("Place dialog dismissed");
        return Ok(None);
    };

    let created = store
        .add(
            &choice.name,
            click.lat,
            click.lon,
            choice.kind.as_str(),
            choice.visit_date,
        )
        .await
        .context("Failed to add picked place")?;

    Ok(Some(created))
}

/// Handle a click on a row's remove control
pub async fn handle_remove_click<A, B>(
    store: &mut LocationStore<A, B>,
    click: RemoveClick,
) -> Result<Option<VisitedLocation>>
where
    A: LocationsApi,
    B: BoundarySource,
{
    store.remove(click.id).await
}
