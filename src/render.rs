//! Marker and sidebar rendering for visited locations.
//!
//! Turns `VisitedLocation` records into map markers and list rows. Countries get
//! a flag icon, regions and cities get a circle coloured by how long ago the
//! visit was.

use chrono::NaiveDate;

use crate::location::{LocationKind, VisitedLocation};
use crate::map::{Marker, MarkerShape};

/// Visits within the last month
pub const RECENT_COLOR: &str = "#ff0000";
/// Visits within the last six months
pub const SEASON_COLOR: &str = "#ff9900";
/// Visits within the last year
pub const YEAR_COLOR: &str = "#ffff00";
/// Anything older
pub const OLD_COLOR: &str = "#00ff00";

const REGION_RADIUS: u32 = 6;
const CITY_RADIUS: u32 = 4;
const COUNTRY_FALLBACK_GLYPH: &str = "✓";

/// Pick the marker colour for a visit based on its age in days
pub fn color_for_visit(visit_date: NaiveDate, today: NaiveDate) -> &'static str {
    let days = (today - visit_date).num_days();

    if days < 30 {
        RECENT_COLOR
    } else if days < 180 {
        SEASON_COLOR
    } else if days < 365 {
        YEAR_COLOR
    } else {
        OLD_COLOR
    }
}

/// Flag emoji for the handful of countries we have one for
pub fn flag_emoji(country: &str) -> Option<&'static str> {
    let flag = match country {
        "United States" => "🇺🇸",
        "Canada" => "🇨🇦",
        "United Kingdom" => "🇬🇧",
        "France" => "🇫🇷",
        "Germany" => "🇩🇪",
        "Italy" => "🇮🇹",
        "Spain" => "🇪🇸",
        "Japan" => "🇯🇵",
        "Australia" => "🇦🇺",
        _ => return None,
    };
    Some(flag)
}

/// Build the map marker for a location, or `None` for kinds we can't draw
pub fn marker_for(location: &VisitedLocation, today: NaiveDate) -> Option<Marker> {
    let shape = match &location.kind {
        LocationKind::Country => MarkerShape::Icon {
            glyph: flag_emoji(&location.name)
                .unwrap_or(COUNTRY_FALLBACK_GLYPH)
                .to_string(),
            size: (30, 30),
            anchor: (15, 15),
        },
        LocationKind::Region => circle(REGION_RADIUS, location.visit_date, today),
        LocationKind::City => circle(CITY_RADIUS, location.visit_date, today),
        LocationKind::Unknown(_) => return None,
    };

    Some(Marker {
        lat: location.lat,
        lon: location.lon,
        shape,
        popup: location.label(),
    })
}

fn circle(radius: u32, visit_date: NaiveDate, today: NaiveDate) -> MarkerShape {
    MarkerShape::Circle {
        radius,
        fill_color: color_for_visit(visit_date, today),
        stroke_color: "#000",
        weight: 1,
        opacity: 1.0,
        fill_opacity: 0.8,
    }
}

/// Format a visit date for the sidebar (January 5, 2024)
pub fn format_visit_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// One row of the sidebar list
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    /// Id passed back to `remove` when the row's remove control is used
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub visited: String,
}

impl ListRow {
    pub fn from_location(location: &VisitedLocation) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            kind: location.kind.to_string(),
            visited: format!("Visited: {}", format_visit_date(location.visit_date)),
        }
    }
}
