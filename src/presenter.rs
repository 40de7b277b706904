//! Sidebar, dialogs and alerts.
//!
//! The store never touches the page directly. It hands list rows, stats and
//! alerts to a `Presenter`, and asks it which place to add after a map click.
//! `ConsolePresenter` prints to stdout and answers the place dialog from
//! preset answers, which is what the CLI needs.

use chrono::NaiveDate;
use log::warn;

use crate::geocode::PlaceOption;
use crate::location::{LocationKind, LocationStats};
use crate::render::ListRow;

/// What the user picked in the "Select location to add" dialog
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceChoice {
    pub name: String,
    pub kind: LocationKind,
    /// Empty date input means "today"
    pub visit_date: Option<NaiveDate>,
}

/// Interface to the page around the map
pub trait Presenter {
    fn render_list(&self, rows: &[ListRow]);

    fn render_stats(&self, stats: &LocationStats);

    /// Offer the resolved places for a click; `None` if the dialog was dismissed
    fn choose_place(&self, options: &[PlaceOption]) -> Option<PlaceChoice>;

    /// Blocking, user-visible error message
    fn alert(&self, message: &str);
}

/// Presenter for the terminal
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    preferred_kind: Option<LocationKind>,
    visit_date: Option<NaiveDate>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset answers for the place dialog
    pub fn with_answers(preferred_kind: Option<LocationKind>, visit_date: Option<NaiveDate>) -> Self {
        Self {
            preferred_kind,
            visit_date,
        }
    }
}

impl Presenter for ConsolePresenter {
    fn render_list(&self, rows: &[ListRow]) {
        if rows.is_empty() {
            println!("No visited locations yet");
            return;
        }
        for row in rows {
            println!("[{}] {} ({}) - {}", row.id, row.name, row.kind, row.visited);
        }
    }

    fn render_stats(&self, stats: &LocationStats) {
        println!(
            "Countries: {}  Regions: {}  Cities: {}",
            stats.countries, stats.regions, stats.cities
        );
    }

    fn choose_place(&self, options: &[PlaceOption]) -> Option<PlaceChoice> {
        let option = match &self.preferred_kind {
            Some(kind) => options.iter().find(|option| &option.kind == kind),
            None => options.first(),
        }?;

        println!("Selected {} ({})", option.name, option.kind);
        Some(PlaceChoice {
            name: option.name.clone(),
            kind: option.kind.clone(),
            visit_date: self.visit_date,
        })
    }

    fn alert(&self, message: &str) {
        warn!("{message}");
        eprintln!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<PlaceOption> {
        vec![
            PlaceOption {
                kind: LocationKind::Country,
                name: "France".to_string(),
            },
            PlaceOption {
                kind: LocationKind::City,
                name: "Paris".to_string(),
            },
        ]
    }

    #[test]
    fn test_choose_first_option_by_default() {
        let presenter = ConsolePresenter::new();
        let choice = presenter.choose_place(&options()).unwrap();

        assert_eq!(choice.name, "France");
        assert_eq!(choice.kind, LocationKind::Country);
        assert_eq!(choice.visit_date, None);
    }

    #[test]
    fn test_choose_preferred_kind() {
        let date = NaiveDate::from_ymd_opt(2022, 8, 9).unwrap();
        let presenter = ConsolePresenter::with_answers(Some(LocationKind::City), Some(date));
        let choice = presenter.choose_place(&options()).unwrap();

        assert_eq!(choice.name, "Paris");
        assert_eq!(choice.visit_date, Some(date));
    }

    #[test]
    fn test_missing_preferred_kind_dismisses() {
        let presenter = ConsolePresenter::with_answers(Some(LocationKind::Region), None);
        assert!(presenter.choose_place(&options()).is_none());
    }
}
