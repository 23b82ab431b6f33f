//! State → cities → neighborhoods cascade behind the listing search form.
//!
//! [`reduce`] holds every transition as a pure function over [`CascadeState`].
//! [`LocationFilter`] binds that state to a dataset and to the submit target
//! chosen by its host page.

use super::filter::{sanitize_price, toggle, FilterState, PropertyType};
use super::picker::visible_options;
use super::query::{self, QueryString};
use crate::config::DEFAULT_RESULTS_PATH;
use crate::locations::LocationDataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Discrete user input or navigation notification applied to a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterEvent {
    StateChanged(String),
    CityToggled(String),
    NeighborhoodToggled(String),
    RoomToggled(String),
    PropertyTypeChanged(String),
    MinPriceChanged(Option<f64>),
    MaxPriceChanged(Option<f64>),
    /// The page URL changed underneath the filter.
    QueryChanged(String),
    Reset,
}

/// Filter criteria plus the state value the current city selection belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeState {
    filter: FilterState,
    cities_origin: Option<String>,
}

impl CascadeState {
    /// With `is_initial_hydration` the hydrated cities are attributed to the
    /// hydrated state, so re-announcing that state keeps them. Otherwise the
    /// selection has no origin and the first state change clears it.
    pub fn hydrate(filter: FilterState, is_initial_hydration: bool) -> Self {
        let cities_origin = is_initial_hydration.then(|| filter.state.clone());
        Self {
            filter,
            cities_origin,
        }
    }

    pub fn from_query(raw: &str, is_initial_hydration: bool) -> Self {
        Self::hydrate(query::parse(raw), is_initial_hydration)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }
}

impl Default for CascadeState {
    fn default() -> Self {
        Self::hydrate(FilterState::default(), true)
    }
}

/// Applies one event. Changing the state to a value other than the one the
/// cities were picked under clears cities and neighborhoods. A city toggle
/// attributes the selection to the current state and clears neighborhoods. Selections are never checked against the
/// dataset.
pub fn reduce(mut state: CascadeState, event: FilterEvent) -> CascadeState {
    match event {
        FilterEvent::StateChanged(code) => {
            if state.cities_origin.as_deref() != Some(code.as_str()) {
                state.filter.cities.clear();
                state.filter.neighborhoods.clear();
            }
            state.cities_origin = Some(code.clone());
            state.filter.state = code;
        }
        FilterEvent::CityToggled(city) => {
            toggle(&mut state.filter.cities, &city);
            state.cities_origin = Some(state.filter.state.clone());
            state.filter.neighborhoods.clear();
        }
        FilterEvent::NeighborhoodToggled(neighborhood) => {
            toggle(&mut state.filter.neighborhoods, &neighborhood);
        }
        FilterEvent::RoomToggled(room) => {
            toggle(&mut state.filter.rooms, &room);
        }
        FilterEvent::PropertyTypeChanged(kind) => {
            state.filter.property_type = PropertyType::new(kind);
        }
        FilterEvent::MinPriceChanged(price) => {
            state.filter.min_price = sanitize_price(price);
        }
        FilterEvent::MaxPriceChanged(price) => {
            state.filter.max_price = sanitize_price(price);
        }
        FilterEvent::QueryChanged(raw) => {
            state = CascadeState::from_query(&raw, true);
        }
        FilterEvent::Reset => {
            state = CascadeState::default();
        }
    }
    state
}

/// Invoked with the built query string when the filter is embedded in a dialog.
pub type SearchCallback = Box<dyn Fn(&QueryString) + Send + Sync>;

/// What a submit did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The search callback received the query string.
    Searched { query: QueryString },
    /// The host should navigate to `location`.
    Navigate {
        query: QueryString,
        location: String,
    },
}

impl SubmitOutcome {
    pub fn query(&self) -> &QueryString {
        match self {
            SubmitOutcome::Searched { query } | SubmitOutcome::Navigate { query, .. } => query,
        }
    }
}

/// A mounted search filter: cascade state bound to the location dataset and
/// to a submit target.
pub struct LocationFilter {
    dataset: Arc<LocationDataset>,
    state: CascadeState,
    on_search: Option<SearchCallback>,
    results_path: String,
}

impl LocationFilter {
    pub fn new(dataset: Arc<LocationDataset>, raw_query: &str, is_initial_hydration: bool) -> Self {
        Self {
            dataset,
            state: CascadeState::from_query(raw_query, is_initial_hydration),
            on_search: None,
            results_path: DEFAULT_RESULTS_PATH.to_string(),
        }
    }

    /// Embedded usage: submits go to `callback` instead of navigating.
    pub fn with_search_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&QueryString) + Send + Sync + 'static,
    {
        self.on_search = Some(Box::new(callback));
        self
    }

    pub fn with_results_path(mut self, path: impl Into<String>) -> Self {
        self.results_path = path.into();
        self
    }

    pub fn filter(&self) -> &FilterState {
        self.state.filter()
    }

    pub fn is_embedded(&self) -> bool {
        self.on_search.is_some()
    }

    pub fn dispatch(&mut self, event: FilterEvent) {
        debug!(?event, "filter event");
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, event);
    }

    pub fn on_state_change(&mut self, code: impl Into<String>) {
        self.dispatch(FilterEvent::StateChanged(code.into()));
    }

    pub fn on_city_toggle(&mut self, city: impl Into<String>) {
        self.dispatch(FilterEvent::CityToggled(city.into()));
    }

    pub fn on_neighborhood_toggle(&mut self, neighborhood: impl Into<String>) {
        self.dispatch(FilterEvent::NeighborhoodToggled(neighborhood.into()));
    }

    pub fn on_room_toggle(&mut self, room: impl Into<String>) {
        self.dispatch(FilterEvent::RoomToggled(room.into()));
    }

    pub fn on_property_type_change(&mut self, kind: impl Into<String>) {
        self.dispatch(FilterEvent::PropertyTypeChanged(kind.into()));
    }

    pub fn on_min_price_change(&mut self, price: Option<f64>) {
        self.dispatch(FilterEvent::MinPriceChanged(price));
    }

    pub fn on_max_price_change(&mut self, price: Option<f64>) {
        self.dispatch(FilterEvent::MaxPriceChanged(price));
    }

    pub fn on_query_change(&mut self, raw_query: impl Into<String>) {
        self.dispatch(FilterEvent::QueryChanged(raw_query.into()));
    }

    pub fn reset(&mut self) {
        self.dispatch(FilterEvent::Reset);
    }

    pub fn available_cities(&self) -> Vec<&str> {
        self.dataset.available_cities(&self.filter().state)
    }

    pub fn available_neighborhoods(&self) -> Vec<&str> {
        let filter = self.filter();
        self.dataset
            .available_neighborhoods(&filter.cities, &filter.state)
    }

    pub fn visible_cities(&self, search: &str) -> Vec<&str> {
        visible_options(&self.available_cities(), &self.filter().cities, search)
    }

    pub fn visible_neighborhoods(&self, search: &str) -> Vec<&str> {
        visible_options(
            &self.available_neighborhoods(),
            &self.filter().neighborhoods,
            search,
        )
    }

    /// Builds the query string and hands it to the callback, or returns the
    /// location a standalone page should navigate to.
    pub fn submit(&self) -> SubmitOutcome {
        let filter = self.filter();
        if filter.has_inverted_price_range() {
            warn!(
                min_price = ?filter.min_price,
                max_price = ?filter.max_price,
                "submitting search with minimum price above maximum"
            );
        }

        let query = query::serialize(filter);
        match &self.on_search {
            Some(callback) => {
                info!(%query, "search submitted to embedding page");
                callback(&query);
                SubmitOutcome::Searched { query }
            }
            None => {
                let location = query.location(&self.results_path);
                info!(%location, "search submitted");
                SubmitOutcome::Navigate { query, location }
            }
        }
    }
}

impl fmt::Debug for LocationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationFilter")
            .field("state", &self.state)
            .field("embedded", &self.is_embedded())
            .field("results_path", &self.results_path)
            .finish()
    }
}
