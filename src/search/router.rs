use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::cascade::{FilterEvent, LocationFilter, SubmitOutcome};
use super::filter::{FilterState, PROPERTY_TYPE_OPTIONS, ROOM_OPTIONS};
use super::query::{self, QueryString};
use crate::locations::LocationDataset;

/// Shared, read-only inputs of the search endpoints.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub dataset: Arc<LocationDataset>,
    pub results_path: String,
}

impl SearchContext {
    fn location_filter(&self, raw_query: &str) -> LocationFilter {
        LocationFilter::new(self.dataset.clone(), raw_query, true)
            .with_results_path(self.results_path.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct StateSummary {
    pub code: String,
    pub name: String,
    pub city_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct NeighborhoodParams {
    #[serde(default)]
    pub cities: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterEventsRequest {
    /// Query string the filter is hydrated from.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub events: Vec<FilterEvent>,
    #[serde(default)]
    pub submit: bool,
    /// Submit to the embedding page instead of navigating.
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub city_search: String,
    #[serde(default)]
    pub neighborhood_search: String,
}

/// Filter state together with the option lists a search form renders.
#[derive(Debug, Serialize)]
pub struct FilterView {
    pub filter: FilterState,
    pub query: QueryString,
    pub property_types: Vec<&'static str>,
    pub room_options: Vec<&'static str>,
    pub available_cities: Vec<String>,
    pub available_neighborhoods: Vec<String>,
    pub visible_cities: Vec<String>,
    pub visible_neighborhoods: Vec<String>,
    pub inverted_price_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmitOutcome>,
}

impl FilterView {
    pub fn new(filter: &LocationFilter, city_search: &str, neighborhood_search: &str) -> Self {
        Self {
            filter: filter.filter().clone(),
            query: query::serialize(filter.filter()),
            property_types: PROPERTY_TYPE_OPTIONS.to_vec(),
            room_options: ROOM_OPTIONS.to_vec(),
            available_cities: owned(filter.available_cities()),
            available_neighborhoods: owned(filter.available_neighborhoods()),
            visible_cities: owned(filter.visible_cities(city_search)),
            visible_neighborhoods: owned(filter.visible_neighborhoods(neighborhood_search)),
            inverted_price_range: filter.filter().has_inverted_price_range(),
            page: None,
            outcome: None,
        }
    }
}

/// Router exposing the location dataset and the search filter cascade.
pub fn search_router(context: Arc<SearchContext>) -> Router {
    Router::new()
        .route("/api/v1/locations", get(states_handler))
        .route("/api/v1/locations/:state/cities", get(cities_handler))
        .route(
            "/api/v1/locations/:state/neighborhoods",
            get(neighborhoods_handler),
        )
        .route("/api/v1/search/filter", get(filter_handler))
        .route("/api/v1/search/filter/events", post(events_handler))
        .with_state(context)
}

pub(crate) async fn states_handler(
    State(context): State<Arc<SearchContext>>,
) -> Json<Vec<StateSummary>> {
    let states = context
        .dataset
        .states()
        .iter()
        .map(|state| StateSummary {
            code: state.code.clone(),
            name: state.name.clone(),
            city_count: state.cities.len(),
        })
        .collect();
    Json(states)
}

pub(crate) async fn cities_handler(
    State(context): State<Arc<SearchContext>>,
    Path(code): Path<String>,
) -> Response {
    if context.dataset.state(&code).is_none() {
        return unknown_state(&code);
    }

    let cities = context.dataset.available_cities(&code);
    let payload = json!({
        "state": code,
        "cities": cities,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn neighborhoods_handler(
    State(context): State<Arc<SearchContext>>,
    Path(code): Path<String>,
    Query(params): Query<NeighborhoodParams>,
) -> Response {
    if context.dataset.state(&code).is_none() {
        return unknown_state(&code);
    }

    let cities = query::split_list(params.cities.as_deref());
    let neighborhoods = context.dataset.available_neighborhoods(&cities, &code);
    let payload = json!({
        "state": code,
        "cities": cities,
        "neighborhoods": neighborhoods,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn filter_handler(
    State(context): State<Arc<SearchContext>>,
    RawQuery(raw): RawQuery,
) -> Json<FilterView> {
    let raw = raw.unwrap_or_default();
    let filter = context.location_filter(&raw);
    let mut view = FilterView::new(&filter, "", "");
    view.page = query::parse_page(&raw);
    Json(view)
}

pub(crate) async fn events_handler(
    State(context): State<Arc<SearchContext>>,
    Json(request): Json<FilterEventsRequest>,
) -> Json<FilterView> {
    let FilterEventsRequest {
        query,
        events,
        submit,
        embedded,
        city_search,
        neighborhood_search,
    } = request;

    let mut filter = context.location_filter(&query);
    if embedded {
        filter = filter.with_search_callback(|query| {
            info!(%query, "embedded search handed back to caller");
        });
    }
    for event in events {
        filter.dispatch(event);
    }

    let mut view = FilterView::new(&filter, &city_search, &neighborhood_search);
    if submit {
        view.outcome = Some(filter.submit());
    }
    Json(view)
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

fn unknown_state(code: &str) -> Response {
    let payload = json!({
        "error": format!("unknown state '{code}'"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
