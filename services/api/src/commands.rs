use crate::infra::load_dataset;
use clap::Args;
use imoveis_search::config::AppConfig;
use imoveis_search::error::AppError;
use imoveis_search::locations::LocationDataset;
use imoveis_search::search::{LocationFilter, SubmitOutcome};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DatasetArgs {
    /// Location dataset export (JSON or CSV) overriding LOCATIONS_PATH
    #[arg(long = "locations")]
    pub(crate) locations: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct FilterParseArgs {
    /// Query string as found in the page URL, with or without the leading '?'
    pub(crate) query: String,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FilterBuildArgs {
    /// Query string to start from
    #[arg(long, default_value = "")]
    pub(crate) from_query: String,
    /// Property type (defaults to "all")
    #[arg(long = "type")]
    pub(crate) property_type: Option<String>,
    /// State code, e.g. SP
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// City to toggle; repeat for several
    #[arg(long = "city")]
    pub(crate) cities: Vec<String>,
    /// Neighborhood to toggle; repeat for several
    #[arg(long = "neighborhood")]
    pub(crate) neighborhoods: Vec<String>,
    /// Room-count token to toggle (1, 2, 3, 4+); repeat for several
    #[arg(long = "room")]
    pub(crate) rooms: Vec<String>,
    #[arg(long)]
    pub(crate) min_price: Option<f64>,
    #[arg(long)]
    pub(crate) max_price: Option<f64>,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

#[derive(Args, Debug)]
pub(crate) struct LocationsArgs {
    /// Show the cities and neighborhoods of this state only
    #[arg(long)]
    pub(crate) state: Option<String>,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

pub(crate) fn run_filter_parse(args: FilterParseArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dataset = load_dataset(&config.search, args.dataset.locations.as_deref())?;
    let filter = LocationFilter::new(Arc::new(dataset), &args.query, true)
        .with_results_path(config.search.results_path);

    render_filter(&filter);
    Ok(())
}

pub(crate) fn run_filter_build(args: FilterBuildArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dataset = load_dataset(&config.search, args.dataset.locations.as_deref())?;
    let filter = build_filter(Arc::new(dataset), &args, &config.search.results_path);

    render_filter(&filter);
    if let SubmitOutcome::Navigate { location, .. } = filter.submit() {
        println!("\nSearch location: {location}");
    }
    Ok(())
}

pub(crate) fn run_locations(args: LocationsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dataset = load_dataset(&config.search, args.dataset.locations.as_deref())?;
    render_locations(&dataset, args.state.as_deref());
    Ok(())
}

/// Feeds the CLI selections through the cascade in form order: state, then
/// cities, then neighborhoods.
pub(crate) fn build_filter(
    dataset: Arc<LocationDataset>,
    args: &FilterBuildArgs,
    results_path: &str,
) -> LocationFilter {
    let mut filter =
        LocationFilter::new(dataset, &args.from_query, true).with_results_path(results_path);

    if let Some(kind) = &args.property_type {
        filter.on_property_type_change(kind.as_str());
    }
    if let Some(state) = &args.state {
        filter.on_state_change(state.as_str());
    }
    for city in &args.cities {
        filter.on_city_toggle(city.as_str());
    }
    for neighborhood in &args.neighborhoods {
        filter.on_neighborhood_toggle(neighborhood.as_str());
    }
    for room in &args.rooms {
        filter.on_room_toggle(room.as_str());
    }
    if args.min_price.is_some() {
        filter.on_min_price_change(args.min_price);
    }
    if args.max_price.is_some() {
        filter.on_max_price_change(args.max_price);
    }

    filter
}

fn render_filter(filter: &LocationFilter) {
    let state = filter.filter();
    let or_none = |values: &[String]| {
        if values.is_empty() {
            "none".to_string()
        } else {
            values.join(", ")
        }
    };

    println!("Listing search filter");
    println!("- Type: {}", state.property_type);
    println!(
        "- State: {}",
        if state.state.is_empty() { "none" } else { state.state.as_str() }
    );
    println!("- Cities: {}", or_none(&state.cities));
    println!("- Neighborhoods: {}", or_none(&state.neighborhoods));
    println!("- Rooms: {}", or_none(&state.rooms));
    println!(
        "- Price: {} -> {}",
        format_price(state.min_price),
        format_price(state.max_price)
    );
    if state.has_inverted_price_range() {
        println!("  (minimum price is above maximum price)");
    }

    let available = filter.available_cities();
    let unknown: Vec<&str> = state
        .cities
        .iter()
        .map(String::as_str)
        .filter(|city| !available.contains(city))
        .collect();
    if !unknown.is_empty() {
        println!("  (not in the selected state: {})", unknown.join(", "));
    }

    println!("\nCity options: {}", join_or_none(&filter.visible_cities("")));
    println!(
        "Neighborhood options: {}",
        join_or_none(&filter.visible_neighborhoods(""))
    );
}

fn render_locations(dataset: &LocationDataset, state: Option<&str>) {
    let Some(code) = state else {
        println!("States");
        for record in dataset.states() {
            println!(
                "- {} {} ({} cities)",
                record.code,
                record.name,
                record.cities.len()
            );
        }
        return;
    };

    let Some(record) = dataset.state(code) else {
        println!("No state with code '{code}' in the location dataset");
        return;
    };

    println!("{} - {}", record.code, record.name);
    if record.cities.is_empty() {
        println!("No cities registered");
    }
    for city in &record.cities {
        println!("- {}: {}", city.name, or_dash(&city.neighborhoods));
    }
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "any".to_string(), |value| format!("R$ {value}"))
}

fn join_or_none(values: &[&str]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
