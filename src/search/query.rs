use super::filter::{sanitize_price, FilterState, PropertyType};
use serde::Serialize;
use std::fmt;
use url::form_urlencoded;

pub const KEY_TYPE: &str = "type";
pub const KEY_STATE: &str = "state";
pub const KEY_CITIES: &str = "cities";
pub const KEY_NEIGHBORHOODS: &str = "neighborhoods";
pub const KEY_ROOMS: &str = "rooms";
pub const KEY_MIN_PRICE: &str = "minPrice";
pub const KEY_MAX_PRICE: &str = "maxPrice";
pub const KEY_PAGE: &str = "page";

const LIST_SEPARATOR: char = ',';

/// Form-encoded query string carrying a [`FilterState`], without the leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryString(String);

impl QueryString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `path?query`, the location a standalone search navigates to.
    pub fn location(&self, path: &str) -> String {
        if self.0.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.0)
        }
    }

    pub fn page(&self) -> Option<u32> {
        parse_page(&self.0)
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueryString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds a [`FilterState`] from a URL query string.
///
/// Unrecognized keys are ignored, and only the first occurrence of a repeated
/// key counts. List values are split on `,` with empty segments and repeated
/// entries discarded. Prices that are not non-negative numbers are treated as
/// absent.
pub fn parse(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut fields = RawFields::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            KEY_TYPE => &mut fields.property_type,
            KEY_STATE => &mut fields.state,
            KEY_CITIES => &mut fields.cities,
            KEY_NEIGHBORHOODS => &mut fields.neighborhoods,
            KEY_ROOMS => &mut fields.rooms,
            KEY_MIN_PRICE => &mut fields.min_price,
            KEY_MAX_PRICE => &mut fields.max_price,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    FilterState {
        property_type: PropertyType::new(fields.property_type.unwrap_or_default()),
        state: fields.state.unwrap_or_default(),
        cities: split_list(fields.cities.as_deref()),
        neighborhoods: split_list(fields.neighborhoods.as_deref()),
        rooms: split_list(fields.rooms.as_deref()),
        min_price: parse_price(fields.min_price.as_deref()),
        max_price: parse_price(fields.max_price.as_deref()),
    }
}

/// Serializes `filter` the way a submitted search does: default and empty
/// fields are omitted and `page` is reset to `1`.
pub fn serialize(filter: &FilterState) -> QueryString {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if !filter.property_type.is_default() {
        serializer.append_pair(KEY_TYPE, filter.property_type.as_str());
    }
    if !filter.state.is_empty() {
        serializer.append_pair(KEY_STATE, &filter.state);
    }
    for (key, values) in [
        (KEY_CITIES, &filter.cities),
        (KEY_NEIGHBORHOODS, &filter.neighborhoods),
        (KEY_ROOMS, &filter.rooms),
    ] {
        let joined = join_list(values);
        if !joined.is_empty() {
            serializer.append_pair(key, &joined);
        }
    }
    for (key, price) in [
        (KEY_MIN_PRICE, filter.min_price),
        (KEY_MAX_PRICE, filter.max_price),
    ] {
        if let Some(price) = sanitize_price(price) {
            serializer.append_pair(key, &price.to_string());
        }
    }
    serializer.append_pair(KEY_PAGE, "1");

    QueryString(serializer.finish())
}

/// Current results page of a query string, if it carries a valid one.
pub fn parse_page(query: &str) -> Option<u32> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == KEY_PAGE)
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|page| *page > 0)
}

#[derive(Default)]
struct RawFields {
    property_type: Option<String>,
    state: Option<String>,
    cities: Option<String>,
    neighborhoods: Option<String>,
    rooms: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
}

pub(crate) fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for segment in raw.unwrap_or_default().split(LIST_SEPARATOR) {
        if !segment.is_empty() && !values.iter().any(|existing| existing == segment) {
            values.push(segment.to_string());
        }
    }
    values
}

fn join_list(values: &[String]) -> String {
    values
        .iter()
        .filter(|value| !value.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    sanitize_price(raw.and_then(|value| value.trim().parse::<f64>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_documented_scenario() {
        let filter =
            parse("?type=all&state=SP&cities=Campinas,Santos&rooms=2,3&minPrice=200000");
        assert_eq!(filter.property_type.as_str(), "all");
        assert_eq!(filter.state, "SP");
        assert_eq!(filter.cities, strings(&["Campinas", "Santos"]));
        assert!(filter.neighborhoods.is_empty());
        assert_eq!(filter.rooms, strings(&["2", "3"]));
        assert_eq!(filter.min_price, Some(200_000.0));
        assert_eq!(filter.max_price, None);
    }

    #[test]
    fn missing_keys_take_defaults() {
        assert_eq!(parse(""), FilterState::default());
        assert_eq!(parse("?"), FilterState::default());
        assert_eq!(parse("page=3&sort=price"), FilterState::default());
    }

    #[test]
    fn empty_segments_and_repeats_are_discarded() {
        let filter = parse("cities=,Campinas,,Santos,Campinas,&rooms=");
        assert_eq!(filter.cities, strings(&["Campinas", "Santos"]));
        assert!(filter.rooms.is_empty());
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let filter = parse("state=SP&state=RJ");
        assert_eq!(filter.state, "SP");
    }

    #[test]
    fn malformed_prices_are_ignored() {
        let filter = parse("minPrice=abc&maxPrice=-10");
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, None);

        let filter = parse("minPrice=1500.50&maxPrice=%20900000%20");
        assert_eq!(filter.min_price, Some(1500.5));
        assert_eq!(filter.max_price, Some(900_000.0));
    }

    #[test]
    fn decodes_encoded_values() {
        let filter = parse("state=SP&cities=S%C3%A3o+Paulo%2CCampinas&neighborhoods=Vila+Mariana");
        assert_eq!(filter.cities, strings(&["São Paulo", "Campinas"]));
        assert_eq!(filter.neighborhoods, strings(&["Vila Mariana"]));
    }

    #[test]
    fn default_type_is_omitted_and_page_reset() {
        let filter = FilterState {
            state: "SP".to_string(),
            ..FilterState::default()
        };
        let query = serialize(&filter);
        assert_eq!(query.as_str(), "state=SP&page=1");
        assert_eq!(query.page(), Some(1));
        assert!(!query.as_str().contains("type="));
    }

    #[test]
    fn empty_filter_serializes_to_page_only() {
        let query = serialize(&FilterState::default());
        assert_eq!(query.as_str(), "page=1");
        assert_eq!(query.location("/imoveis"), "/imoveis?page=1");
    }

    #[test]
    fn serializes_every_field_in_key_order() {
        let filter = FilterState {
            property_type: PropertyType::new("casa"),
            state: "RJ".to_string(),
            cities: strings(&["Rio de Janeiro", "Niterói"]),
            neighborhoods: strings(&["Icaraí"]),
            rooms: strings(&["2", "4+"]),
            min_price: Some(250_000.0),
            max_price: Some(1_000_000.5),
        };
        let query = serialize(&filter);
        assert_eq!(
            query.as_str(),
            "type=casa&state=RJ&cities=Rio+de+Janeiro%2CNiter%C3%B3i&neighborhoods=Icara%C3%AD\
&rooms=2%2C4%2B&minPrice=250000&maxPrice=1000000.5&page=1"
        );
    }

    #[test]
    fn round_trip_reproduces_filter() {
        let filter = FilterState {
            property_type: PropertyType::new("apartamento"),
            state: "SP".to_string(),
            cities: strings(&["Santos", "Campinas"]),
            neighborhoods: strings(&["Gonzaga", "Cambuí", "Centro"]),
            rooms: strings(&["4+", "1"]),
            min_price: Some(0.0),
            max_price: Some(750_000.25),
        };
        assert_eq!(parse(serialize(&filter).as_str()), filter);
    }

    #[test]
    fn parse_is_idempotent() {
        for raw in [
            "?type=all&state=SP&cities=Campinas,Santos&rooms=2,3&minPrice=200000",
            "cities=,,Santos,Santos&foo=bar&maxPrice=x&page=7",
            "type=&state=&neighborhoods=Centro",
        ] {
            let once = parse(raw);
            let twice = parse(serialize(&once).as_str());
            assert_eq!(twice, once, "query {raw}");
        }
    }

    #[test]
    fn parse_page_reads_positive_pages() {
        assert_eq!(parse_page("?state=SP&page=4"), Some(4));
        assert_eq!(parse_page("page=0"), None);
        assert_eq!(parse_page("page=next"), None);
        assert_eq!(parse_page("state=SP"), None);
    }
}
