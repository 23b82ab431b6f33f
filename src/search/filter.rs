use serde::Serialize;
use std::fmt;

/// Room-count tokens offered by the search form.
pub const ROOM_OPTIONS: [&str; 4] = ["1", "2", "3", "4+"];

/// Listing categories offered by the search form. The first entry is the default.
pub const PROPERTY_TYPE_OPTIONS: [&str; 5] = ["all", "apartamento", "casa", "terreno", "comercial"];

/// Kind of property searched for. Kept as a free-form string so that values
/// arriving from stale links survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PropertyType(String);

impl PropertyType {
    pub const ALL: &'static str = "all";

    /// An empty value falls back to [`PropertyType::ALL`].
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::default()
        } else {
            Self(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        Self(Self::ALL.to_string())
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every active search criterion of the listing search.
///
/// List fields behave as order-preserving sets: values keep the order in which
/// they were selected and never repeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub property_type: PropertyType,
    /// State code, empty when no state is selected.
    pub state: String,
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub rooms: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl FilterState {
    /// True when no criterion differs from the defaults.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Both bounds are set and the minimum exceeds the maximum. Such ranges are
    /// passed through as entered.
    pub fn has_inverted_price_range(&self) -> bool {
        matches!((self.min_price, self.max_price), (Some(min), Some(max)) if min > max)
    }
}

/// Adds `value` when absent, removes it otherwise. Returns whether the value is
/// selected afterwards.
pub(crate) fn toggle(values: &mut Vec<String>, value: &str) -> bool {
    match values.iter().position(|existing| existing == value) {
        Some(index) => {
            values.remove(index);
            false
        }
        None => {
            values.push(value.to_string());
            true
        }
    }
}

/// Prices are non-negative finite numbers; anything else counts as unset.
pub(crate) fn sanitize_price(value: Option<f64>) -> Option<f64> {
    value.filter(|price| price.is_finite() && *price >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_defaults_to_all() {
        assert_eq!(PropertyType::default().as_str(), "all");
        assert!(PropertyType::new("").is_default());
        assert!(!PropertyType::new("casa").is_default());
        assert_eq!(PROPERTY_TYPE_OPTIONS[0], PropertyType::ALL);
    }

    #[test]
    fn toggle_twice_restores_original_order() {
        let mut rooms = vec!["1".to_string(), "2".to_string()];
        assert!(toggle(&mut rooms, "3"));
        assert_eq!(rooms, vec!["1", "2", "3"]);
        assert!(!toggle(&mut rooms, "3"));
        assert_eq!(rooms, vec!["1", "2"]);
    }

    #[test]
    fn inverted_price_range_requires_both_bounds() {
        let mut filter = FilterState {
            min_price: Some(500_000.0),
            ..FilterState::default()
        };
        assert!(!filter.has_inverted_price_range());
        filter.max_price = Some(200_000.0);
        assert!(filter.has_inverted_price_range());
        filter.max_price = Some(500_000.0);
        assert!(!filter.has_inverted_price_range());
    }

    #[test]
    fn sanitize_price_drops_negative_and_non_finite() {
        assert_eq!(sanitize_price(Some(0.0)), Some(0.0));
        assert_eq!(sanitize_price(Some(1500.5)), Some(1500.5));
        assert_eq!(sanitize_price(Some(-1.0)), None);
        assert_eq!(sanitize_price(Some(f64::NAN)), None);
        assert_eq!(sanitize_price(Some(f64::INFINITY)), None);
        assert_eq!(sanitize_price(None), None);
    }

    #[test]
    fn default_filter_is_empty() {
        assert!(FilterState::default().is_empty());
        let filter = FilterState {
            state: "SP".to_string(),
            ..FilterState::default()
        };
        assert!(!filter.is_empty());
    }
}
