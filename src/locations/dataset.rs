use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

const BUNDLED_LOCATIONS: &str = include_str!("../../data/locations.json");

/// A state of the federation and the cities brokers list properties in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Two-letter code, upper case.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub cities: Vec<CityRecord>,
}

impl StateRecord {
    pub fn city(&self, name: &str) -> Option<&CityRecord> {
        self.cities.iter().find(|city| city.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub neighborhoods: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read location dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid location JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid location CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported location dataset format for {0:?} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
    #[error("state code '{0}' must be exactly two ASCII letters")]
    InvalidStateCode(String),
    #[error("state '{0}' is declared more than once")]
    DuplicateState(String),
    #[error("state '{code}' is named both '{first}' and '{second}'")]
    ConflictingStateName {
        code: String,
        first: String,
        second: String,
    },
    #[error("city '{city}' is declared more than once in state '{state}'")]
    DuplicateCity { state: String, city: String },
    #[error("state '{0}' has an empty city name")]
    EmptyCityName(String),
}

/// Static states → cities → neighborhoods reference data.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationDataset {
    states: Vec<StateRecord>,
}

impl LocationDataset {
    /// Validates and normalizes the records: state codes are upper-cased,
    /// blank neighborhoods dropped and duplicate neighborhoods collapsed per city.
    pub fn new(states: Vec<StateRecord>) -> Result<Self, DatasetError> {
        let mut seen_codes = HashSet::new();
        let mut normalized = Vec::with_capacity(states.len());

        for mut state in states {
            state.code = normalize_state_code(&state.code)?;
            state.name = state.name.trim().to_string();
            if !seen_codes.insert(state.code.clone()) {
                return Err(DatasetError::DuplicateState(state.code));
            }

            let mut seen_cities = HashSet::new();
            for city in &mut state.cities {
                city.name = city.name.trim().to_string();
                if city.name.is_empty() {
                    return Err(DatasetError::EmptyCityName(state.code.clone()));
                }
                if !seen_cities.insert(city.name.clone()) {
                    return Err(DatasetError::DuplicateCity {
                        state: state.code.clone(),
                        city: city.name.clone(),
                    });
                }

                let mut seen_neighborhoods = HashSet::new();
                city.neighborhoods = city
                    .neighborhoods
                    .iter()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty() && seen_neighborhoods.insert(name.clone()))
                    .collect();
            }

            normalized.push(state);
        }

        Ok(Self { states: normalized })
    }

    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json_reader(BUNDLED_LOCATIONS.as_bytes())
    }

    pub fn states(&self) -> &[StateRecord] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, code: &str) -> Option<&StateRecord> {
        if code.is_empty() {
            return None;
        }
        self.states.iter().find(|state| state.code == code)
    }

    /// City names of the state whose code equals `state`. Empty for an empty or
    /// unknown code.
    pub fn available_cities(&self, state: &str) -> Vec<&str> {
        self.state(state)
            .map(|record| record.cities.iter().map(|city| city.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Deduplicated union of the neighborhoods of every selected city that
    /// belongs to `state`, in dataset order.
    pub fn available_neighborhoods<S: AsRef<str>>(&self, cities: &[S], state: &str) -> Vec<&str> {
        let Some(record) = self.state(state) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        record
            .cities
            .iter()
            .filter(|city| cities.iter().any(|selected| selected.as_ref() == city.name))
            .flat_map(|city| city.neighborhoods.iter())
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

fn normalize_state_code(raw: &str) -> Result<String, DatasetError> {
    let code = raw.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(DatasetError::InvalidStateCode(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str, cities: &[(&str, &[&str])]) -> StateRecord {
        StateRecord {
            code: code.to_string(),
            name: format!("State {code}"),
            cities: cities
                .iter()
                .map(|(name, neighborhoods)| CityRecord {
                    name: name.to_string(),
                    neighborhoods: neighborhoods.iter().map(|n| n.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn bundled_dataset_loads() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        assert!(!dataset.is_empty());
        let sp = dataset.state("SP").expect("SP present");
        assert_eq!(sp.name, "São Paulo");
        assert!(sp.city("Campinas").is_some());
    }

    #[test]
    fn available_cities_matches_state_record_for_every_state() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        for record in dataset.states() {
            let expected: Vec<&str> = record.cities.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(dataset.available_cities(&record.code), expected);
        }
    }

    #[test]
    fn available_cities_empty_for_unknown_or_empty_code() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        assert!(dataset.available_cities("").is_empty());
        assert!(dataset.available_cities("XX").is_empty());
        assert!(dataset.available_cities("sp").is_empty());
    }

    #[test]
    fn state_without_cities_yields_empty_list() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        assert!(dataset.state("AC").is_some());
        assert!(dataset.available_cities("AC").is_empty());
    }

    #[test]
    fn neighborhoods_are_deduplicated_across_cities() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        let neighborhoods = dataset.available_neighborhoods(&["Santos", "Campinas"], "SP");
        assert_eq!(
            neighborhoods,
            vec![
                "Cambuí",
                "Taquaral",
                "Barão Geraldo",
                "Nova Campinas",
                "Centro",
                "Gonzaga",
                "Boqueirão",
                "Ponta da Praia",
                "Embaré",
            ]
        );
    }

    #[test]
    fn neighborhoods_restricted_to_selected_state() {
        let dataset = LocationDataset::bundled().expect("bundled dataset is valid");
        let neighborhoods = dataset.available_neighborhoods(&["Campinas", "Niterói"], "RJ");
        assert_eq!(neighborhoods, vec!["Icaraí", "Ingá", "São Francisco", "Centro"]);
        assert!(dataset
            .available_neighborhoods(&["Campinas"], "")
            .is_empty());
    }

    #[test]
    fn new_normalizes_codes_and_neighborhoods() {
        let dataset = LocationDataset::new(vec![state(
            " mg ",
            &[("Belo Horizonte", &["Savassi", " Savassi ", "", "Lourdes"])],
        )])
        .expect("dataset valid");
        let mg = dataset.state("MG").expect("code upper-cased");
        assert_eq!(mg.cities[0].neighborhoods, vec!["Savassi", "Lourdes"]);
    }

    #[test]
    fn new_rejects_duplicates_and_bad_codes() {
        let err = LocationDataset::new(vec![state("SP", &[]), state("sp", &[])])
            .expect_err("duplicate state");
        assert!(matches!(err, DatasetError::DuplicateState(code) if code == "SP"));

        let err = LocationDataset::new(vec![state("SP", &[("Santos", &[]), ("Santos", &[])])])
            .expect_err("duplicate city");
        assert!(matches!(err, DatasetError::DuplicateCity { .. }));

        let err = LocationDataset::new(vec![state("SAO", &[])]).expect_err("bad code");
        assert!(matches!(err, DatasetError::InvalidStateCode(_)));
    }
}
