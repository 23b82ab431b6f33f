use super::dataset::{CityRecord, DatasetError, LocationDataset, StateRecord};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

impl LocationDataset {
    /// Reads the nested `[{ code, name, cities: [{ name, neighborhoods }] }]` layout.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let states: Vec<StateRecord> = serde_json::from_reader(reader)?;
        Self::new(states)
    }

    /// Reads a flat `state_code,state_name,city,neighborhood` export.
    ///
    /// Rows are grouped in order of first appearance. A row with an empty
    /// `neighborhood` declares a city without neighborhoods, and a row with an
    /// empty `city` declares a state without cities.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut states: Vec<StateRecord> = Vec::new();

        for record in csv_reader.deserialize::<LocationRow>() {
            let row = record?;
            let code = row.state_code.to_ascii_uppercase();

            let index = match states.iter().position(|state| state.code == code) {
                Some(index) => {
                    let existing = &states[index].name;
                    if existing != &row.state_name {
                        return Err(DatasetError::ConflictingStateName {
                            code,
                            first: existing.clone(),
                            second: row.state_name,
                        });
                    }
                    index
                }
                None => {
                    states.push(StateRecord {
                        code,
                        name: row.state_name,
                        cities: Vec::new(),
                    });
                    states.len() - 1
                }
            };

            let Some(city_name) = row.city else {
                continue;
            };
            let cities = &mut states[index].cities;
            let city = match cities.iter().position(|city| city.name == city_name) {
                Some(position) => &mut cities[position],
                None => {
                    cities.push(CityRecord {
                        name: city_name,
                        neighborhoods: Vec::new(),
                    });
                    let last = cities.len() - 1;
                    &mut cities[last]
                }
            };

            if let Some(neighborhood) = row.neighborhood {
                city.neighborhoods.push(neighborhood);
            }
        }

        Self::new(states)
    }

    /// Loads a dataset export, choosing the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let open = || {
            File::open(path)
                .map(BufReader::new)
                .map_err(|source| DatasetError::Io {
                    path: path.to_path_buf(),
                    source,
                })
        };

        let dataset = match extension.as_deref() {
            Some("json") => Self::from_json_reader(open()?)?,
            Some("csv") => Self::from_csv_reader(open()?)?,
            _ => return Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
        };

        info!(
            path = %path.display(),
            states = dataset.states().len(),
            "location dataset loaded"
        );
        Ok(dataset)
    }
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    state_code: String,
    state_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    neighborhood: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
