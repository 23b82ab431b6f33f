//! Static location reference data: states, their cities and each city's
//! neighborhoods.

mod dataset;
mod loader;

pub use dataset::{CityRecord, DatasetError, LocationDataset, StateRecord};
