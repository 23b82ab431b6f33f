use imoveis_search::config::SearchConfig;
use imoveis_search::locations::{DatasetError, LocationDataset};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the dataset named by `override_path`, then the configured one, and
/// falls back to the bundled dataset.
pub(crate) fn load_dataset(
    config: &SearchConfig,
    override_path: Option<&Path>,
) -> Result<LocationDataset, DatasetError> {
    match override_path.or(config.locations_path.as_deref()) {
        Some(path) => LocationDataset::from_path(path),
        None => {
            let dataset = LocationDataset::bundled()?;
            info!(states = dataset.states().len(), "using bundled location dataset");
            Ok(dataset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn falls_back_to_bundled_dataset() {
        let dataset = load_dataset(&SearchConfig::default(), None).expect("bundled loads");
        assert!(dataset.state("SP").is_some());
    }

    #[test]
    fn override_path_wins_over_config() {
        let config = SearchConfig {
            locations_path: Some(PathBuf::from("/nonexistent/locations.json")),
            ..SearchConfig::default()
        };
        let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/locations.json");
        let dataset = load_dataset(&config, Some(&bundled)).expect("override loads");
        assert_eq!(dataset, LocationDataset::bundled().expect("bundled dataset"));

        let err = load_dataset(&config, None).expect_err("configured path missing");
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
