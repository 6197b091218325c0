use thiserror::Error;

use crate::model::Location;

/// One key of a `collect` batch that could not be refreshed.
#[derive(Debug)]
pub struct KeyFailure {
    pub key: String,
    pub error: anyhow::Error,
}

/// Failures gathered over a whole `collect` batch.
#[derive(Debug, Error)]
#[error("{source_name}: failed to collect {} key(s): {}", .failures.len(), summary(.failures))]
pub struct CollectError {
    pub source_name: &'static str,
    pub failures: Vec<KeyFailure>,
}

impl CollectError {
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.key.as_str())
    }
}

fn summary(failures: &[KeyFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({:#})", f.key, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("No weather data for {location}")]
    WeatherUnavailable {
        location: Location,
        #[source]
        cause: Option<CollectError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_error_lists_every_failed_key() {
        let err = CollectError {
            source_name: "weather",
            failures: vec![
                KeyFailure { key: "ru_moscow".into(), error: anyhow::anyhow!("timeout") },
                KeyFailure { key: "de_berlin".into(), error: anyhow::anyhow!("HTTP 500") },
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("weather: failed to collect 2 key(s)"));
        assert!(msg.contains("ru_moscow (timeout)"));
        assert!(msg.contains("de_berlin (HTTP 500)"));
        assert_eq!(err.failed_keys().collect::<Vec<_>>(), ["ru_moscow", "de_berlin"]);
    }

    #[test]
    fn weather_unavailable_names_the_location() {
        let err = ReaderError::WeatherUnavailable {
            location: Location::new("Moscow", "RU"),
            cause: None,
        };
        assert_eq!(err.to_string(), "No weather data for Moscow, RU");
    }
}
