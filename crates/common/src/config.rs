use std::str::FromStr;

use crate::{Error, Result};

/// Runtime settings loaded from environment variables at startup.
/// Every setting has a default; malformed values are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the TOML parameter grid used by the backtest command.
    pub grid_config_path: String,
    /// Upper bound on wall time for one whole grid batch.
    pub grid_timeout_secs: u64,
    /// Worker threads for the grid search. `None` uses rayon's default.
    pub grid_threads: Option<usize>,
    /// How many ranked backtest results to report.
    pub top_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_config_path: "config/grid.toml".to_string(),
            grid_timeout_secs: 30,
            grid_threads: None,
            top_results: 3,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let grid_threads = match lookup("GRID_THREADS") {
            Some(raw) => {
                let threads: usize = parse_var("GRID_THREADS", &raw)?;
                if threads == 0 {
                    return Err(Error::Config("GRID_THREADS must be at least 1".into()));
                }
                Some(threads)
            }
            None => None,
        };

        let config = Config {
            grid_config_path: lookup("GRID_CONFIG_PATH").unwrap_or(defaults.grid_config_path),
            grid_timeout_secs: lookup("GRID_TIMEOUT_SECS")
                .map(|raw| parse_var("GRID_TIMEOUT_SECS", &raw))
                .transpose()?
                .unwrap_or(defaults.grid_timeout_secs),
            grid_threads,
            top_results: lookup("SIGNAL_TOP_RESULTS")
                .map(|raw| parse_var("SIGNAL_TOP_RESULTS", &raw))
                .transpose()?
                .unwrap_or(defaults.top_results),
        };

        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::Config(format!(
            "environment variable '{key}' has an invalid value: '{raw}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GRID_CONFIG_PATH", "/tmp/grid.toml"),
            ("GRID_TIMEOUT_SECS", " 5 "),
            ("GRID_THREADS", "4"),
            ("SIGNAL_TOP_RESULTS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.grid_config_path, "/tmp/grid.toml");
        assert_eq!(config.grid_timeout_secs, 5);
        assert_eq!(config.grid_threads, Some(4));
        assert_eq!(config.top_results, 10);
    }

    #[test]
    fn malformed_value_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("GRID_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }

    #[test]
    fn zero_threads_rejected() {
        let err = Config::from_lookup(lookup_from(&[("GRID_THREADS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }
}
