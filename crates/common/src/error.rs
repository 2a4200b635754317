use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Series length mismatch: expected {expected} {series} values, got {actual}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fails with `InsufficientData` when fewer than `required` values are available.
    pub fn ensure_len(actual: usize, required: usize) -> Result<()> {
        if actual < required {
            return Err(Error::InsufficientData { required, actual });
        }
        Ok(())
    }

    /// Fails with `LengthMismatch` when a paired series is not index-aligned with the prices.
    pub fn ensure_paired(series: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Error::LengthMismatch {
                series,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_len_accepts_exact_minimum() {
        assert!(Error::ensure_len(27, 27).is_ok());
    }

    #[test]
    fn ensure_len_reports_required_and_actual() {
        match Error::ensure_len(10, 16) {
            Err(Error::InsufficientData { required, actual }) => {
                assert_eq!(required, 16);
                assert_eq!(actual, 10);
            }
            other => panic!("Expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn ensure_paired_names_the_series() {
        let err = Error::ensure_paired("timestamp", 60, 59).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Series length mismatch: expected 60 timestamp values, got 59"
        );
    }
}
