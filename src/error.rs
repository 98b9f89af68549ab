use thiserror::Error;

/// Invalid tunables. Scoring itself never fails; only configuration can.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("score weights must sum to 1.0 (got {0:.4})")]
    WeightSum(f64),

    #[error("score weight `{name}` must be a finite non-negative number (got {value})")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("band `{name}` is invalid: min {min} must be positive and not above max {max}")]
    InvalidBand {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("`{name}` must be a finite non-negative number (got {value})")]
    InvalidValue { name: &'static str, value: f64 },
}
