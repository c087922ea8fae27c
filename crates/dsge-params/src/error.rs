//! Errors raised while loading, merging, and auditing calibration
//! parameters.

use thiserror::Error;

/// Result type for parameter-store operations.
pub type Result<T> = std::result::Result<T, ParameterError>;

/// Errors that can occur while loading or merging parameters.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// A name required by the Equation Library (or requested directly) is
    /// absent from the merged parameter set.
    #[error("missing parameter: {name}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// Two sources bound the same name to conflicting values and neither
    /// was marked as an override.
    #[error(
        "parameter conflict for {name}: {first} (from {first_tier}) vs {second} (from {second_tier})"
    )]
    ParameterConflict {
        /// Conflicting parameter name.
        name: String,
        /// Value from the earlier (lower-priority) source.
        first: f64,
        /// Tier name of the earlier source.
        first_tier: String,
        /// Value from the later (higher-priority) source.
        second: f64,
        /// Tier name of the later source.
        second_tier: String,
    },

    /// YAML parsing failure.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failure (used for equation-file content addressing).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An estimated-parameter record had neither a bare scalar nor a valid
    /// `{mode, mean, std, prior}` shape.
    #[error("malformed estimated parameter record for {name}")]
    MalformedEstimated {
        /// Name of the offending record.
        name: String,
    },
}
