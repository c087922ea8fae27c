#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Parameter Store: loading and merging calibration sources by priority,
//! content-addressing parameter/equation files, a completeness audit, and
//! the fingerprint-keyed sub-result cache.

pub mod audit;
pub mod cache;
pub mod calibrated;
pub mod error;
pub mod estimated;
pub mod fingerprint;
pub mod source;
pub mod store;

pub use audit::{ParamIssue, build_param_issues};
pub use cache::FingerprintCache;
pub use calibrated::parse_calibrated;
pub use error::{ParameterError, Result};
pub use estimated::parse_estimated;
pub use fingerprint::{content_hash, parameter_fingerprint};
pub use source::{ParameterEntry, ParameterSource, SourceTier};
pub use store::{merge, require};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
