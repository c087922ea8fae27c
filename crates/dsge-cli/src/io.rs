//! Loading of parameter/equation/allowlist files shared by every subcommand.
//!
//! Grounded on `original_source/.../steady_state.py::load_parameters`'s
//! four-file merge (here: two calibrated files plus one estimated file) and
//! `steady_state_contract.py::_load_allowlist`'s tolerance/exempt-residual
//! default.

use dsge_equations::{Equation, EquationError, EquationLibrary};
use dsge_model::{ParameterCategory, ParameterSet};
use dsge_params::{content_hash, merge, parse_calibrated, parse_estimated, ParameterError, SourceTier};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the files a subcommand needs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A named file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A parameter file failed to parse or merge.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// An equation file was not valid JSON.
    #[error("failed to parse equation file {path}: {source}")]
    EquationJson {
        /// The offending file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// An equation file parsed as JSON but failed `EquationLibrary`'s own
    /// validation (e.g. a primitive call with the wrong arity).
    #[error(transparent)]
    Equation(#[from] EquationError),
}

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Platform-specific default directory the CLI looks for model files in
/// when a path isn't given explicitly (`~/.config/dsge` on Linux).
pub fn default_model_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("dsge")
}

/// Load and merge the two calibrated parameter files plus the estimated
/// file, returning the merged set and the SHA-256 content hash over the
/// concatenation of all three, in the order given (§6: the
/// `parameters_snapshot_hash` recorded on every `SimulationRun`).
pub fn load_parameter_set(
    nonfiscal_calibrated: &Path,
    fiscal_calibrated: &Path,
    estimated: &Path,
) -> Result<(ParameterSet, String), LoadError> {
    let nonfiscal_text = read_to_string(nonfiscal_calibrated)?;
    let fiscal_text = read_to_string(fiscal_calibrated)?;
    let estimated_text = read_to_string(estimated)?;

    let nonfiscal_source = parse_calibrated(
        &nonfiscal_text,
        SourceTier::NonFiscalCalibrated,
        ParameterCategory::Technology,
        &BTreeMap::new(),
    )?;
    let fiscal_source = parse_calibrated(
        &fiscal_text,
        SourceTier::FiscalCalibrated,
        ParameterCategory::FiscalRatio,
        &BTreeMap::new(),
    )?;
    let estimated_source = parse_estimated(&estimated_text, &BTreeMap::new())?;

    let set = merge(&[nonfiscal_source, fiscal_source, estimated_source])?;

    let mut snapshot = String::new();
    snapshot.push_str(&nonfiscal_text);
    snapshot.push_str(&fiscal_text);
    snapshot.push_str(&estimated_text);
    let hash = content_hash(snapshot.as_bytes());

    Ok((set, hash))
}

/// Load an equation file: a JSON array of `Equation` records. No allowlist
/// is applied here; the caller decides whether to wrap the result with
/// `EquationLibrary::with_allowlist`.
pub fn load_equation_library(path: &Path) -> Result<EquationLibrary, LoadError> {
    let text = read_to_string(path)?;
    let equations: Vec<Equation> = serde_json::from_str(&text).map_err(|source| LoadError::EquationJson {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EquationLibrary::new(equations)?)
}

/// The steady-state contract allowlist: a tolerance and a set of residual
/// names exempted from it, matching `steady_state_contract.py`'s
/// `_load_allowlist`.
#[derive(Debug, Clone, Deserialize)]
pub struct SteadyStateAllowlist {
    /// Maximum tolerated absolute residual for any non-exempt entry.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Residual names exempted from the tolerance check.
    #[serde(default)]
    pub exempt_residuals: Vec<String>,
}

fn default_tolerance() -> f64 {
    1.0e-10
}

impl Default for SteadyStateAllowlist {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            exempt_residuals: Vec::new(),
        }
    }
}

/// Load the steady-state allowlist from `path`, defaulting to
/// `{tolerance: 1e-10, exempt_residuals: []}` when `path` does not exist.
pub fn load_allowlist(path: &Path) -> Result<SteadyStateAllowlist, LoadError> {
    if !path.exists() {
        return Ok(SteadyStateAllowlist::default());
    }
    let text = read_to_string(path)?;
    let allowlist: SteadyStateAllowlist = serde_yaml::from_str(&text).map_err(ParameterError::from)?;
    Ok(allowlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_allowlist_file_falls_back_to_defaults() {
        let allowlist = load_allowlist(Path::new("/nonexistent/allowlist.yaml")).unwrap();
        assert_eq!(allowlist.tolerance, 1.0e-10);
        assert!(allowlist.exempt_residuals.is_empty());
    }
}
