//! Optional feature resolution.
//!
//! [`resolve`] maps the host platform to its feature matrix; [`select`]
//! turns the extras a user asked for into one flat requirement list.

pub mod catalog;

pub use catalog::resolve;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::feature::{FeatureMatrix, Requirement};

/// An extra that the matrix does not define was requested.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("unknown feature `{feature}`")]
#[diagnostic(code(slipway::resolve::unknown_feature))]
pub struct FeatureSelectionError {
    pub feature: String,
    #[help]
    pub suggestion: Option<String>,
}

impl FeatureSelectionError {
    fn new(feature: &str, matrix: &FeatureMatrix) -> Self {
        let available: Vec<&str> = matrix.keys().collect();
        FeatureSelectionError {
            feature: feature.to_string(),
            suggestion: Some(format!("available features: {}", available.join(", "))),
        }
    }
}

/// Collect the requirements of the selected extras.
///
/// Requirements keep the order of first appearance; an identical
/// requirement pulled in by two extras is listed once.
pub fn select<S: AsRef<str>>(
    matrix: &FeatureMatrix,
    selected: &[S],
) -> Result<Vec<Requirement>, FeatureSelectionError> {
    let mut requirements: Vec<Requirement> = Vec::new();
    for key in selected {
        let key = key.as_ref().trim();
        if key.is_empty() {
            continue;
        }
        let group = matrix
            .get(key)
            .ok_or_else(|| FeatureSelectionError::new(key, matrix))?;
        for req in group {
            if !requirements.contains(req) {
                requirements.push(req.clone());
            }
        }
    }
    Ok(requirements)
}

/// Split comma-separated feature arguments (`--features a,b --features c`).
pub fn parse_feature_list<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
