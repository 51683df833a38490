//! Per-module build results.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::module_spec::NativeModuleSpec;

/// Why a module was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The target runtime cannot load compiled modules.
    UnsupportedRuntime,
    /// Native builds were switched off by the user.
    DisabledByUser,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::UnsupportedRuntime => {
                "native extensions are not supported by this runtime implementation"
            }
            SkipReason::DisabledByUser => "native extensions were disabled for this build",
        }
    }
}

/// Status of one module after a build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Compiled and linked; the artifact is ready for packaging.
    Built { artifact: PathBuf },
    /// Not attempted.
    Skipped(SkipReason),
    /// The toolchain failed; the package falls back to the pure implementation.
    Failed,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Built { .. } => "built",
            BuildStatus::Skipped(_) => "skipped",
            BuildStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of attempting one [`NativeModuleSpec`].
///
/// A diagnostic is present exactly when the module was not built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    module: NativeModuleSpec,
    status: BuildStatus,
    diagnostic: Option<String>,
    duration: Duration,
}

impl BuildOutcome {
    /// Create a successful outcome.
    pub fn built(module: NativeModuleSpec, artifact: PathBuf, duration: Duration) -> Self {
        BuildOutcome {
            module,
            status: BuildStatus::Built { artifact },
            diagnostic: None,
            duration,
        }
    }

    /// Create a skipped outcome.
    pub fn skipped(module: NativeModuleSpec, reason: SkipReason) -> Self {
        BuildOutcome {
            module,
            status: BuildStatus::Skipped(reason),
            diagnostic: Some(reason.describe().to_string()),
            duration: Duration::ZERO,
        }
    }

    /// Create a failed outcome.
    pub fn failed(module: NativeModuleSpec, diagnostic: String, duration: Duration) -> Self {
        BuildOutcome {
            module,
            status: BuildStatus::Failed,
            diagnostic: Some(diagnostic),
            duration,
        }
    }

    pub fn module(&self) -> &NativeModuleSpec {
        &self.module
    }

    pub fn status(&self) -> &BuildStatus {
        &self.status
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_built(&self) -> bool {
        matches!(self.status, BuildStatus::Built { .. })
    }

    /// Path of the built artifact, if any.
    pub fn artifact(&self) -> Option<&PathBuf> {
        match &self.status {
            BuildStatus::Built { artifact } => Some(artifact),
            _ => None,
        }
    }
}

/// Counts over a finished `build_all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl BuildSummary {
    pub fn from_outcomes(outcomes: &[BuildOutcome]) -> Self {
        outcomes.iter().fold(BuildSummary::default(), |mut acc, o| {
            match o.status() {
                BuildStatus::Built { .. } => acc.built += 1,
                BuildStatus::Skipped(_) => acc.skipped += 1,
                BuildStatus::Failed => acc.failed += 1,
            }
            acc.duration += o.duration();
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> NativeModuleSpec {
        NativeModuleSpec::new(name, Vec::<PathBuf>::new(), [format!("{name}.c")])
    }

    #[test]
    fn test_diagnostic_presence() {
        let built = BuildOutcome::built(spec("a"), PathBuf::from("a.so"), Duration::from_secs(1));
        assert!(built.diagnostic().is_none());
        assert_eq!(built.artifact(), Some(&PathBuf::from("a.so")));

        let skipped = BuildOutcome::skipped(spec("b"), SkipReason::DisabledByUser);
        assert!(skipped.diagnostic().unwrap().contains("disabled"));
        assert_eq!(skipped.duration(), Duration::ZERO);
        assert!(skipped.artifact().is_none());

        let failed = BuildOutcome::failed(spec("c"), "boom".to_string(), Duration::ZERO);
        assert_eq!(failed.diagnostic(), Some("boom"));
        assert_eq!(failed.status().as_str(), "failed");
    }

    #[test]
    fn test_summary_mixed() {
        let outcomes = vec![
            BuildOutcome::built(spec("a"), PathBuf::from("a.so"), Duration::from_secs(1)),
            BuildOutcome::failed(spec("b"), "error".to_string(), Duration::from_secs(2)),
            BuildOutcome::built(spec("c"), PathBuf::from("c.so"), Duration::from_secs(3)),
        ];

        let summary = BuildSummary::from_outcomes(&outcomes);
        assert_eq!(summary.built, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.duration, Duration::from_secs(6));
    }

    #[test]
    fn test_summary_empty() {
        let summary = BuildSummary::from_outcomes(&[]);
        assert_eq!(summary, BuildSummary::default());
    }
}
