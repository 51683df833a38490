//! Implementation of `slipway build`.
//!
//! One invocation makes every whole-catalog decision exactly once (build
//! or skip, toolchain, flag adjustment), attempts each extension module,
//! and writes a report that package assembly reads afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::{
    build_decision, detect_toolchain, platform_precheck, BuildOutcome, BuildSettings, BuildStatus,
    BuildSummary, CompilerState, ExtensionBuilder, NativeCompiler, SkipReason, ToolchainAdjustment,
};
use crate::core::manifest::Manifest;
use crate::core::platform::{HostPlatform, PlatformId, RuntimeKind};
use crate::resolver::{self, parse_feature_list};
use crate::util::GlobalContext;

/// File name of the build report inside the output directory.
pub const REPORT_NAME: &str = "slipway-report.json";

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit manifest path (default: search upward from cwd)
    pub manifest_path: Option<PathBuf>,

    /// Force native builds off
    pub no_ext: bool,

    /// Selected extras, comma-separated or repeated
    pub features: Vec<String>,

    /// Override the host platform
    pub platform: Option<PlatformId>,

    /// Override the target runtime
    pub runtime: Option<RuntimeKind>,

    /// Artifact directory
    pub out_dir: Option<PathBuf>,

    /// Show a progress bar while compiling
    pub progress: bool,
}

/// Build result.
#[derive(Debug)]
pub struct BuildResult {
    /// One outcome per extension, in manifest order
    pub outcomes: Vec<BuildOutcome>,

    pub summary: BuildSummary,

    /// Flag adjustment applied before compiling
    pub adjustment: ToolchainAdjustment,

    pub report: BuildReport,

    /// Where the report was written
    pub report_path: PathBuf,
}

/// Machine-readable summary consumed by package assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub package: ReportPackage,
    pub platform: PlatformId,
    pub runtime: String,
    pub extensions: Vec<ReportEntry>,
    /// Artifacts of built modules only
    pub artifacts: Vec<PathBuf>,
    /// Selected extras
    pub features: Vec<String>,
    /// Merged requirements of the selected extras, deduplicated
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPackage {
    pub name: String,
    pub version: String,
}

/// One module's line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl From<&BuildOutcome> for ReportEntry {
    fn from(outcome: &BuildOutcome) -> Self {
        ReportEntry {
            name: outcome.module().name().to_string(),
            status: outcome.status().as_str().to_string(),
            reason: match outcome.status() {
                BuildStatus::Skipped(reason) => Some(*reason),
                _ => None,
            },
            diagnostic: outcome.diagnostic().map(String::from),
            artifact: outcome.artifact().cloned(),
        }
    }
}

impl BuildReport {
    /// Write the report as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize build report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write build report: {}", path.display()))
    }
}

/// Build the extension catalog of the package found from `ctx`.
///
/// Extension failures are recorded in the result, not returned as errors.
/// Only manifest, configuration and usage problems fail the build.
pub fn build(ctx: &GlobalContext, opts: &BuildOptions) -> Result<BuildResult> {
    let manifest_path = match &opts.manifest_path {
        Some(path) => path.clone(),
        None => ctx.find_manifest()?,
    };
    let manifest = Manifest::load(&manifest_path)?;
    let root = manifest.root().to_path_buf();
    let config = ctx.load_config(&root);

    let HostPlatform { platform, runtime } = HostPlatform::detect().with_overrides(
        opts.platform,
        opts.runtime.clone().or_else(|| config.runtime_kind()),
    );

    // Selection errors are reported before anything is compiled
    let features = if opts.features.is_empty() {
        parse_feature_list(&config.build.features)
    } else {
        parse_feature_list(&opts.features)
    };
    let matrix = resolver::resolve(platform);
    let requirements = resolver::select(&matrix, &features)?;

    let out_dir = match (&opts.out_dir, &config.build.out_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => root.join(dir),
        (None, None) => ctx.target_dir(&root),
    };
    ctx.ensure_dir(&out_dir)?;

    let decision = build_decision(&runtime, opts.no_ext || config.no_ext());
    let catalog = manifest.catalog();

    tracing::debug!(
        "building {} v{} for {} ({} runtime)",
        manifest.package().name,
        manifest.package().version,
        platform,
        runtime
    );

    let mut native = None;
    let mut unavailable = None;
    let mut adjustment = ToolchainAdjustment::None;
    if decision.is_attempt() && !catalog.is_empty() {
        match detect_toolchain(config.toolchain.cc.as_deref()) {
            Ok(toolchain) => {
                adjustment = platform_precheck(platform, Some(&toolchain.info()));
                let include_dirs = config
                    .toolchain
                    .include_dirs
                    .iter()
                    .map(|dir| root.join(dir))
                    .collect();
                native = Some(NativeCompiler::new(toolchain, include_dirs));
            }
            Err(e) => {
                adjustment = platform_precheck(platform, None);
                unavailable = Some(format!("{:#}", e));
            }
        }
    }

    let compiler = match (&native, unavailable) {
        (Some(native), _) => CompilerState::Ready(native),
        (None, Some(cause)) => CompilerState::Unavailable(cause),
        (None, None) => CompilerState::Unavailable("native builds were not attempted".to_string()),
    };

    let settings = BuildSettings {
        decision,
        flags: adjustment.apply(config.flags()),
        out_dir: out_dir.clone(),
        platform,
        documentation: manifest.package().documentation.clone(),
        color: ctx.color(),
        progress: opts.progress,
    };

    let outcomes = ExtensionBuilder::new(compiler, settings).build_all(&catalog);
    let summary = BuildSummary::from_outcomes(&outcomes);

    let report = BuildReport {
        package: ReportPackage {
            name: manifest.package().name.clone(),
            version: manifest.package().version.to_string(),
        },
        platform,
        runtime: runtime.to_string(),
        extensions: outcomes.iter().map(ReportEntry::from).collect(),
        artifacts: outcomes.iter().filter_map(|o| o.artifact().cloned()).collect(),
        features,
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
    };

    let report_path = out_dir.join(REPORT_NAME);
    report.save(&report_path)?;

    Ok(BuildResult {
        outcomes,
        summary,
        adjustment,
        report,
        report_path,
    })
}
