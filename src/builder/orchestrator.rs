//! Best-effort orchestration of native module builds.
//!
//! Every module in the catalog is attempted independently. A failing
//! module is reported and recorded, never propagated: the package always
//! installs, falling back to its pure implementation for anything that
//! did not compile.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::native::{CompileRequest, ModuleCompiler};
use crate::builder::outcome::{BuildOutcome, SkipReason};
use crate::builder::precheck::BuildDecision;
use crate::builder::toolchain::FlagSet;
use crate::core::module_spec::NativeModuleSpec;
use crate::core::platform::PlatformId;
use crate::util::diagnostic::{self, Diagnostic};

/// The compiler backend, or why it could not be set up.
pub enum CompilerState<'c> {
    Ready(&'c dyn ModuleCompiler),
    /// Toolchain initialization failed before any module was attempted.
    Unavailable(String),
}

/// Host facts and options shared by every module in one build.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub decision: BuildDecision,
    /// Flags after the precheck adjustment
    pub flags: FlagSet,
    pub out_dir: PathBuf,
    pub platform: PlatformId,
    /// Installation docs linked from failure messages
    pub documentation: Option<String>,
    pub color: bool,
    /// Draw a progress bar while compiling
    pub progress: bool,
}

impl BuildSettings {
    pub fn new(decision: BuildDecision, platform: PlatformId, out_dir: impl Into<PathBuf>) -> Self {
        BuildSettings {
            decision,
            flags: FlagSet::default(),
            out_dir: out_dir.into(),
            platform,
            documentation: None,
            color: false,
            progress: false,
        }
    }
}

/// Builds the native module catalog.
pub struct ExtensionBuilder<'c> {
    compiler: CompilerState<'c>,
    settings: BuildSettings,
}

impl<'c> ExtensionBuilder<'c> {
    pub fn new(compiler: CompilerState<'c>, settings: BuildSettings) -> Self {
        ExtensionBuilder { compiler, settings }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Attempt one module. Never fails: compiler errors and panics alike
    /// become a failed outcome with a diagnostic.
    pub fn build_module(&self, spec: &NativeModuleSpec) -> BuildOutcome {
        self.attempt(spec, None)
    }

    /// Attempt every module, returning one outcome per spec in catalog order.
    pub fn build_all(&self, specs: &[NativeModuleSpec]) -> Vec<BuildOutcome> {
        if let BuildDecision::Skip(reason) = self.settings.decision {
            if !specs.is_empty() {
                diagnostic::emit(&skip_notice(reason), self.settings.color);
            }
            return specs
                .iter()
                .map(|spec| BuildOutcome::skipped(spec.clone(), reason))
                .collect();
        }

        if let CompilerState::Unavailable(cause) = &self.compiler {
            let diag = self.phase_failure(cause);
            diagnostic::emit(&diag, self.settings.color);
            let text = diag.format(false);
            return specs
                .iter()
                .map(|spec| BuildOutcome::failed(spec.clone(), text.clone(), Default::default()))
                .collect();
        }

        let pb = self.progress_bar(specs.len());
        let outcomes = specs
            .iter()
            .map(|spec| {
                if let Some(pb) = &pb {
                    pb.set_message(spec.name().to_string());
                }
                let outcome = self.attempt(spec, pb.as_ref());
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                outcome
            })
            .collect();

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        outcomes
    }

    fn attempt(&self, spec: &NativeModuleSpec, pb: Option<&ProgressBar>) -> BuildOutcome {
        if let BuildDecision::Skip(reason) = self.settings.decision {
            return BuildOutcome::skipped(spec.clone(), reason);
        }

        let compiler = match &self.compiler {
            CompilerState::Ready(compiler) => *compiler,
            CompilerState::Unavailable(cause) => {
                let diag = self.phase_failure(cause);
                self.emit(&diag, pb);
                return BuildOutcome::failed(spec.clone(), diag.format(false), Default::default());
            }
        };

        let request = CompileRequest {
            spec,
            flags: &self.settings.flags,
            out_dir: &self.settings.out_dir,
            module_extension: self.settings.platform.module_extension(),
        };

        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| compiler.compile(&request)));
        let duration = start.elapsed();

        let cause = match result {
            Ok(Ok(artifact)) => {
                tracing::debug!("built `{}` in {:.2?}", spec.name(), duration);
                return BuildOutcome::built(spec.clone(), artifact, duration);
            }
            Ok(Err(err)) => format!("{:#}", err),
            Err(payload) => panic_message(payload.as_ref()),
        };

        tracing::debug!("building `{}` failed: {}", spec.name(), cause);
        let diag = self.module_failure(spec.name(), &cause);
        self.emit(&diag, pb);
        BuildOutcome::failed(spec.clone(), diag.format(false), duration)
    }

    /// Print a diagnostic without tearing a live progress bar.
    fn emit(&self, diag: &Diagnostic, pb: Option<&ProgressBar>) {
        match pb {
            Some(pb) => pb.suspend(|| diagnostic::emit(diag, self.settings.color)),
            None => diagnostic::emit(diag, self.settings.color),
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.settings.progress || total < 2 {
            return None;
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }

    fn module_failure(&self, module: &str, cause: &str) -> Diagnostic {
        let diag = Diagnostic::warning(format!(
            "the `{}` extension module could not be compiled",
            module
        ))
        .with_context(format!("caused by: {}", cause.trim()));
        self.with_guidance(diag)
    }

    fn phase_failure(&self, cause: &str) -> Diagnostic {
        let diag = Diagnostic::warning(
            "there was an issue with your platform configuration; \
             native extension modules could not be built",
        )
        .with_context(format!(
            "the C toolchain could not be initialized: {}",
            cause.trim()
        ));
        self.with_guidance(diag)
    }

    fn with_guidance(&self, diag: Diagnostic) -> Diagnostic {
        let mut diag = diag.with_context(
            "no extension module is required; the package still installs \
             and falls back to its pure implementation, which may be slower",
        );
        for hint in platform_hints(self.settings.platform) {
            diag = diag.with_suggestion(*hint);
        }
        if let Some(docs) = &self.settings.documentation {
            diag = diag.with_suggestion(format!(
                "see {} for platform-specific installation notes",
                docs
            ));
        }
        diag
    }
}

/// Informational notice printed once when the whole catalog is skipped.
pub fn skip_notice(reason: SkipReason) -> Diagnostic {
    Diagnostic::note(format!("{}; building no extension modules", reason.describe()))
        .with_context("the package falls back to its pure implementation")
}

/// Remediation steps that usually fix a missing toolchain on each platform.
pub fn platform_hints(platform: PlatformId) -> &'static [&'static str] {
    match platform {
        PlatformId::Linux => &[
            "Debian and Ubuntu: sudo apt-get install build-essential python3-dev",
            "Red Hat, CentOS and Fedora: sudo yum install gcc python3-devel",
        ],
        PlatformId::Windows => &[
            "install a prebuilt binary distribution of the package instead of building from source",
            "or install the Microsoft C++ Build Tools and rebuild",
        ],
        PlatformId::Darwin => &[
            "install the command line developer tools: xcode-select --install",
            "or install a prebuilt binary distribution of the package",
        ],
        PlatformId::Other => &["install a C compiler and the runtime's development headers"],
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("compiler backend panicked: {}", text)
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("compiler backend panicked: {}", text)
    } else {
        "compiler backend panicked".to_string()
    }
}
