//! Host platform facts.
//!
//! The build only ever branches on two facts about the host: which
//! operating system family it is ([`PlatformId`]) and whether the runtime
//! that will import the package can load compiled modules at all
//! ([`RuntimeKind`]). Both are read-only once detected.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::process::ProcessBuilder;

/// Operating system family of the build host.
///
/// Parsing is total: anything unrecognized becomes [`PlatformId::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Linux,
    Windows,
    Darwin,
    Other,
}

impl PlatformId {
    /// Detect the host platform from the compile-time target OS.
    pub fn host() -> Self {
        PlatformId::parse(std::env::consts::OS)
    }

    /// Classify a platform string.
    ///
    /// Accepts Rust OS names (`macos`, `windows`) and runtime-style names
    /// (`darwin`, `win32`, `linux2`). POSIX layers on Windows (`cygwin`,
    /// `msys`) cannot load native Windows modules and are [`PlatformId::Other`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        if s.starts_with("linux") {
            PlatformId::Linux
        } else if matches!(s.as_str(), "windows" | "win32") {
            PlatformId::Windows
        } else if matches!(s.as_str(), "darwin" | "macos" | "osx") {
            PlatformId::Darwin
        } else {
            PlatformId::Other
        }
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Linux => "linux",
            PlatformId::Windows => "windows",
            PlatformId::Darwin => "darwin",
            PlatformId::Other => "other",
        }
    }

    /// File extension of a loadable native module on this platform.
    pub fn module_extension(&self) -> &'static str {
        match self {
            PlatformId::Windows => "pyd",
            _ => "so",
        }
    }
}

impl FromStr for PlatformId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PlatformId::parse(s))
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The runtime implementation that will load the package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RuntimeKind {
    /// Reference implementation; loads compiled extension modules.
    #[default]
    Reference,
    /// Alternative implementation (e.g. `pypy`, `jython`, `ironpython`)
    /// that cannot load them.
    Alternative(String),
}

impl RuntimeKind {
    /// Check if compiled modules can be loaded by this runtime.
    pub fn loads_native_modules(&self) -> bool {
        matches!(self, RuntimeKind::Reference)
    }

    /// Parse a runtime name. `reference` and `cpython` are the reference
    /// implementation; any other name is an alternative runtime.
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "" | "reference" | "cpython" => RuntimeKind::Reference,
            _ => RuntimeKind::Alternative(s),
        }
    }

    /// Classify the `sys.platform` / `sys.version` pair reported by an
    /// interpreter.
    pub fn classify(platform: &str, version: &str) -> Self {
        let platform = platform.trim();
        if platform.starts_with("java") {
            RuntimeKind::Alternative("jython".to_string())
        } else if platform == "cli" {
            RuntimeKind::Alternative("ironpython".to_string())
        } else if version.contains("PyPy") {
            RuntimeKind::Alternative("pypy".to_string())
        } else {
            RuntimeKind::Reference
        }
    }

    /// Ask an interpreter which implementation it is.
    ///
    /// Any failure to run or parse the probe yields [`RuntimeKind::Reference`].
    pub fn probe(interpreter: &Path) -> Self {
        let output = ProcessBuilder::new(interpreter)
            .args(["-c", "import sys; print(sys.platform); print(sys.version)"])
            .exec_and_check();

        match output {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let mut lines = stdout.lines();
                let platform = lines.next().unwrap_or("");
                let version: Vec<&str> = lines.collect();
                let kind = RuntimeKind::classify(platform, &version.join("\n"));
                tracing::debug!("runtime probe `{}` -> {}", interpreter.display(), kind);
                kind
            }
            Err(e) => {
                tracing::debug!(
                    "runtime probe `{}` failed, assuming reference runtime: {:#}",
                    interpreter.display(),
                    e
                );
                RuntimeKind::Reference
            }
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::Reference => f.write_str("reference"),
            RuntimeKind::Alternative(name) => f.write_str(name),
        }
    }
}

/// Facts about the build host, supplied once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub platform: PlatformId,
    pub runtime: RuntimeKind,
}

impl HostPlatform {
    pub fn new(platform: PlatformId, runtime: RuntimeKind) -> Self {
        HostPlatform { platform, runtime }
    }

    /// The host OS with a reference runtime.
    pub fn detect() -> Self {
        HostPlatform::new(PlatformId::host(), RuntimeKind::Reference)
    }

    /// Replace detected facts with explicitly requested ones.
    pub fn with_overrides(
        self,
        platform: Option<PlatformId>,
        runtime: Option<RuntimeKind>,
    ) -> Self {
        HostPlatform {
            platform: platform.unwrap_or(self.platform),
            runtime: runtime.unwrap_or(self.runtime),
        }
    }
}
