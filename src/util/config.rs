//! Configuration file support for Slipway.
//!
//! Slipway reads two configuration files:
//! - Global: `~/.slipway/config.toml` - User-wide defaults
//! - Project: `.slipway/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Both take
//! precedence over the `CC`, `CFLAGS`, `LDFLAGS` and `SLIPWAY_NO_EXT`
//! environment variables; command-line flags take precedence over all.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::FlagSet;
use crate::core::platform::RuntimeKind;

/// Environment variable that disables native extension builds.
pub const NO_EXT_ENV: &str = "SLIPWAY_NO_EXT";

/// Slipway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Toolchain overrides
    pub toolchain: ToolchainSettings,

    /// Target runtime settings
    pub runtime: RuntimeConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Skip native extension builds
    pub no_ext: Option<bool>,

    /// Artifact directory, relative to the project root
    pub out_dir: Option<PathBuf>,

    /// Extras selected when none are given on the command line
    pub features: Vec<String>,
}

/// Toolchain settings for C compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,

    /// Header directories appended to every module (e.g. runtime headers)
    pub include_dirs: Vec<PathBuf>,
}

/// Target runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime implementation name (`reference`, `pypy`, ...)
    pub kind: Option<String>,

    /// Interpreter to ask about its implementation when `kind` is unset
    pub probe: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.no_ext.is_some() {
            self.build.no_ext = other.build.no_ext;
        }
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if !other.build.features.is_empty() {
            self.build.features = other.build.features;
        }

        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }
        if !other.toolchain.include_dirs.is_empty() {
            self.toolchain.include_dirs = other.toolchain.include_dirs;
        }

        if other.runtime.kind.is_some() {
            self.runtime.kind = other.runtime.kind;
        }
        if other.runtime.probe.is_some() {
            self.runtime.probe = other.runtime.probe;
        }
    }

    /// Whether native builds are disabled, falling back to `SLIPWAY_NO_EXT`.
    pub fn no_ext(&self) -> bool {
        self.build
            .no_ext
            .unwrap_or_else(|| env_flag(std::env::var(NO_EXT_ENV).ok().as_deref()))
    }

    /// Compiler flags: configured lists win over `CFLAGS`/`LDFLAGS`.
    pub fn flags(&self) -> FlagSet {
        let env = FlagSet::from_env();
        FlagSet::new(
            if self.toolchain.cflags.is_empty() {
                env.cflags
            } else {
                self.toolchain.cflags.clone()
            },
            if self.toolchain.ldflags.is_empty() {
                env.ldflags
            } else {
                self.toolchain.ldflags.clone()
            },
        )
    }

    /// The configured runtime, probing the interpreter when only `probe` is set.
    pub fn runtime_kind(&self) -> Option<RuntimeKind> {
        if let Some(kind) = &self.runtime.kind {
            return Some(RuntimeKind::parse(kind));
        }
        self.runtime.probe.as_deref().map(RuntimeKind::probe)
    }
}

/// Interpret a boolean-ish environment value (`1`, `true`, `yes`, `on`).
pub fn env_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.slipway/config.toml)
/// 2. Global config (~/.slipway/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global slipway config directory (~/.slipway).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slipway"))
}

/// Get the project config path (.slipway/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".slipway").join("config.toml")
}
