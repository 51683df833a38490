//! Slipway.toml manifest parsing.
//!
//! The manifest is the build definition: package identity plus the fixed
//! catalog of native modules.
//!
//! ```toml
//! [package]
//! name = "dbclient"
//! version = "4.1.0"
//! documentation = "https://dbclient.example/installation.html"
//!
//! [[extension]]
//! name = "codec._speedups"
//! include-dirs = ["codec"]
//! sources = ["codec/_speedups.c", "codec/buffer.c"]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::Deserialize;
use thiserror::Error;

use crate::core::module_spec::NativeModuleSpec;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Slipway.toml";

/// Errors raised while locating or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Slipway.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid package version `{version}`")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("extension at position {index} has an empty name")]
    EmptyName { index: usize },

    #[error("invalid extension name `{name}`: each dotted part must be an identifier")]
    InvalidName { name: String },

    #[error("extension `{name}` is declared more than once")]
    DuplicateExtension { name: String },

    #[error("extension `{name}` has no sources")]
    NoSources { name: String },
}

/// Package identity from `[package]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: Version,
    /// Installation docs linked from build failure messages
    pub documentation: Option<String>,
}

/// A parsed and validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    package: PackageInfo,
    extensions: Vec<NativeModuleSpec>,
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: RawPackage,
    #[serde(default, rename = "extension")]
    extensions: Vec<NativeModuleSpec>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default)]
    documentation: Option<String>,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse manifest content. `path` is used for error messages and to
    /// determine the project root.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let version =
            Version::parse(&raw.package.version).map_err(|source| ManifestError::InvalidVersion {
                version: raw.package.version.clone(),
                source,
            })?;

        validate_catalog(&raw.extensions)?;

        Ok(Manifest {
            package: PackageInfo {
                name: raw.package.name,
                version,
                documentation: raw.package.documentation,
            },
            extensions: raw.extensions,
            root: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        })
    }

    pub fn package(&self) -> &PackageInfo {
        &self.package
    }

    /// The module catalog with paths resolved against the project root.
    pub fn catalog(&self) -> Vec<NativeModuleSpec> {
        self.extensions
            .iter()
            .map(|spec| spec.rooted_at(&self.root))
            .collect()
    }

    /// Directory containing the manifest.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Check catalog invariants: unique dotted identifier names, at least one
/// source each.
pub fn validate_catalog(specs: &[NativeModuleSpec]) -> Result<(), ManifestError> {
    let mut seen = HashSet::new();
    for (index, spec) in specs.iter().enumerate() {
        if spec.name().trim().is_empty() {
            return Err(ManifestError::EmptyName { index });
        }
        if !spec.has_valid_name() {
            return Err(ManifestError::InvalidName {
                name: spec.name().to_string(),
            });
        }
        if !seen.insert(spec.name()) {
            return Err(ManifestError::DuplicateExtension {
                name: spec.name().to_string(),
            });
        }
        if spec.sources().is_empty() {
            return Err(ManifestError::NoSources {
                name: spec.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Find `Slipway.toml` in `start` or the nearest parent directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}
