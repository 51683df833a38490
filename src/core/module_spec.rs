//! Native acceleration module definitions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One candidate native acceleration module.
///
/// Specs are immutable: the catalog is fixed when the manifest is read
/// and never rewritten by the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NativeModuleSpec {
    /// Dotted import name of the compiled artifact (e.g. `codec._speedups`)
    name: String,
    /// Header search directories, in order
    #[serde(default)]
    include_dirs: Vec<PathBuf>,
    /// Source inputs, in order
    sources: Vec<PathBuf>,
}

impl NativeModuleSpec {
    /// Create a new module spec.
    pub fn new(
        name: impl Into<String>,
        include_dirs: impl IntoIterator<Item = impl Into<PathBuf>>,
        sources: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        NativeModuleSpec {
            name: name.into(),
            include_dirs: include_dirs.into_iter().map(Into::into).collect(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Check that every dotted component is an identifier
    /// (`[A-Za-z_][A-Za-z0-9_]*`), so the artifact path stays relative.
    pub fn has_valid_name(&self) -> bool {
        self.name.split('.').all(|component| {
            let mut chars = component.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    }

    /// Relative path of the built artifact: each dotted component becomes
    /// a directory, the leaf gets the platform module extension.
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.name.split('.').collect();
        path.set_extension(extension);
        path
    }

    /// Resolve relative include dirs and sources against the project root.
    pub fn rooted_at(&self, root: &Path) -> NativeModuleSpec {
        NativeModuleSpec {
            name: self.name.clone(),
            include_dirs: self.include_dirs.iter().map(|p| root.join(p)).collect(),
            sources: self.sources.iter().map(|p| root.join(p)).collect(),
        }
    }
}
