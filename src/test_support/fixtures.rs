//! Project fixtures written to temporary directories.

use std::path::{Path, PathBuf};

/// A package with a manifest and some C sources.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Package name.
    pub name: String,
    /// Slipway.toml content.
    pub manifest: String,
    /// Source files (path relative to project root -> content).
    pub sources: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    /// A package with one extension module that compiles cleanly.
    pub fn with_speedups(name: impl Into<String>) -> Self {
        let name = name.into();
        let manifest = format!(
            r#"[package]
name = "{name}"
version = "0.1.0"

[[extension]]
name = "{name}._speedups"
include-dirs = ["{name}"]
sources = ["{name}/_speedups.c"]
"#
        );

        ProjectFixture {
            manifest,
            sources: vec![(
                PathBuf::from(&name).join("_speedups.c"),
                "int slipway_fixture_add(int a, int b) { return a + b; }\n".to_string(),
            )],
            name,
        }
    }

    /// Write this fixture under `base_path/<name>`.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let project_path = base_path.join(&self.name);
        std::fs::create_dir_all(&project_path)?;
        std::fs::write(project_path.join("Slipway.toml"), &self.manifest)?;

        for (rel_path, content) in &self.sources {
            let full_path = project_path.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(project_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_write() {
        let tmp = TempDir::new().unwrap();
        let root = ProjectFixture::with_speedups("codec")
            .write_to(tmp.path())
            .unwrap();

        assert!(root.join("Slipway.toml").exists());
        assert!(root.join("codec/_speedups.c").exists());
        let manifest = std::fs::read_to_string(root.join("Slipway.toml")).unwrap();
        assert!(manifest.contains("name = \"codec._speedups\""));
    }
}
