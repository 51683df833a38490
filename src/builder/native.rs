//! Native compiler backend.
//!
//! Turns one [`NativeModuleSpec`] into a loadable module: every source is
//! compiled to an object under `<out>/obj/<module>/`, then the objects are
//! linked into `<out>/<dotted/name>.<ext>`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::toolchain::{CompileInput, FlagSet, LinkInput, Toolchain};
use crate::core::module_spec::NativeModuleSpec;
use crate::util::process::ProcessBuilder;

/// Everything a compiler needs to build one module.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub spec: &'a NativeModuleSpec,
    /// Flags after the platform precheck adjustment
    pub flags: &'a FlagSet,
    pub out_dir: &'a Path,
    /// Extension of loadable modules on the target platform
    pub module_extension: &'a str,
}

impl CompileRequest<'_> {
    /// Where the finished module is written.
    pub fn artifact_path(&self) -> PathBuf {
        self.out_dir
            .join(self.spec.artifact_path(self.module_extension))
    }

    /// Scratch directory for this module's objects.
    pub fn object_dir(&self) -> PathBuf {
        self.out_dir.join("obj").join(self.spec.name())
    }
}

/// The native toolchain as seen by the orchestrator.
///
/// Implementations may fail in any way; the orchestrator turns every error
/// into a failed outcome.
pub trait ModuleCompiler {
    /// Compile and link one module, returning the artifact path.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<PathBuf>;
}

/// Compiler backed by a detected [`Toolchain`].
pub struct NativeCompiler {
    toolchain: Box<dyn Toolchain>,
    /// Include dirs appended after each module's own (e.g. runtime headers)
    extra_include_dirs: Vec<PathBuf>,
}

impl NativeCompiler {
    pub fn new(toolchain: Box<dyn Toolchain>, extra_include_dirs: Vec<PathBuf>) -> Self {
        NativeCompiler {
            toolchain,
            extra_include_dirs,
        }
    }

    fn object_path(&self, obj_dir: &Path, index: usize, source: &Path) -> PathBuf {
        // Index prefix keeps `a/buffer.c` and `b/buffer.c` apart
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        obj_dir.join(format!(
            "{index}-{stem}.{}",
            self.toolchain.object_extension()
        ))
    }
}

impl ModuleCompiler for NativeCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<PathBuf> {
        let spec = request.spec;
        let obj_dir = request.object_dir();
        std::fs::create_dir_all(&obj_dir)
            .with_context(|| format!("failed to create object directory: {}", obj_dir.display()))?;

        let include_dirs: Vec<PathBuf> = spec
            .include_dirs()
            .iter()
            .chain(&self.extra_include_dirs)
            .cloned()
            .collect();

        let mut objects = Vec::with_capacity(spec.sources().len());
        for (index, source) in spec.sources().iter().enumerate() {
            let output = self.object_path(&obj_dir, index, source);
            let cmd = self.toolchain.compile_command(&CompileInput {
                source: source.clone(),
                output: output.clone(),
                include_dirs: include_dirs.clone(),
                cflags: request.flags.cflags.clone(),
            });

            tracing::debug!("compiling {}", source.display());
            ProcessBuilder::from(&cmd)
                .exec_and_check()
                .with_context(|| format!("failed to compile `{}`", source.display()))?;

            objects.push(output);
        }

        let artifact = request.artifact_path();
        if let Some(parent) = artifact.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        let cmd = self.toolchain.link_module_command(&LinkInput {
            objects,
            output: artifact.clone(),
            ldflags: request.flags.ldflags.clone(),
        });

        tracing::debug!("linking {}", artifact.display());
        ProcessBuilder::from(&cmd)
            .exec_and_check()
            .with_context(|| format!("failed to link `{}`", spec.name()))?;

        if !artifact.exists() {
            bail!(
                "linker reported success but `{}` was not produced",
                artifact.display()
            );
        }

        Ok(artifact)
    }
}
