//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler, also used as the link driver
    pub cc: PathBuf,
    /// Compiler family (gcc, clang, apple-clang)
    pub family: ToolchainPlatform,
    /// Arguments from the compiler command line, placed before generated ones
    pub leading_args: Vec<String>,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain {
            cc,
            family,
            leading_args: Vec::new(),
        }
    }

    /// Keep extra words of a compiler command such as `ccache gcc` or `gcc -m32`.
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.cc).args(self.leading_args.iter().cloned())
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = self.command();

        // Compile only, position independent for loading as a module
        cmd = cmd.arg("-c").arg("-fPIC");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_module_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = self.command();

        // macOS modules are bundles resolving interpreter symbols at load time
        if self.family == ToolchainPlatform::AppleClang {
            cmd = cmd.args(["-bundle", "-undefined", "dynamic_lookup"]);
        } else {
            cmd = cmd.arg("-shared");
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}
