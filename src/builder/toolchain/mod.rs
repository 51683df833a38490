//! Toolchain abstraction for compiling native modules.
//!
//! A toolchain knows how to turn one C source into an object file and a set
//! of objects into a loadable shared module. It only generates commands;
//! running them is the compiler backend's job (see [`crate::builder::native`]).
//!
//! Toolchain detection priority:
//! 1. Toolchain config (`[toolchain] cc` in `.slipway/config.toml`)
//! 2. Environment variables (CC, split into program and leading arguments)
//! 3. Auto-detection (searching PATH for common compilers)

use std::fmt;
use std::path::{Path, PathBuf};

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_compiler_family, detect_toolchain, CompilerCommand};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// Input for linking a loadable module.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link
    pub objects: Vec<PathBuf>,
    /// Output module file
    pub output: PathBuf,
    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Compiler and linker flags applied to every module in a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub cflags: Vec<String>,
    pub ldflags: Vec<String>,
}

impl FlagSet {
    pub fn new(cflags: Vec<String>, ldflags: Vec<String>) -> Self {
        FlagSet { cflags, ldflags }
    }

    /// Split whitespace-separated flag strings, as found in `CFLAGS`/`LDFLAGS`.
    pub fn from_strings(cflags: &str, ldflags: &str) -> Self {
        FlagSet {
            cflags: cflags.split_whitespace().map(str::to_string).collect(),
            ldflags: ldflags.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Read `CFLAGS` and `LDFLAGS` from the environment.
    pub fn from_env() -> Self {
        let cflags = std::env::var("CFLAGS").unwrap_or_default();
        let ldflags = std::env::var("LDFLAGS").unwrap_or_default();
        FlagSet::from_strings(&cflags, &ldflags)
    }

    /// Check whether a flag appears in either list.
    pub fn contains(&self, flag: &str) -> bool {
        self.cflags.iter().chain(&self.ldflags).any(|f| f == flag)
    }
}

/// The platform/family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::AppleClang => "apple-clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }

    /// Check if this is any clang-based compiler.
    pub fn is_clang(&self) -> bool {
        matches!(self, ToolchainPlatform::Clang | ToolchainPlatform::AppleClang)
    }
}

impl fmt::Display for ToolchainPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the active compiler, as seen by the precheck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainInfo {
    pub family: ToolchainPlatform,
    pub compiler: PathBuf,
}

impl ToolchainInfo {
    pub fn new(family: ToolchainPlatform, compiler: impl Into<PathBuf>) -> Self {
        ToolchainInfo {
            family,
            compiler: compiler.into(),
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a compile command.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate a link command producing a loadable module.
    fn link_module_command(&self, input: &LinkInput) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;

    /// Identity used by the platform precheck.
    fn info(&self) -> ToolchainInfo {
        ToolchainInfo::new(self.platform(), self.compiler_path())
    }
}

/// A generic wrapper that injects environment variables into all commands.
///
/// Used for MSVC, whose tools only work with the environment captured from
/// `vcvarsall.bat`.
#[derive(Debug, Clone)]
pub struct EnvWrapper<T> {
    inner: T,
    env_vars: Vec<(String, String)>,
}

impl<T> EnvWrapper<T> {
    /// Create a new environment wrapper.
    pub fn new(inner: T, env_vars: Vec<(String, String)>) -> Self {
        EnvWrapper { inner, env_vars }
    }

    fn inject_env(&self, mut cmd: CommandSpec) -> CommandSpec {
        for (key, value) in &self.env_vars {
            cmd = cmd.env(key, value);
        }
        cmd
    }
}

impl<T: Toolchain> Toolchain for EnvWrapper<T> {
    fn platform(&self) -> ToolchainPlatform {
        self.inner.platform()
    }

    fn compiler_path(&self) -> &Path {
        self.inner.compiler_path()
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        self.inject_env(self.inner.compile_command(input))
    }

    fn link_module_command(&self, input: &LinkInput) -> CommandSpec {
        self.inject_env(self.inner.link_module_command(input))
    }

    fn object_extension(&self) -> &str {
        self.inner.object_extension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_set_from_strings() {
        let flags = FlagSet::from_strings("-O2  -Wall\t-mno-fused-madd", "-L/opt/lib");
        assert_eq!(flags.cflags, vec!["-O2", "-Wall", "-mno-fused-madd"]);
        assert_eq!(flags.ldflags, vec!["-L/opt/lib"]);
        assert!(flags.contains("-Wall"));
        assert!(!flags.contains("-O3"));
    }

    #[test]
    fn test_env_wrapper_injects_env() {
        let gcc = GccToolchain::new(PathBuf::from("cc"), ToolchainPlatform::Gcc);
        let wrapped = EnvWrapper::new(gcc, vec![("LIB".to_string(), "C:/lib".to_string())]);

        let cmd = wrapped.compile_command(&CompileInput {
            source: PathBuf::from("a.c"),
            output: PathBuf::from("a.o"),
            include_dirs: vec![],
            cflags: vec![],
        });
        assert_eq!(cmd.env, vec![("LIB".to_string(), "C:/lib".to_string())]);
        assert_eq!(wrapped.info().family, ToolchainPlatform::Gcc);
    }
}
