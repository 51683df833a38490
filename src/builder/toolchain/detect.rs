//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use super::{GccToolchain, Toolchain, ToolchainPlatform};
#[cfg(target_os = "windows")]
use super::{EnvWrapper, MsvcToolchain};

/// Detect the available toolchain.
///
/// Tries to find a C compiler with the following priority:
/// 1. The configured compiler (`[toolchain] cc`)
/// 2. The CC environment variable
/// 3. On Windows with MSVC: cl.exe and link.exe
/// 4. On Unix-like systems: cc/gcc/clang from PATH
pub fn detect_toolchain(configured_cc: Option<&Path>) -> Result<Box<dyn Toolchain>> {
    if let Some(cc) = configured_cc {
        if let Some(toolchain) = try_detect_from_config(cc)? {
            return Ok(toolchain);
        }
    }

    // On Windows, try MSVC first
    #[cfg(target_os = "windows")]
    {
        if let Some(toolchain) = try_detect_msvc()? {
            return Ok(toolchain);
        }
    }

    if let Some(toolchain) = try_detect_gcc()? {
        return Ok(toolchain);
    }

    bail!(
        "no C compiler found\n\
         \n\
         Native modules require a C compiler (gcc, clang, or cl).\n\
         Set the CC environment variable, set `cc` under [toolchain] in .slipway/config.toml,\n\
         or install a compiler."
    )
}

/// A compiler command line split into its program and leading arguments.
///
/// `CC` and `[toolchain] cc` may hold more than a path: `gcc -m32`,
/// `ccache clang`. A value naming an existing file is taken whole, so paths
/// containing spaces still work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Wrappers that run the compiler named by their first argument.
const LAUNCHERS: &[&str] = &["ccache", "sccache", "distcc"];

impl CompilerCommand {
    /// Split a compiler command on whitespace. Returns `None` for a blank value.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if Path::new(value).is_file() {
            return Some(CompilerCommand {
                program: PathBuf::from(value),
                args: Vec::new(),
            });
        }

        let mut words = value.split_whitespace();
        let program = PathBuf::from(words.next()?);
        Some(CompilerCommand {
            program,
            args: words.map(str::to_string).collect(),
        })
    }

    /// The actual compiler, looking through launchers like `ccache`.
    pub fn compiler(&self) -> &Path {
        let stem = self
            .program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if LAUNCHERS.contains(&stem) {
            if let Some(inner) = self.args.iter().find(|arg| !arg.starts_with('-')) {
                return Path::new(inner);
            }
        }
        &self.program
    }

    fn into_toolchain(self) -> Result<GccToolchain> {
        let family = detect_compiler_family(self.compiler())?;
        Ok(GccToolchain::new(self.program, family).with_leading_args(self.args))
    }
}

/// Try to create a toolchain from the configured compiler.
fn try_detect_from_config(cc: &Path) -> Result<Option<Box<dyn Toolchain>>> {
    let Some(mut command) = cc.to_str().and_then(CompilerCommand::parse) else {
        tracing::warn!("Configured C compiler is not usable: {}", cc.display());
        return Ok(None);
    };

    if !command.program.exists() {
        match which::which(&command.program) {
            Ok(found) => command.program = found,
            Err(_) => {
                tracing::warn!("Configured C compiler not found: {}", cc.display());
                return Ok(None);
            }
        }
    }

    tracing::info!("Using toolchain from config: cc={}", cc.display());

    Ok(Some(Box::new(command.into_toolchain()?)))
}

/// Try to detect MSVC toolchain.
#[cfg(target_os = "windows")]
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    use which::which;

    // Already inside a Developer Command Prompt
    if let Ok(cl) = which("cl") {
        if std::env::var("INCLUDE").is_ok() && std::env::var("LIB").is_ok() {
            let link = which("link")
                .map_err(|_| anyhow::anyhow!("MSVC cl.exe found but link.exe not in PATH"))?;
            return Ok(Some(Box::new(MsvcToolchain::new(cl, link))));
        }
    }

    try_auto_detect_msvc()
}

/// Try to auto-detect MSVC using vswhere.exe and vcvarsall.bat.
#[cfg(target_os = "windows")]
fn try_auto_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    use std::collections::HashMap;

    use crate::util::process::ProcessBuilder;

    let Some(vswhere) = find_vswhere() else {
        tracing::debug!("vswhere.exe not found, cannot auto-detect MSVC");
        return Ok(None);
    };

    let output = ProcessBuilder::new(&vswhere)
        .args([
            "-latest",
            "-requires",
            "Microsoft.VisualStudio.Component.VC.Tools.x86.x64",
            "-property",
            "installationPath",
            "-format",
            "value",
        ])
        .exec_and_check();

    let vs_path = match output {
        Ok(out) => {
            let path = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if path.is_empty() {
                tracing::debug!("vswhere returned empty path");
                return Ok(None);
            }
            PathBuf::from(path)
        }
        Err(e) => {
            tracing::debug!("Failed to run vswhere: {:#}", e);
            return Ok(None);
        }
    };

    let vcvarsall = vs_path
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat");
    if !vcvarsall.exists() {
        tracing::debug!("vcvarsall.bat not found at: {}", vcvarsall.display());
        return Ok(None);
    }

    let arch = match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        "aarch64" => "arm64",
        other => {
            tracing::debug!("Unsupported architecture for MSVC auto-detection: {}", other);
            return Ok(None);
        }
    };

    // A temporary batch file avoids cmd.exe quoting issues
    let temp_batch = std::env::temp_dir().join("slipway_vcvars.bat");
    let batch_content = format!(
        "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
        vcvarsall.display(),
        arch
    );

    if let Err(e) = std::fs::write(&temp_batch, &batch_content) {
        tracing::debug!("Failed to write temp batch file: {}", e);
        return Ok(None);
    }

    let output = ProcessBuilder::new("cmd")
        .arg("/c")
        .arg(&temp_batch)
        .exec_and_check();

    let _ = std::fs::remove_file(&temp_batch);

    let env_output = match output {
        Ok(out) => String::from_utf8_lossy(&out.stdout).to_string(),
        Err(e) => {
            tracing::warn!("vcvarsall.bat failed: {:#}", e);
            return Ok(None);
        }
    };

    let env_vars: HashMap<String, String> = env_output
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_uppercase(), value.to_string()))
        .collect();

    let path_value = env_vars.get("PATH").cloned().unwrap_or_default();
    let cl = find_in_path_list(&path_value, "cl.exe");
    let link = find_in_path_list(&path_value, "link.exe");
    let (Some(cl), Some(link)) = (cl, link) else {
        tracing::debug!("Could not find MSVC tools in captured PATH");
        return Ok(None);
    };

    tracing::info!("Auto-detected MSVC: cl={}", cl.display());

    let captured_env: Vec<(String, String)> = ["PATH", "INCLUDE", "LIB", "LIBPATH"]
        .iter()
        .filter_map(|&key| env_vars.get(key).map(|v| (key.to_string(), v.clone())))
        .collect();

    Ok(Some(Box::new(EnvWrapper::new(
        MsvcToolchain::new(cl, link),
        captured_env,
    ))))
}

/// Find vswhere.exe in standard locations.
#[cfg(target_os = "windows")]
fn find_vswhere() -> Option<PathBuf> {
    let program_files_x86 = std::env::var("ProgramFiles(x86)")
        .unwrap_or_else(|_| "C:\\Program Files (x86)".to_string());

    let standard_path = PathBuf::from(&program_files_x86)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe");

    if standard_path.exists() {
        return Some(standard_path);
    }

    which::which("vswhere").ok()
}

#[cfg(target_os = "windows")]
fn find_in_path_list(path: &str, tool: &str) -> Option<PathBuf> {
    path.split(';')
        .map(|dir| PathBuf::from(dir).join(tool))
        .find(|candidate| candidate.exists())
}

/// Try to detect GCC/Clang toolchain.
fn try_detect_gcc() -> Result<Option<Box<dyn Toolchain>>> {
    use which::which;

    if let Some(command) = std::env::var("CC")
        .ok()
        .as_deref()
        .and_then(CompilerCommand::parse)
    {
        return Ok(Some(Box::new(command.into_toolchain()?)));
    }

    let cc = match which("cc")
        .or_else(|_| which("gcc"))
        .or_else(|_| which("clang"))
    {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };

    let family = detect_compiler_family(&cc)?;

    Ok(Some(Box::new(GccToolchain::new(cc, family))))
}

/// Detect whether the compiler is GCC, Clang, or Apple Clang.
pub fn detect_compiler_family(cc: &Path) -> Result<ToolchainPlatform> {
    let name = cc
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("clang") {
        return Ok(detect_clang_variant(cc));
    } else if name.contains("gcc") || name.contains("g++") {
        return Ok(ToolchainPlatform::Gcc);
    } else if name == "cl" || name == "cl.exe" {
        return Ok(ToolchainPlatform::Msvc);
    }

    // Generic `cc` is often clang in disguise
    if let Some(banner) = version_banner(cc) {
        if banner.contains("clang") {
            return Ok(family_from_banner(&banner));
        } else if banner.contains("gcc") || banner.contains("free software foundation") {
            return Ok(ToolchainPlatform::Gcc);
        }
    }

    Ok(ToolchainPlatform::Gcc)
}

/// Detect if Clang is Apple Clang or regular Clang.
fn detect_clang_variant(cc: &Path) -> ToolchainPlatform {
    version_banner(cc)
        .map(|banner| family_from_banner(&banner))
        .unwrap_or(ToolchainPlatform::Clang)
}

fn family_from_banner(banner: &str) -> ToolchainPlatform {
    if banner.contains("apple") {
        ToolchainPlatform::AppleClang
    } else {
        ToolchainPlatform::Clang
    }
}

/// Lowercased `--version` output, if the compiler runs.
fn version_banner(cc: &Path) -> Option<String> {
    let output = std::process::Command::new(cc).arg("--version").output().ok()?;
    Some(String::from_utf8_lossy(&output.stdout).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::CompileInput;

    #[test]
    fn test_family_from_name() {
        assert_eq!(
            detect_compiler_family(Path::new("/opt/cross/x86_64-linux-gnu-gcc")).unwrap(),
            ToolchainPlatform::Gcc
        );
        assert_eq!(
            detect_compiler_family(Path::new("cl.exe")).unwrap(),
            ToolchainPlatform::Msvc
        );
    }

    #[test]
    fn test_unrunnable_clang_defaults_to_plain_clang() {
        assert_eq!(
            detect_compiler_family(Path::new("/nonexistent/bin/clang-17")).unwrap(),
            ToolchainPlatform::Clang
        );
    }

    #[test]
    fn test_family_from_banner() {
        assert_eq!(
            family_from_banner("apple clang version 15.0.0 (clang-1500.0.40.1)"),
            ToolchainPlatform::AppleClang
        );
        assert_eq!(
            family_from_banner("ubuntu clang version 14.0.0-1ubuntu1"),
            ToolchainPlatform::Clang
        );
    }

    #[test]
    fn test_compiler_command_splits_words() {
        let command = CompilerCommand::parse("gcc -O0").unwrap();
        assert_eq!(command.program, PathBuf::from("gcc"));
        assert_eq!(command.args, vec!["-O0"]);
        assert_eq!(command.compiler(), Path::new("gcc"));

        let command = CompilerCommand::parse("ccache clang -m32").unwrap();
        assert_eq!(command.program, PathBuf::from("ccache"));
        assert_eq!(command.compiler(), Path::new("clang"));

        assert!(CompilerCommand::parse("   ").is_none());
    }

    #[test]
    fn test_compiler_command_keeps_existing_path_whole() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cc = tmp.path().join("my tools").join("cc");
        std::fs::create_dir_all(cc.parent().unwrap()).unwrap();
        std::fs::write(&cc, "").unwrap();

        let command = CompilerCommand::parse(cc.to_str().unwrap()).unwrap();
        assert_eq!(command.program, cc);
        assert!(command.args.is_empty());
    }

    #[test]
    fn test_configured_compiler_with_arguments() {
        let toolchain = try_detect_from_config(Path::new("cc -O0")).unwrap();
        // Hosts without `cc` on PATH have nothing to check
        let Some(toolchain) = toolchain else { return };

        assert!(toolchain.compiler_path().is_absolute());
        let cmd = toolchain.compile_command(&CompileInput {
            source: PathBuf::from("a.c"),
            output: PathBuf::from("a.o"),
            include_dirs: vec![],
            cflags: vec![],
        });
        assert_eq!(cmd.args[0], "-O0");
        assert_eq!(cmd.args[1], "-c");
    }

    #[test]
    fn test_missing_configured_compiler_is_not_fatal() {
        let result = try_detect_from_config(Path::new("/nonexistent/slipway-cc")).unwrap();
        assert!(result.is_none());
    }
}
