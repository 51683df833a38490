//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainPlatform};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: PathBuf, link: PathBuf) -> Self {
        MsvcToolchain { cl, link }
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl);

        // Quiet logo, compile only, dynamic CRT to match the host runtime
        cmd = cmd.args(["/nologo", "/c", "/MD"]);

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("/I{}", dir.display()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg(format!("/Fo{}", input.output.display()));

        cmd
    }

    fn link_module_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.link);

        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/DLL");
        cmd = cmd.arg(format!("/OUT:{}", input.output.display()));

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "obj"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msvc() -> MsvcToolchain {
        MsvcToolchain::new(PathBuf::from("cl"), PathBuf::from("link"))
    }

    #[test]
    fn test_msvc_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("codec/_speedups.c"),
            output: PathBuf::from("obj/_speedups.obj"),
            include_dirs: vec![PathBuf::from("C:/include")],
            cflags: vec!["/W3".to_string()],
        };

        let cmd = msvc().compile_command(&input);
        assert_eq!(cmd.program, PathBuf::from("cl"));
        assert!(cmd.args.contains(&"/nologo".to_string()));
        assert!(cmd.args.contains(&"/c".to_string()));
        assert!(cmd.args.contains(&"/IC:/include".to_string()));
        assert!(cmd.args.contains(&"/W3".to_string()));
        assert!(cmd.args.contains(&"/Foobj/_speedups.obj".to_string()));
    }

    #[test]
    fn test_msvc_link_module_command() {
        let input = LinkInput {
            objects: vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")],
            output: PathBuf::from("codec/_speedups.pyd"),
            ldflags: vec![],
        };

        let cmd = msvc().link_module_command(&input);
        assert_eq!(cmd.program, PathBuf::from("link"));
        assert!(cmd.args.contains(&"/DLL".to_string()));
        assert!(cmd.args.contains(&"/OUT:codec/_speedups.pyd".to_string()));
        assert_eq!(msvc().object_extension(), "obj");
    }
}
