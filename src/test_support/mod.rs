//! Test utilities and mocks for Slipway unit tests.
//!
//! [`MockCompiler`] stands in for the native toolchain so the orchestrator
//! can be exercised without a C compiler on the machine.
//!
//! # Example
//!
//! ```rust,ignore
//! use slipway::test_support::{MockCompiler, MockBehavior};
//!
//! let compiler = MockCompiler::new().script("codec._speedups", MockBehavior::fail("no cc"));
//! // Hand `&compiler` to an ExtensionBuilder...
//! assert_eq!(compiler.calls(), vec!["codec._speedups".to_string()]);
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::native::{CompileRequest, ModuleCompiler};

pub use fixtures::*;

/// What the mock does when asked to compile a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Report the conventional artifact path without touching disk.
    Succeed,
    /// Return an error with this message.
    Fail(String),
    /// Panic with this message.
    Panic(String),
}

impl MockBehavior {
    pub fn fail(message: impl Into<String>) -> Self {
        MockBehavior::Fail(message.into())
    }

    pub fn panic(message: impl Into<String>) -> Self {
        MockBehavior::Panic(message.into())
    }
}

/// Scripted compiler that records every module it was asked to build.
#[derive(Debug, Default)]
pub struct MockCompiler {
    behaviors: HashMap<String, MockBehavior>,
    calls: Mutex<Vec<String>>,
    flags_seen: Mutex<Vec<Vec<String>>>,
}

impl MockCompiler {
    /// Create a mock that succeeds for every module.
    pub fn new() -> Self {
        MockCompiler::default()
    }

    /// Script the behavior for one module name.
    pub fn script(mut self, module: &str, behavior: MockBehavior) -> Self {
        self.behaviors.insert(module.to_string(), behavior);
        self
    }

    /// Names of modules compiled so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of compile invocations.
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// The cflags passed with each call.
    pub fn cflags_seen(&self) -> Vec<Vec<String>> {
        self.flags_seen.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl ModuleCompiler for MockCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<PathBuf> {
        let name = request.spec.name().to_string();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.clone());
        }
        if let Ok(mut flags) = self.flags_seen.lock() {
            flags.push(request.flags.cflags.clone());
        }

        match self.behaviors.get(&name).unwrap_or(&MockBehavior::Succeed) {
            MockBehavior::Succeed => Ok(request.artifact_path()),
            MockBehavior::Fail(message) => bail!("{}", message),
            MockBehavior::Panic(message) => panic!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::FlagSet;
    use crate::core::module_spec::NativeModuleSpec;
    use std::path::Path;

    #[test]
    fn test_mock_compiler_records_calls() {
        let compiler = MockCompiler::new().script("b", MockBehavior::fail("compiler exited 1"));
        let flags = FlagSet::from_strings("-O2", "");
        let a = NativeModuleSpec::new("a", Vec::<PathBuf>::new(), ["a.c"]);
        let b = NativeModuleSpec::new("b", Vec::<PathBuf>::new(), ["b.c"]);

        let request_a = CompileRequest {
            spec: &a,
            flags: &flags,
            out_dir: Path::new("out"),
            module_extension: "so",
        };
        let request_b = CompileRequest { spec: &b, ..request_a };

        assert_eq!(compiler.compile(&request_a).unwrap(), PathBuf::from("out/a.so"));
        assert!(compiler.compile(&request_b).is_err());
        assert_eq!(compiler.calls(), vec!["a", "b"]);
        assert_eq!(compiler.cflags_seen()[0], vec!["-O2"]);
    }
}
