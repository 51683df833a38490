//! Native extension build system.
//!
//! This module drives the C toolchain over the extension catalog and
//! records one outcome per module.

pub mod native;
pub mod orchestrator;
pub mod outcome;
pub mod precheck;
pub mod toolchain;

pub use native::{CompileRequest, ModuleCompiler, NativeCompiler};
pub use orchestrator::{BuildSettings, CompilerState, ExtensionBuilder};
pub use outcome::{BuildOutcome, BuildStatus, BuildSummary, SkipReason};
pub use precheck::{
    build_decision, platform_precheck, should_attempt_build, BuildDecision, ToolchainAdjustment,
};
pub use toolchain::{
    detect_toolchain, CommandSpec, FlagSet, GccToolchain, MsvcToolchain, Toolchain,
    ToolchainInfo, ToolchainPlatform,
};
