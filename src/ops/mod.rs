//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod slipway_build;
pub mod toolchain_info;

pub use slipway_build::{build, BuildOptions, BuildReport, BuildResult, REPORT_NAME};
pub use toolchain_info::{format_report, inspect, ToolchainReport};
