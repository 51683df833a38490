//! Slipway - best-effort native extension builds for packages with a pure fallback
//!
//! This crate provides the core library functionality for Slipway:
//! compiling optional C acceleration modules without ever failing the
//! install, and resolving the platform-specific optional feature matrix.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for Slipway unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted compiler and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    feature::FeatureMatrix,
    manifest::Manifest,
    module_spec::NativeModuleSpec,
    platform::{HostPlatform, PlatformId, RuntimeKind},
};

pub use builder::{BuildOutcome, BuildStatus, ExtensionBuilder};
pub use util::context::GlobalContext;
