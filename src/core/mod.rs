//! Core data structures for Slipway.
//!
//! This module contains the foundational types used throughout Slipway:
//! - Host facts (platform and runtime)
//! - Native module specs and the manifest that declares them
//! - Optional feature groups and their requirements

pub mod feature;
pub mod manifest;
pub mod module_spec;
pub mod platform;

pub use feature::{FeatureGroup, FeatureMatrix, Requirement};
pub use manifest::{find_manifest, Manifest, ManifestError, PackageInfo, MANIFEST_NAME};
pub use module_spec::NativeModuleSpec;
pub use platform::{HostPlatform, PlatformId, RuntimeKind};
