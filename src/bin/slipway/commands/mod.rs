//! Command implementations

pub mod build;
pub mod completions;
pub mod extras;
pub mod toolchain;
