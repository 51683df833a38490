//! Decisions taken once, before any module is compiled.
//!
//! Two questions are answered here for the whole catalog: should native
//! compilation be attempted at all, and does the host toolchain need its
//! flags sanitized first.

use crate::builder::outcome::SkipReason;
use crate::builder::toolchain::{FlagSet, ToolchainInfo};
use crate::core::platform::{PlatformId, RuntimeKind};

/// Legacy optimization flag that vendor-built runtimes on macOS inject into
/// their recorded compiler flags. Clang 3.4 and later reject it outright.
pub const LEGACY_FUSED_MADD_FLAG: &str = "-mno-fused-madd";

/// Flag changes to apply before compiling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolchainAdjustment {
    /// Use the flags as they are.
    #[default]
    None,
    /// Remove every occurrence of these flags.
    StripFlags(Vec<&'static str>),
}

impl ToolchainAdjustment {
    /// Apply the adjustment to a flag set, leaving other flags in order.
    pub fn apply(&self, mut flags: FlagSet) -> FlagSet {
        if let ToolchainAdjustment::StripFlags(strip) = self {
            flags.cflags.retain(|f| !strip.iter().any(|s| f == s));
            flags.ldflags.retain(|f| !strip.iter().any(|s| f == s));
        }
        flags
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ToolchainAdjustment::None)
    }
}

/// Inspect the host and compiler for known-bad flag combinations.
///
/// `toolchain` is `None` when compiler inspection failed; that case is
/// tolerated and leaves the flags alone.
pub fn platform_precheck(
    platform: PlatformId,
    toolchain: Option<&ToolchainInfo>,
) -> ToolchainAdjustment {
    let Some(info) = toolchain else {
        tracing::debug!("no toolchain information available, skipping flag precheck");
        return ToolchainAdjustment::None;
    };

    if platform == PlatformId::Darwin && info.family.is_clang() {
        tracing::debug!(
            "{} on {} rejects `{}`, removing it from compiler flags",
            info.family,
            platform,
            LEGACY_FUSED_MADD_FLAG
        );
        return ToolchainAdjustment::StripFlags(vec![LEGACY_FUSED_MADD_FLAG]);
    }

    ToolchainAdjustment::None
}

/// Whole-catalog decision about native compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildDecision {
    Attempt,
    Skip(SkipReason),
}

impl BuildDecision {
    pub fn is_attempt(&self) -> bool {
        matches!(self, BuildDecision::Attempt)
    }
}

/// Decide whether to compile, and why not.
///
/// An explicit opt-out wins over the runtime check so the reported reason
/// reflects the user's choice.
pub fn build_decision(runtime: &RuntimeKind, explicit_disable: bool) -> BuildDecision {
    if explicit_disable {
        BuildDecision::Skip(SkipReason::DisabledByUser)
    } else if !runtime.loads_native_modules() {
        BuildDecision::Skip(SkipReason::UnsupportedRuntime)
    } else {
        BuildDecision::Attempt
    }
}

/// Check whether native compilation should be attempted for this host.
///
/// Platform does not influence the answer today; it is accepted so callers
/// pass the same host facts everywhere.
pub fn should_attempt_build(
    _platform: PlatformId,
    runtime: &RuntimeKind,
    explicit_disable: bool,
) -> bool {
    build_decision(runtime, explicit_disable).is_attempt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::ToolchainPlatform;

    fn flags_with_legacy() -> FlagSet {
        FlagSet::new(
            vec![
                "-O3".to_string(),
                LEGACY_FUSED_MADD_FLAG.to_string(),
                "-Wall".to_string(),
                LEGACY_FUSED_MADD_FLAG.to_string(),
            ],
            vec![LEGACY_FUSED_MADD_FLAG.to_string(), "-lm".to_string()],
        )
    }

    fn info(family: ToolchainPlatform) -> ToolchainInfo {
        ToolchainInfo::new(family, "/usr/bin/cc")
    }

    #[test]
    fn test_darwin_clang_strips_legacy_flag() {
        for family in [ToolchainPlatform::Clang, ToolchainPlatform::AppleClang] {
            let adjustment = platform_precheck(PlatformId::Darwin, Some(&info(family)));
            let adjusted = adjustment.apply(flags_with_legacy());

            assert!(!adjusted.contains(LEGACY_FUSED_MADD_FLAG));
            assert_eq!(adjusted.cflags, vec!["-O3", "-Wall"]);
            assert_eq!(adjusted.ldflags, vec!["-lm"]);
        }
    }

    #[test]
    fn test_other_pairs_unchanged() {
        let cases = [
            (PlatformId::Darwin, ToolchainPlatform::Gcc),
            (PlatformId::Linux, ToolchainPlatform::Clang),
            (PlatformId::Linux, ToolchainPlatform::Gcc),
            (PlatformId::Windows, ToolchainPlatform::Msvc),
            (PlatformId::Other, ToolchainPlatform::Clang),
        ];

        for (platform, family) in cases {
            let adjustment = platform_precheck(platform, Some(&info(family)));
            assert!(adjustment.is_none(), "{platform}/{family} should not adjust");
            assert_eq!(adjustment.apply(flags_with_legacy()), flags_with_legacy());
        }
    }

    #[test]
    fn test_failed_inspection_is_noop() {
        let adjustment = platform_precheck(PlatformId::Darwin, None);
        assert_eq!(adjustment, ToolchainAdjustment::None);
        assert_eq!(adjustment.apply(flags_with_legacy()), flags_with_legacy());
    }

    #[test]
    fn test_strip_matches_whole_tokens_only() {
        let adjustment = ToolchainAdjustment::StripFlags(vec![LEGACY_FUSED_MADD_FLAG]);
        let flags = FlagSet::new(vec!["-mno-fused-madd-extra".to_string()], vec![]);
        assert_eq!(adjustment.apply(flags.clone()), flags);
    }

    #[test]
    fn test_build_decision() {
        assert_eq!(build_decision(&RuntimeKind::Reference, false), BuildDecision::Attempt);
        assert_eq!(
            build_decision(&RuntimeKind::Reference, true),
            BuildDecision::Skip(SkipReason::DisabledByUser)
        );
        assert_eq!(
            build_decision(&RuntimeKind::Alternative("pypy".into()), false),
            BuildDecision::Skip(SkipReason::UnsupportedRuntime)
        );
        assert_eq!(
            build_decision(&RuntimeKind::Alternative("pypy".into()), true),
            BuildDecision::Skip(SkipReason::DisabledByUser)
        );
    }

    #[test]
    fn test_should_attempt_build() {
        assert!(should_attempt_build(PlatformId::Linux, &RuntimeKind::Reference, false));
        assert!(!should_attempt_build(PlatformId::Linux, &RuntimeKind::Reference, true));
        assert!(!should_attempt_build(
            PlatformId::Windows,
            &RuntimeKind::Alternative("ironpython".into()),
            false
        ));
    }
}
