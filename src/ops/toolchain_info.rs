//! Host and toolchain inspection for `slipway toolchain`.
//!
//! Runs the same detection the build uses, without compiling anything,
//! so users can see which compiler would be picked and whether its flags
//! would be adjusted.

use std::fmt::Write;

use crate::builder::precheck::{build_decision, platform_precheck, BuildDecision};
use crate::builder::toolchain::{detect_toolchain, FlagSet, ToolchainInfo};
use crate::builder::ToolchainAdjustment;
use crate::core::platform::{HostPlatform, PlatformId, RuntimeKind};
use crate::util::Config;

/// What the build would see on this host.
#[derive(Debug, Clone)]
pub struct ToolchainReport {
    pub platform: PlatformId,
    pub runtime: RuntimeKind,
    pub decision: BuildDecision,
    /// Detected compiler, or why detection failed
    pub compiler: Result<ToolchainInfo, String>,
    pub adjustment: ToolchainAdjustment,
    /// Flags after the adjustment
    pub flags: FlagSet,
}

/// Inspect the host using merged configuration.
pub fn inspect(config: &Config, platform: Option<PlatformId>) -> ToolchainReport {
    let HostPlatform { platform, runtime } =
        HostPlatform::detect().with_overrides(platform, config.runtime_kind());
    let decision = build_decision(&runtime, config.no_ext());

    let compiler = detect_toolchain(config.toolchain.cc.as_deref())
        .map(|toolchain| toolchain.info())
        .map_err(|e| format!("{:#}", e));
    let adjustment = platform_precheck(platform, compiler.as_ref().ok());
    let flags = adjustment.apply(config.flags());

    ToolchainReport {
        platform,
        runtime,
        decision,
        compiler,
        adjustment,
        flags,
    }
}

/// Render a report for the terminal.
pub fn format_report(report: &ToolchainReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Platform:   {}", report.platform);
    let _ = writeln!(output, "Runtime:    {}", report.runtime);
    let _ = match report.decision {
        BuildDecision::Attempt => writeln!(output, "Extensions: enabled"),
        BuildDecision::Skip(reason) => writeln!(output, "Extensions: skipped ({})", reason.describe()),
    };

    match &report.compiler {
        Ok(info) => {
            let _ = writeln!(
                output,
                "Compiler:   {} ({})",
                info.compiler.display(),
                info.family
            );
        }
        Err(cause) => {
            let first_line = cause.lines().next().unwrap_or("unavailable");
            let _ = writeln!(output, "Compiler:   not found ({})", first_line);
        }
    }

    match &report.adjustment {
        ToolchainAdjustment::None => {
            let _ = writeln!(output, "Flags:      unchanged");
        }
        ToolchainAdjustment::StripFlags(flags) => {
            let _ = writeln!(output, "Flags:      removing {}", flags.join(" "));
        }
    }

    if !report.flags.cflags.is_empty() {
        let _ = writeln!(output, "CFLAGS:     {}", report.flags.cflags.join(" "));
    }
    if !report.flags.ldflags.is_empty() {
        let _ = writeln!(output, "LDFLAGS:    {}", report.flags.ldflags.join(" "));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::ToolchainPlatform;
    use crate::builder::SkipReason;

    fn report(adjustment: ToolchainAdjustment) -> ToolchainReport {
        ToolchainReport {
            platform: PlatformId::Darwin,
            runtime: RuntimeKind::Reference,
            decision: BuildDecision::Attempt,
            compiler: Ok(ToolchainInfo::new(ToolchainPlatform::AppleClang, "/usr/bin/cc")),
            adjustment,
            flags: FlagSet::from_strings("-O2", ""),
        }
    }

    #[test]
    fn test_format_report() {
        let text = format_report(&report(ToolchainAdjustment::StripFlags(vec![
            "-mno-fused-madd",
        ])));

        assert!(text.contains("Platform:   darwin"));
        assert!(text.contains("Extensions: enabled"));
        assert!(text.contains("/usr/bin/cc (apple-clang)"));
        assert!(text.contains("Flags:      removing -mno-fused-madd"));
        assert!(text.contains("CFLAGS:     -O2"));
        assert!(!text.contains("LDFLAGS"));
    }

    #[test]
    fn test_format_report_without_compiler() {
        let mut r = report(ToolchainAdjustment::None);
        r.compiler = Err("no C compiler found\n\nmore detail".to_string());
        r.decision = BuildDecision::Skip(SkipReason::DisabledByUser);

        let text = format_report(&r);
        assert!(text.contains("Compiler:   not found (no C compiler found)"));
        assert!(text.contains("Extensions: skipped (native extensions were disabled"));
        assert!(text.contains("Flags:      unchanged"));
    }

    #[test]
    fn test_inspect_respects_config() {
        let mut config = Config::default();
        config.build.no_ext = Some(true);
        config.toolchain.cc = Some("/nonexistent/slipway-cc".into());
        config.toolchain.cflags = vec!["-O1".to_string()];

        let r = inspect(&config, Some(PlatformId::Linux));
        assert_eq!(r.platform, PlatformId::Linux);
        assert_eq!(r.decision, BuildDecision::Skip(SkipReason::DisabledByUser));
        assert!(r.adjustment.is_none());
        assert_eq!(r.flags.cflags, vec!["-O1"]);
    }
}
