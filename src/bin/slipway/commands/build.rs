//! `slipway build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use slipway::builder::BuildStatus;
use slipway::core::{PlatformId, RuntimeKind};
use slipway::ops::slipway_build::{build, BuildOptions};
use slipway::util::GlobalContext;

pub fn execute(args: BuildArgs, ctx: &GlobalContext) -> Result<()> {
    let opts = BuildOptions {
        manifest_path: args.manifest_path,
        no_ext: args.no_ext,
        features: args.features,
        platform: args.platform.as_deref().map(PlatformId::parse),
        runtime: args.runtime.as_deref().map(RuntimeKind::parse),
        out_dir: args.out_dir,
        progress: !ctx.is_verbose(),
    };

    let result = build(ctx, &opts)?;

    for outcome in &result.outcomes {
        let name = outcome.module().name();
        match outcome.status() {
            BuildStatus::Built { artifact } => {
                eprintln!("       Built `{}` -> {}", name, artifact.display());
            }
            BuildStatus::Skipped(reason) => {
                eprintln!("     Skipped `{}` ({})", name, reason.describe());
            }
            BuildStatus::Failed => {
                eprintln!("      Failed `{}` (pure fallback will be used)", name);
            }
        }
    }

    let summary = &result.summary;
    eprintln!(
        "    Finished {} built, {} skipped, {} failed in {:.2}s",
        summary.built,
        summary.skipped,
        summary.failed,
        summary.duration.as_secs_f64()
    );
    eprintln!("      Report {}", result.report_path.display());

    Ok(())
}
