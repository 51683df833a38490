//! `slipway toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use slipway::core::PlatformId;
use slipway::ops::toolchain_info::{format_report, inspect};
use slipway::util::GlobalContext;

pub fn execute(args: ToolchainArgs, ctx: &GlobalContext) -> Result<()> {
    // Project config applies when run inside a package
    let root = ctx
        .find_manifest()
        .ok()
        .and_then(|path| path.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| ctx.cwd().to_path_buf());
    let config = ctx.load_config(&root);

    let report = inspect(&config, args.platform.as_deref().map(PlatformId::parse));
    print!("{}", format_report(&report));

    Ok(())
}
