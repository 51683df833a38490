//! Slipway CLI - best-effort native extension builds

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic as _;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use slipway::core::ManifestError;
use slipway::resolver::FeatureSelectionError;
use slipway::util::diagnostic::suggestions;
use slipway::util::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(help) = help_for(&e) {
            eprintln!("help: {}", help);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::Extras(args) => commands::extras::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Follow-up advice for errors the user can fix directly.
fn help_for(e: &anyhow::Error) -> Option<String> {
    if let Some(err) = e.downcast_ref::<FeatureSelectionError>() {
        return err
            .help()
            .map(|h| format!("{}\nhelp: {}", h, suggestions::LIST_EXTRAS));
    }
    if let Some(ManifestError::NotFound { .. }) = e.downcast_ref::<ManifestError>() {
        return Some(suggestions::NO_MANIFEST.to_string());
    }
    None
}
