//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Slipway - best-effort native extension builds for packages with a pure fallback
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the package's native extension modules
    Build(BuildArgs),

    /// List optional features and the packages they require
    Extras(ExtrasArgs),

    /// Show the detected compiler and host facts
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Skip native extension modules
    #[arg(long)]
    pub no_ext: bool,

    /// Optional features to include (comma-separated or repeated)
    #[arg(short = 'F', long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Target platform (linux, windows, darwin, ...), defaults to the host
    #[arg(long)]
    pub platform: Option<String>,

    /// Target runtime implementation (reference, pypy, ...)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Directory for built modules and the build report
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Path to Slipway.toml
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtrasArgs {
    /// Platform to resolve for, defaults to the host
    #[arg(long)]
    pub platform: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Platform to check the flag precheck against, defaults to the host
    #[arg(long)]
    pub platform: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
