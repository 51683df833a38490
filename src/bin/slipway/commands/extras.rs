//! `slipway extras` command

use anyhow::{Context, Result};

use crate::cli::{ExtrasArgs, OutputFormat};
use slipway::core::{FeatureMatrix, PlatformId};
use slipway::resolver;

pub fn execute(args: ExtrasArgs) -> Result<()> {
    let platform = args
        .platform
        .as_deref()
        .map(PlatformId::parse)
        .unwrap_or_else(PlatformId::host);
    let matrix = resolver::resolve(platform);

    match args.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&matrix).context("failed to serialize features")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", format_matrix(platform, &matrix)),
    }

    Ok(())
}

fn format_matrix(platform: PlatformId, matrix: &FeatureMatrix) -> String {
    let width = matrix.keys().map(str::len).max().unwrap_or(0);
    let mut output = format!("Features for {}:\n", platform);
    for (key, requirements) in matrix.iter() {
        let reqs: Vec<String> = requirements.iter().map(|r| r.to_string()).collect();
        output.push_str(&format!("  {:width$}  {}\n", key, reqs.join(", "), width = width));
    }
    output
}
