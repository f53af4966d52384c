//! Vendor command implementation
//!
//! Runs the whole pipeline and prints a short summary: one line per built
//! artifact plus the archive path when aggregation ran.

use std::path::PathBuf;

use console::Style;

use crate::cli::VendorArgs;
use crate::commands::Env;
use crate::error::Result;
use crate::pipeline::{self, RunOptions};

/// Run vendor command
pub fn run(
    manifest: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    verbose: bool,
    args: VendorArgs,
) -> Result<()> {
    let env = Env::resolve(manifest, work_dir)?;

    let options = RunOptions {
        only: args.only,
        skip_aggregate: args.skip_aggregate,
        // Progress bars and verbose line output fight over the terminal
        progress: !args.no_progress && !verbose,
    };

    let report = pipeline::run(&env.manifest, &env.work, &env.manifest_dir, &options)?;

    let bold = Style::new().bold();
    println!(
        "{} ({} of {} packages)",
        bold.apply_to("Built:"),
        report.artifacts.len(),
        env.manifest.packages.len()
    );
    for artifact in &report.artifacts {
        println!(
            "  {} {} {}",
            Style::new().bold().yellow().apply_to(&artifact.package),
            artifact.version,
            Style::new().dim().apply_to(artifact.path.display())
        );
        if verbose {
            println!("    {}", Style::new().dim().apply_to(&artifact.checksum));
        }
    }

    match &report.archive {
        Some(archive) => {
            println!(
                "{} {}",
                bold.apply_to("Archive:"),
                Style::new().green().apply_to(archive.display())
            );
        }
        None => {
            println!(
                "{}",
                Style::new()
                    .dim()
                    .apply_to("No archive produced (partial run or --skip-aggregate)")
            );
        }
    }

    Ok(())
}
