//! List command implementation
//!
//! Lists declared packages with their pinned versions and whether a built
//! artifact currently exists in the work directory.

use std::path::PathBuf;

use console::Style;

use crate::builder;
use crate::cli::ListArgs;
use crate::commands::Env;
use crate::error::Result;
use crate::manifest::PackageRecord;
use crate::workdir::WorkDir;

/// Run list command
pub fn run(manifest: Option<PathBuf>, work_dir: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let env = Env::resolve(manifest, work_dir)?;

    println!("Declared packages ({}):", env.manifest.packages.len());
    println!();

    for package in &env.manifest.packages {
        display_package(package, &env.work, args.detailed);
        println!();
    }

    Ok(())
}

fn display_package(package: &PackageRecord, work: &WorkDir, detailed: bool) {
    println!(
        "  {} {}",
        Style::new().bold().yellow().apply_to(&package.name),
        package.version
    );

    let status = match builder::find_artifact(package, &work.output_dir(package)) {
        Ok(path) => format!(
            "{} {}",
            Style::new().green().apply_to("built"),
            Style::new().dim().apply_to(path.display())
        ),
        Err(_) => Style::new().dim().apply_to("not built").to_string(),
    };
    println!("    {} {}", Style::new().bold().apply_to("Status:"), status);

    if detailed {
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Source:"),
            package.source.describe()
        );
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Artifact:"),
            package.artifact
        );
        if !package.natives.is_empty() {
            println!(
                "    {} {}",
                Style::new().bold().apply_to("Natives:"),
                package.natives.join(", ")
            );
        }
    }
}
