//! Locate command implementation
//!
//! Probes the host for every native library the manifest declares and
//! prints what was found. Fails fast on the first library that is missing
//! or below its version floor, same as a vendor run would.

use std::path::PathBuf;

use console::Style;

use crate::commands::Env;
use crate::error::Result;
use crate::locate;

/// Run locate command
pub fn run(manifest: Option<PathBuf>, work_dir: Option<PathBuf>) -> Result<()> {
    let env = Env::resolve(manifest, work_dir)?;

    if env.manifest.natives.is_empty() {
        println!("No native libraries declared.");
        return Ok(());
    }

    println!("Native libraries ({}):", env.manifest.natives.len());
    println!();

    for spec in &env.manifest.natives {
        let library = locate::locate(spec)?;
        println!(
            "  {} {}",
            Style::new().bold().yellow().apply_to(&library.name),
            Style::new().green().apply_to(&library.version)
        );
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Prefix:"),
            library.prefix.display()
        );
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Include:"),
            library.include_dir.display()
        );
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Libdir:"),
            library.lib_dir.display()
        );
        if let Some(floor) = &spec.min_version {
            println!(
                "    {} {}",
                Style::new().bold().apply_to("Floor:"),
                floor
            );
        }
        println!();
    }

    Ok(())
}
