//! Clean command implementation
//!
//! Removes pipeline state. A full clean deletes the work directory;
//! `--artifacts` limits deletion to build outputs, staging, and the dist
//! archive, leaving acquired sources and the download cache in place.

use std::path::{Path, PathBuf};

use console::Style;

use crate::cli::CleanArgs;
use crate::commands::Env;
use crate::error::Result;

/// Run clean command
pub fn run(manifest: Option<PathBuf>, work_dir: Option<PathBuf>, args: CleanArgs) -> Result<()> {
    let env = Env::resolve(manifest, work_dir)?;

    let removed: Vec<PathBuf> = if args.artifacts {
        [
            env.work.outputs_dir(),
            env.work.staging_dir(),
            env.work.dist_dir(),
        ]
        .into_iter()
        .filter(|dir| remove_dir(dir))
        .collect()
    } else {
        std::iter::once(env.work.root().to_path_buf())
            .filter(|dir| remove_dir(dir))
            .collect()
    };

    if removed.is_empty() {
        println!("Nothing to clean.");
    } else {
        for dir in removed {
            println!(
                "{} {}",
                Style::new().bold().apply_to("Removed:"),
                Style::new().dim().apply_to(dir.display())
            );
        }
    }

    Ok(())
}

/// Remove a directory tree, reporting whether anything existed
fn remove_dir(dir: &Path) -> bool {
    if dir.exists() {
        std::fs::remove_dir_all(dir).is_ok()
    } else {
        false
    }
}
