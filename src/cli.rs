//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Provender - dependency vendoring pipeline
///
/// Fetch, build, and bundle pinned third-party packages into one
/// platform-keyed archive for redistribution.
#[derive(Parser, Debug)]
#[command(
    name = "provender",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Dependency vendoring pipeline for native-linked packages",
    long_about = "Provender reads a manifest of pinned third-party packages, locates the \
                  native libraries they build against, acquires each source (archive \
                  download or git checkout), runs each build, and aggregates the built \
                  artifacts plus a generated environment descriptor into one compressed \
                  archive keyed by host platform.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  provender vendor\n    \
                  provender vendor --only geo-bundle\n    \
                  provender locate\n    \
                  provender list --detailed\n    \
                  provender clean --artifacts"
)]
pub struct Cli {
    /// Manifest file (defaults to provender.yaml in the current directory)
    #[arg(long, short = 'm', global = true)]
    pub manifest: Option<PathBuf>,

    /// Work directory (defaults to .provender next to the manifest)
    #[arg(long, global = true, env = "PROVENDER_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full vendoring pipeline
    Vendor(VendorArgs),

    /// List declared packages and their build status
    List(ListArgs),

    /// Probe the host for the declared native libraries
    Locate,

    /// Delete pipeline state from the work directory
    Clean(CleanArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the vendor command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Vendor everything:\n    provender vendor\n\n\
                  Vendor selected packages (skips the aggregate archive):\n    \
                  provender vendor --only geo-bundle --only db-driver\n\n\
                  Build everything but skip the archive:\n    provender vendor --skip-aggregate")]
pub struct VendorArgs {
    /// Restrict the run to the named packages (repeatable)
    #[arg(long = "only", value_name = "PACKAGE")]
    pub only: Vec<String>,

    /// Stop after builds; do not stage or pack the archive
    #[arg(long)]
    pub skip_aggregate: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show sources, natives, and artifact paths
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the clean command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Remove the whole work directory:\n    provender clean\n\n\
                  Remove only built artifacts and the archive:\n    provender clean --artifacts")]
pub struct CleanArgs {
    /// Remove only build outputs, staging, and the dist archive
    #[arg(long)]
    pub artifacts: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
