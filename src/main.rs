//! Provender - dependency vendoring pipeline
//!
//! Fetches, builds, and bundles pinned third-party packages (and the native
//! libraries they link against) into one redistributable archive keyed by
//! host platform.

use clap::Parser;

mod builder;
mod cli;
mod commands;
mod context;
mod descriptor;
mod error;
mod hash;
mod locate;
mod lock;
mod manifest;
mod pipeline;
mod platform;
mod progress;
mod source;
mod stage;
mod workdir;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Vendor(args) => {
            commands::vendor::run(cli.manifest, cli.work_dir, cli.verbose, args)
        }
        Commands::List(args) => commands::list::run(cli.manifest, cli.work_dir, args),
        Commands::Locate => commands::locate::run(cli.manifest, cli.work_dir),
        Commands::Clean(args) => commands::clean::run(cli.manifest, cli.work_dir, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
