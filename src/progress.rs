//! Progress bar display for vendoring runs

use indicatif::{ProgressBar, ProgressStyle};

/// Pipeline stages a package passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Build,
}

impl Stage {
    fn label(self) -> &'static str {
        match self {
            Stage::Acquire => "acquiring",
            Stage::Build => "building",
        }
    }
}

/// Progress display for a vendoring run
pub struct ProgressDisplay {
    package_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total package count
    pub fn new(total_packages: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let package_pb = ProgressBar::new(total_packages);
        package_pb.set_style(style);

        Self { package_pb }
    }

    /// Show the package and stage currently in flight
    pub fn update(&self, package_name: &str, stage: Stage) {
        self.package_pb
            .set_message(format!("{} {}", stage.label(), package_name));
    }

    /// Mark one package as fully built
    pub fn package_done(&self) {
        self.package_pb.inc(1);
    }

    /// Finish with a final message
    pub fn finish(&self, msg: &str) {
        self.package_pb.finish_with_message(msg.to_string());
    }

    /// Abandon on error so the failing tool's output stays visible
    pub fn abandon(&self) {
        self.package_pb.abandon();
    }
}
