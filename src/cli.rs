//! CLI argument parsing for cyclestack

use crate::config::StackOptions;
use crate::tree::{MemoryGranularity, SyncGranularity};
use crate::view::ViewMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cyclestack")]
#[command(version)]
#[command(about = "Cycle stacks from interval core model simulation results", long_about = None)]
pub struct Cli {
    /// Simulation results file (JSON with `config` and `results`)
    #[arg(short = 'd', long = "results", value_name = "FILE")]
    pub results: PathBuf,

    /// Show cycles per instruction
    #[arg(long, conflicts_with_all = ["time", "abstime"])]
    pub cpi: bool,

    /// Show fraction of elapsed time (default)
    #[arg(long, conflicts_with = "abstime")]
    pub time: bool,

    /// Show absolute time in seconds
    #[arg(long)]
    pub abstime: bool,

    /// Group categories into compute, communicate and synchronize
    #[arg(long)]
    pub simplified: bool,

    /// Emit every category regardless of its threshold
    #[arg(long = "no-collapse")]
    pub no_collapse: bool,

    /// Split memory time by neighboring caches and off-socket traffic
    #[arg(long = "no-simple-mem")]
    pub no_simple_mem: bool,

    /// Report all synchronization as a single category
    #[arg(long = "simple-sync")]
    pub simple_sync: bool,

    /// Average the selected cores into a single stack
    #[arg(long)]
    pub aggregate: bool,

    /// Only report these cores (e.g., --cores 0,2,3)
    #[arg(long, value_name = "CORES", value_delimiter = ',')]
    pub cores: Option<Vec<usize>>,

    /// Leave cores computing less than this fraction of the time out of the
    /// CSV row (0 disables)
    #[arg(long = "min-compute", value_name = "FRACTION")]
    pub min_compute: Option<f64>,

    /// Custom category tree (TOML)
    #[arg(long, value_name = "FILE")]
    pub tree: Option<PathBuf>,

    /// Stack options file (TOML); flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append the summary row to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Write the CSV header before the row
    #[arg(long = "csv-header", requires = "csv")]
    pub csv_header: bool,

    /// Label of the CSV row
    #[arg(long = "job-name", value_name = "NAME", default_value = "")]
    pub job_name: String,

    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Apply the command-line flags on top of `base`
    pub fn stack_options(&self, base: StackOptions) -> StackOptions {
        let mut options = base;

        if self.cpi {
            options.view = ViewMode::Cpi;
        } else if self.abstime {
            options.view = ViewMode::AbsTime;
        } else if self.time {
            options.view = ViewMode::Time;
        }

        if self.simplified {
            options.simplified = true;
        }
        if self.no_collapse {
            options.collapse = false;
        }
        if self.no_simple_mem {
            options.memory = MemoryGranularity::WithNeighbors;
        }
        if self.simple_sync {
            options.sync = SyncGranularity::Flat;
        }
        if self.aggregate {
            options.aggregate = true;
        }
        if let Some(cores) = &self.cores {
            options.cores = Some(cores.clone());
        }
        if let Some(fraction) = self.min_compute {
            options.min_compute_fraction = Some(fraction);
        }

        options
    }
}
