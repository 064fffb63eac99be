use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-aggregator")]
#[command(about = "Concurrent per-station min/max/mean over station;value measurement files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Configuration file (TOML, YAML or JSON); STATION_AGG_* variables override it"
    )]
    pub config: Option<PathBuf>,
}

/// Pipeline tunables; anything left unset falls back to the configuration layers
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    #[arg(short, long, help = "Input measurements file [default: measurements.txt]")]
    pub input_file: Option<PathBuf>,

    #[arg(short, long, help = "Bytes read per window [default: 134217728]")]
    pub window_size: Option<usize>,

    #[arg(short = 'b', long, help = "Sub-batches per chunk [default: 16]")]
    pub sub_batches: Option<usize>,

    #[arg(long, help = "Parser worker threads [default: number of CPUs]")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Sub-batches queued ahead of the workers [default: 2 per worker]")]
    pub channel_capacity: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a measurements file and write per-station statistics
    Process {
        #[command(flatten)]
        pipeline: PipelineArgs,

        #[arg(short, long, help = "Output file path [default: output.txt]")]
        output_file: Option<PathBuf>,
    },

    /// Run ingestion and aggregation without writing output
    Validate {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the values collected for specific stations (single-threaded scan)
    Inspect {
        #[arg(short, long, help = "Input measurements file [default: measurements.txt]")]
        input_file: Option<PathBuf>,

        #[arg(short, long = "station", required = true, help = "Station name; repeatable")]
        stations: Vec<String>,

        #[arg(long, default_value = "10", help = "Values to list per station")]
        sample: usize,
    },
}
