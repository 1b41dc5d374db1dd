use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use specpair::config::Config;

mod convert;
mod download;
mod encode;
mod pairs;
mod plan;
mod run;
mod split;

/// specpair - Spectrum-pair training data pipeline
#[derive(Parser)]
#[command(name = "specpair")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which pair files to generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PairKind {
    /// Same peptide and charge
    Positive,
    /// Different peptide, similar precursor m/z
    Negative,
    /// Both pair files
    #[default]
    Both,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the raw library TSV to the metadata CSV
    Convert {
        /// Raw library TSV (defaults to the configured MassIVE-KB export)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Metadata CSV to write (defaults to the configured metadata path)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Split the metadata CSV into train/val/test partitions by dataset
    Split {
        /// Metadata CSV (defaults to the configured metadata path)
        #[arg(value_name = "METADATA")]
        metadata: Option<PathBuf>,

        /// Target share of rows in the validation partition
        #[arg(long)]
        val_ratio: Option<f64>,

        /// Target share of rows in the test partition
        #[arg(long)]
        test_ratio: Option<f64>,

        /// Seed for shuffling datasets
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Download the peak files referenced by the raw library TSV
    Download {
        /// Raw library TSV (defaults to the configured MassIVE-KB export)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Download directory (defaults to the configured peak directory)
        #[arg(long, value_name = "DIR")]
        peak_dir: Option<PathBuf>,

        /// Number of parallel downloads
        #[arg(short = 'j', long)]
        workers: Option<usize>,
    },

    /// Generate positive and/or negative pairs for a metadata CSV
    Pairs {
        /// Metadata CSV to generate pairs for
        #[arg(value_name = "METADATA")]
        metadata: PathBuf,

        /// Pair files to generate
        #[arg(short, long, default_value = "both", value_enum)]
        kind: PairKind,

        /// Precursor m/z tolerance for negative pairs
        #[arg(long)]
        mz_tolerance: Option<f64>,
    },

    /// Encode the spectra of an MGF file into a CSV feature table
    Encode {
        /// Input MGF file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Feature table to write (defaults to <feature_dir>/<input stem>.csv)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// MGF file with reference spectra, enables the reference encoder
        #[arg(long, value_name = "FILE")]
        reference_spectra: Option<PathBuf>,
    },

    /// Show the task graph, its files and the upcoming scheduled runs
    Plan,

    /// Run the pipeline
    Run {
        /// Keep running on the configured schedule
        #[arg(long)]
        watch: bool,

        /// Write the run report as JSON to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Convert { input, output } => convert::run(&config, input, output),
        Commands::Split {
            metadata,
            val_ratio,
            test_ratio,
            seed,
        } => split::run(&config, metadata, val_ratio, test_ratio, seed),
        Commands::Download {
            input,
            peak_dir,
            workers,
        } => download::run(&config, input, peak_dir, workers),
        Commands::Pairs {
            metadata,
            kind,
            mz_tolerance,
        } => pairs::run(&config, metadata, kind, mz_tolerance),
        Commands::Encode {
            input,
            output,
            reference_spectra,
        } => encode::run(&config, input, output, reference_spectra),
        Commands::Plan => plan::run(&config),
        Commands::Run { watch, report } => run::run(&config, watch, report),
    }
}
