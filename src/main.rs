//! # specpair
//!
//! Command-line driver for the spectrum-pair training data pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Run the whole pipeline once with a config file
//! specpair --config specpair.toml run -v
//!
//! # Show the task order and output files
//! specpair plan
//!
//! # Individual steps
//! specpair convert library.tsv metadata.csv
//! specpair split metadata.csv --val-ratio 0.1 --test-ratio 0.1
//! specpair pairs metadata_train.csv --mz-tolerance 0.1
//! specpair encode spectra.mgf features.csv --reference-spectra refs.mgf
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    cli::init_logging(cli.verbosity());

    cli::dispatch(cli)
}
