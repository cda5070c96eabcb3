//! Macbeth CLI binary.
//!
//! Runs the consumption CAPM Fama-MacBeth study from CSV inputs.

mod commands;
mod config;
mod error;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use commands::{NipaPaths, OutputOptions};
use config::{CliConfig, Overrides};
use error::CliError;
use logging::LogFormat;
use macbeth_output::ExportFormat;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "macbeth")]
#[command(about = "Macbeth: Fama-MacBeth tests of the consumption CAPM", long_about = None)]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NipaArgs {
    /// Nominal consumption CSV (year, nondurables, services)
    #[arg(long)]
    consumption: PathBuf,

    /// Population CSV (year, pop)
    #[arg(long)]
    population: PathBuf,

    /// Price index CSV (prc_index_nondurables, prc_index_services)
    #[arg(long)]
    price_index: PathBuf,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// NIPA filter parameter
    #[arg(long)]
    omega: Option<f64>,
}

impl NipaArgs {
    fn paths(&self) -> NipaPaths {
        NipaPaths {
            consumption: self.consumption.clone(),
            population: self.population.clone(),
            price_index: self.price_index.clone(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    PrettyJson,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::PrettyJson => Self::PrettyJson,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the filtered and unfiltered Fama-MacBeth study
    Run {
        /// Test asset returns CSV (first column period label)
        #[arg(long)]
        assets: PathBuf,

        #[command(flatten)]
        nipa: NipaArgs,

        /// Highest prune level in the sweep
        #[arg(long)]
        max_prune: Option<usize>,

        /// RANSAC residual threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// RANSAC random seed
        #[arg(long)]
        seed: Option<u64>,

        /// RANSAC trial count
        #[arg(long)]
        max_trials: Option<usize>,

        /// Restrict the second pass to periods from the asset offset onward
        #[arg(long)]
        align_second_pass: bool,

        /// Directory for result files
        #[arg(long)]
        output: Option<PathBuf>,

        /// Result file format
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Print the summary as markdown
        #[arg(long)]
        markdown: bool,
    },

    /// Print filtered and unfiltered consumption growth
    Factors {
        #[command(flatten)]
        nipa: NipaArgs,

        /// Number of years to print
        #[arg(long, default_value = "8")]
        rows: usize,

        /// Print all factors as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Run {
            assets,
            nipa,
            max_prune,
            threshold,
            seed,
            max_trials,
            align_second_pass,
            output,
            format,
            markdown,
        } => {
            let config = CliConfig::load(nipa.config.as_deref())?.with_overrides(&Overrides {
                omega: nipa.omega,
                max_prune,
                threshold,
                seed,
                max_trials,
                align_second_pass,
            });
            let output = OutputOptions {
                dir: output,
                format: format.into(),
                markdown,
            };
            commands::run(&assets, &nipa.paths(), &config, &output)?;
        }
        Commands::Factors { nipa, rows, json } => {
            let config = CliConfig::load(nipa.config.as_deref())?.with_overrides(&Overrides {
                omega: nipa.omega,
                ..Default::default()
            });
            commands::factors(&nipa.paths(), &config, rows, json)?;
        }
    }

    Ok(())
}
