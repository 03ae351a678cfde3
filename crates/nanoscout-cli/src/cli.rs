use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "NanoScout CLI - Learn nanomaterial band gap and conductivity from lab data and rank novel element combinations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a property model on a dataset and rank freshly generated compositions.
    Explore(ExploreArgs),
    /// Summarize a dataset: row counts, element vocabulary, and category frequencies.
    Inspect(InspectArgs),
}

/// Arguments for the `explore` subcommand.
#[derive(Args, Debug)]
pub struct ExploreArgs {
    // --- Core Arguments ---
    /// Path to the materials dataset in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write all ranked predictions to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of rows of the ranking to print (all when omitted).
    #[arg(short, long, value_name = "INT")]
    pub top: Option<usize>,

    // --- Generation Overrides ---
    /// Override the number of compositions to generate.
    #[arg(short = 'n', long, value_name = "INT")]
    pub count: Option<usize>,

    /// Override the maximum number of elements per composition.
    #[arg(short = 'k', long, value_name = "INT")]
    pub max_elements: Option<usize>,

    /// Seed for composition sampling; omit for a fresh random batch.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Never propose compositions that already appear in the dataset.
    #[arg(long)]
    pub exclude_observed: bool,

    // --- Training Overrides ---
    /// Override the maximum number of training epochs.
    #[arg(long, value_name = "INT")]
    pub max_epochs: Option<usize>,

    /// Reject datasets containing conductivity categories other than Low, Moderate or High.
    #[arg(long)]
    pub strict_targets: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S training.patience=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the materials dataset in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub dataset: PathBuf,
}
