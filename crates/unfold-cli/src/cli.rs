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
    author = "molunfold contributors",
    version,
    about = "unfold - builds QUBO energy models for molecular unfolding and turns solver samples back into unfolded conformations.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build QUBO energy models for a molecule over a grid of parameters.
    Build(BuildArgs),
    /// Turn solver samples for a model into an unfolded conformation.
    Reconstruct(ReconstructArgs),
    /// Show the rotatable bonds and rotation groups of a molecule.
    Inspect(InspectArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the input molecule (MOL2).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory that receives one model file per built model.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Complexity values: how many top-ranked rotatable bonds each model uses.
    #[arg(short = 'm', long = "m", value_name = "INT", value_delimiter = ',')]
    pub m_values: Vec<usize>,

    /// Number of discretised angles per bond.
    #[arg(short = 'd', long = "d", value_name = "INT", value_delimiter = ',')]
    pub d_values: Vec<usize>,

    /// One-hot constraint strengths.
    #[arg(short = 'a', long = "a", value_name = "FLOAT", value_delimiter = ',')]
    pub a_values: Vec<f64>,

    /// Quadratization penalty strengths.
    #[arg(long = "hq", value_name = "FLOAT", value_delimiter = ',')]
    pub hq_values: Vec<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S build.d=4,8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `reconstruct` subcommand.
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Path to the molecule the model was built from (MOL2).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the model file written by `build`.
    #[arg(long, required = true, value_name = "PATH")]
    pub model: PathBuf,

    /// Path to the solver's sample table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub samples: PathBuf,

    /// Path for the unfolded molecule (MOL2).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override how many of the lowest-energy samples are inspected.
    #[arg(long, value_name = "INT")]
    pub max_candidates: Option<usize>,

    /// Override the contact-distance scale used for clash detection.
    #[arg(long, value_name = "FLOAT")]
    pub clash_scale: Option<f64>,

    /// Accept samples without checking for steric clashes.
    #[arg(long)]
    pub no_clash_check: bool,

    /// Also write a JSON report of the chosen torsions and anomalies.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S reconstruction.max-candidates=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the molecule (MOL2).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Highest complexity level whose rotation groups are listed.
    #[arg(short = 'm', long = "max-m", value_name = "INT", default_value_t = 2)]
    pub max_m: usize,

    /// Summarise a model file instead of enumerating groups.
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,
}
