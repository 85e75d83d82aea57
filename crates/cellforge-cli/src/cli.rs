use cellforge::core::models::label::SiteLabel;
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
    author = "The cellforge developers",
    version,
    about = "cellforge CLI - Supercell construction, periodic neighbor search, trajectory snapshots, and Monte Carlo occupancy annealing for VASP-style crystal structures.",
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
    /// Expand a POSCAR unit cell into a supercell and write POSCAR_{NxNyNz}.vasp.
    Supercell(SupercellArgs),
    /// List all periodic images within a cutoff radius of a chosen atom.
    Neighbors(NeighborsArgs),
    /// Extract POSCAR snapshots from an XDATCAR trajectory at chosen times.
    Snapshots(SnapshotsArgs),
    /// Run Metropolis Monte Carlo over site occupancies with an external energy calculator.
    Anneal(AnnealArgs),
}

/// Arguments for the `supercell` subcommand.
#[derive(Args, Debug)]
pub struct SupercellArgs {
    /// Path to the input structure file (VASP-5 POSCAR/CONTCAR, Direct coordinates).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Repetition counts along the three lattice vectors. Must be integers >= 1.
    #[arg(
        short,
        long,
        required = true,
        num_args = 3,
        value_names = ["NX", "NY", "NZ"]
    )]
    pub repetitions: Vec<i64>,

    /// Directory the output file is written into.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

/// Arguments for the `neighbors` subcommand.
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Path to the input structure file (VASP-5 POSCAR/CONTCAR, Direct coordinates).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Center atom as species plus 1-based index, e.g. "O12" or "Fe3".
    #[arg(short, long, required = true, value_name = "LABEL")]
    pub center: SiteLabel,

    /// Cutoff radius in Å around the center atom.
    #[arg(short = 'r', long, required = true, value_name = "ANGSTROM")]
    pub cutoff: f64,
}

/// Arguments for the `snapshots` subcommand.
#[derive(Args, Debug)]
pub struct SnapshotsArgs {
    /// Path to the XDATCAR trajectory file.
    #[arg(short, long, value_name = "PATH", default_value = "XDATCAR")]
    pub input: PathBuf,

    /// Ionic time step (POTIM) of the simulation, in fs.
    #[arg(short, long, required = true, value_name = "FS")]
    pub potim: f64,

    /// Simulation times to extract, in ps. The closest frame wins.
    #[arg(
        short,
        long,
        required = true,
        num_args = 1..,
        value_name = "PS"
    )]
    pub times: Vec<f64>,

    /// Directory the snapshot files are written into.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,
}

/// Arguments for the `anneal` subcommand.
#[derive(Args, Debug)]
pub struct AnnealArgs {
    /// Path to the annealing configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the number of Metropolis steps from the config file.
    #[arg(long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Override the number of independent runs from the config file.
    #[arg(long, value_name = "INT")]
    pub runs: Option<usize>,

    /// Override the simulation temperature (K) from the config file.
    #[arg(long, value_name = "KELVIN")]
    pub temperature: Option<f64>,

    /// Override the RNG seed from the config file.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}
