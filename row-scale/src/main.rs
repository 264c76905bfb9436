mod common;
mod run_scale;
mod run_sim;
mod run_stat;

use clap::{Parser, Subcommand};
use run_scale::*;
use run_sim::*;
use run_stat::*;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ROW-SCALE",
    long_about = "Row-wise standardization of sparse matrices\n\
		  Each row is centred and scaled by its mean and standard deviation\n\
		  over all columns, implicit zeros included.\n\
		  Input is a MatrixMarket `.mtx` (or `.mtx.gz`) file."
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// verbosity (sets `RUST_LOG=info` unless already set)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Standardize rows into a dense matrix",
        long_about = "Standardize every row of a sparse matrix over all of its columns\n\
		      and write the dense result transposed: one line per column\n\
		      of the input, one field per row of the input.\n"
    )]
    Scale(ScaleArgs),

    #[command(
        about = "Per-row statistics over all columns",
        long_about = "Write the number of stored entries, sum, mean and standard\n\
		      deviation of each row, implicit zeros included.\n"
    )]
    Stat(StatArgs),

    /// simulate a sparse count matrix in MatrixMarket format
    Simulate(SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Scale(args) => {
            run_scale(args)?;
        }
        Commands::Stat(args) => {
            run_stat(args)?;
        }
        Commands::Simulate(args) => {
            run_simulate(args)?;
        }
    }

    Ok(())
}
