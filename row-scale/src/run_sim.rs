use crate::common::*;
use clap::Args;
use matrix_util::mtx_io::write_mtx_triplets;
use matrix_util::simulate::{generate_sparse_counts, SimArgs};

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// number of rows
    #[arg(short = 'r', long)]
    n_rows: usize,

    /// number of columns
    #[arg(short = 'c', long)]
    n_cols: usize,

    /// average count per cell
    #[arg(long, default_value_t = 0.5)]
    mean: f64,

    /// Gamma shape of row-specific rates
    #[arg(long, default_value_t = 2.0)]
    overdisp: f64,

    /// random seed
    #[arg(long, default_value_t = 42)]
    rseed: u64,

    /// output `.mtx` file (`.mtx.gz` recommended)
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// number of threads, at most the number of logical CPUs
    #[arg(long, short = 't')]
    threads: Option<usize>,
}

pub fn run_simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    set_num_threads(args.threads)?;

    let sim_args = SimArgs {
        rows: args.n_rows,
        cols: args.n_cols,
        mean: args.mean,
        overdisp: args.overdisp,
        rseed: args.rseed,
    };

    info!("Simulating triplets...");
    let triplets = generate_sparse_counts(&sim_args)?;

    info!("writing them down to {}", args.out);
    write_mtx_triplets(&triplets, args.n_rows, args.n_cols, &args.out)?;
    Ok(())
}
