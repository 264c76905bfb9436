use crate::common::*;
use clap::Args;
use matrix_util::traits::SparseScaleOps;

#[derive(Args, Debug, Clone)]
pub struct StatArgs {
    /// sparse input matrix (`.mtx` or `.mtx.gz`)
    #[arg(required = true)]
    mtx_file: Box<str>,

    /// output file (`.gz` for compression, or `stdout`)
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// transform stored values by `log2(1 + x)` first
    #[arg(long, default_value_t = false)]
    log2p1: bool,

    /// row names, one per line
    #[arg(long)]
    row_names: Option<Box<str>>,

    /// field delimiter of the output
    #[arg(long, default_value = "\t")]
    delim: Box<str>,

    /// number of threads, at most the number of logical CPUs
    #[arg(long, short = 't')]
    threads: Option<usize>,
}

pub fn run_stat(args: &StatArgs) -> anyhow::Result<()> {
    set_num_threads(args.threads)?;

    let csc = read_sparse_input(&args.mtx_file, args.log2p1)?;

    let names = match &args.row_names {
        Some(file) => Some(read_names(file, csc.nrows(), "row")?),
        None => None,
    };

    let moments = csc.row_moments()?;

    let ndegenerate = moments.zero_variance.iter().filter(|&&z| z).count();
    info!(
        "{} rows over {} columns; {} with zero variance",
        moments.nrows(),
        moments.ncols,
        ndegenerate
    );

    mkdir(&args.out)?;
    moments.save(&args.out, names.as_deref(), &args.delim)?;
    info!("wrote row statistics to {}", args.out);
    Ok(())
}
