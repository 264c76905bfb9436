use crate::common::*;
use clap::Args;
use matrix_util::sparse_scale::ZeroFill;
use matrix_util::traits::{IoOps, SparseScaleOps};

#[derive(Args, Debug, Clone)]
pub struct ScaleArgs {
    /// sparse input matrix (`.mtx` or `.mtx.gz`)
    #[arg(required = true)]
    mtx_file: Box<str>,

    /// output file (`.gz` for compression, or `stdout`)
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// transform stored values by `log2(1 + x)` before scaling
    #[arg(long, default_value_t = false)]
    log2p1: bool,

    /// how cells not covered by stored values are detected;
    /// `valuetest` reproduces the legacy `cell == 0` check
    #[arg(long, value_enum, default_value = "occupancy")]
    zero_fill: ZeroFill,

    /// run the statistics and fill passes on the rayon pool
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// number of threads, at most the number of logical CPUs
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// input row names, one per line; become output column names
    #[arg(long)]
    row_names: Option<Box<str>>,

    /// input column names, one per line; become output row names
    #[arg(long)]
    col_names: Option<Box<str>>,

    /// field delimiter of the output
    #[arg(long, default_value = "\t")]
    delim: Box<str>,
}

pub fn run_scale(args: &ScaleArgs) -> anyhow::Result<()> {
    set_num_threads(args.threads)?;

    let csc = read_sparse_input(&args.mtx_file, args.log2p1)?;
    let (nrows, ncols) = (csc.nrows(), csc.ncols());

    let row_names = match &args.row_names {
        Some(file) => Some(read_names(file, nrows, "row")?),
        None => None,
    };
    let col_names = match &args.col_names {
        Some(file) => Some(read_names(file, ncols, "column")?),
        None => None,
    };

    let out = if args.parallel {
        if args.zero_fill != ZeroFill::Occupancy {
            log::warn!("the parallel fill always tracks occupancy; ignoring --zero-fill");
        }
        csc.par_row_scale_dense()?
    } else {
        csc.row_scale_dense(args.zero_fill)?
    };

    info!(
        "standardized {} rows; writing {} x {} to {}",
        nrows,
        out.nrows(),
        out.ncols(),
        args.out
    );

    mkdir(&args.out)?;
    out.write_file_delim_with_names(
        &args.out,
        &args.delim,
        col_names.as_deref(),
        row_names.as_deref(),
    )?;

    Ok(())
}
