pub use log::info;
pub use matrix_util::common_io::{mkdir, read_lines};
pub use matrix_util::mtx_io::read_mtx_csc;
pub use matrix_util::sparse_scale::log2_1p_inplace;
pub use nalgebra_sparse::CscMatrix;

/// Size the global rayon pool, at most the number of logical CPUs
pub fn set_num_threads(max_threads: Option<usize>) -> anyhow::Result<()> {
    if let Some(max_threads) = max_threads {
        let num_threads = num_cpus::get().min(max_threads).max(1);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;
    }
    info!("will use {} threads", rayon::current_num_threads());
    Ok(())
}

/// Read the sparse input, optionally `log2(1 + x)` transformed
pub fn read_sparse_input(mtx_file: &str, log2p1: bool) -> anyhow::Result<CscMatrix<f64>> {
    let mut csc = read_mtx_csc(mtx_file)?;
    if log2p1 {
        info!("log2(1 + x) on {} stored values", csc.nnz());
        log2_1p_inplace(csc.values_mut());
    }
    Ok(csc)
}

/// Read one name per line and check the count
pub fn read_names(file: &str, expected: usize, what: &str) -> anyhow::Result<Vec<Box<str>>> {
    let names: Vec<Box<str>> = read_lines(file)?
        .into_iter()
        .filter(|x| !x.trim().is_empty())
        .map(|x| {
            x.split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string()
                .into_boxed_str()
        })
        .collect();

    if names.len() != expected {
        anyhow::bail!(
            "{} has {} {} names, but the matrix has {}",
            file,
            names.len(),
            what,
            expected
        );
    }
    Ok(names)
}
