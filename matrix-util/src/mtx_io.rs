use crate::common_io::*;
use log::info;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use std::io::Write;

/// Write the triplets into a MatrixMarket file with 1-based indices
/// * `triplets` - (row, col, value) with 0-based indices
/// * `nrow` - number of rows
/// * `ncol` - number of columns
/// * `mtx_file` - the output file (e.g., "matrix.mtx.gz")
pub fn write_mtx_triplets(
    triplets: &[(usize, usize, f64)],
    nrow: usize,
    ncol: usize,
    mtx_file: &str,
) -> anyhow::Result<()> {
    mkdir(mtx_file)?;

    let mut buf = open_buf_writer(mtx_file)?;

    let nnz = triplets.len();
    writeln!(buf, "%%MatrixMarket matrix coordinate real general")?;
    writeln!(buf, "{}\t{}\t{}", nrow, ncol, nnz)?;

    for (row, col, val) in triplets {
        writeln!(buf, "{}\t{}\t{}", row + 1, col + 1, val)?;
    }

    buf.flush()?;
    Ok(())
}

/// Shape line of a MatrixMarket coordinate file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtxShape {
    pub nrows: usize,
    pub ncols: usize,
    pub nnz: usize,
}

/// Read a MatrixMarket coordinate file and return 0-based triplets
/// (row, col, value) sorted by column, then row
/// * `mtx_file` - Path to the matrix market file (plain or `.gz`)
pub fn read_mtx_triplets(mtx_file: &str) -> anyhow::Result<(Vec<(usize, usize, f64)>, MtxShape)> {
    // the first line after `%` comments is the shape
    let mtx_hdr_position = 0;

    let parse_one = |triplet: &[Box<str>]| -> anyhow::Result<(usize, usize, f64)> {
        if triplet.len() != 3 {
            anyhow::bail!("expected `row col value`, found {} fields", triplet.len());
        }
        let row = triplet[0].parse::<usize>()?;
        let col = triplet[1].parse::<usize>()?;
        let val = triplet[2].parse::<f64>()?;
        if row == 0 || col == 0 {
            anyhow::bail!("MatrixMarket indices are 1-based: {} {}", row, col);
        }
        Ok((row - 1, col - 1, val))
    };

    let data = read_lines_of_words(mtx_file, mtx_hdr_position)?;

    if data.header.len() != 3 {
        anyhow::bail!("Failed to parse mtx header in {}", mtx_file);
    }

    let shape = MtxShape {
        nrows: data.header[0].parse::<usize>()?,
        ncols: data.header[1].parse::<usize>()?,
        nnz: data.header[2].parse::<usize>()?,
    };

    let mut triplets = data
        .lines
        .iter()
        .map(|x| parse_one(x.as_slice()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if triplets.len() != shape.nnz {
        anyhow::bail!(
            "{} declares {} entries but holds {}",
            mtx_file,
            shape.nnz,
            triplets.len()
        );
    }

    if let Some(&(row, col, _)) = triplets
        .iter()
        .find(|&&(row, col, _)| row >= shape.nrows || col >= shape.ncols)
    {
        anyhow::bail!(
            "entry ({}, {}) lies outside {} x {}",
            row + 1,
            col + 1,
            shape.nrows,
            shape.ncols
        );
    }

    triplets.sort_by_key(|&(row, col, _)| (col, row));
    Ok((triplets, shape))
}

/// Read a MatrixMarket file into a column-compressed matrix;
/// duplicate entries are summed
pub fn read_mtx_csc(mtx_file: &str) -> anyhow::Result<CscMatrix<f64>> {
    let (triplets, shape) = read_mtx_triplets(mtx_file)?;
    info!(
        "read {} x {} matrix with {} stored entries from {}",
        shape.nrows, shape.ncols, shape.nnz, mtx_file
    );

    let (rows, (cols, vals)): (Vec<usize>, (Vec<usize>, Vec<f64>)) = triplets
        .into_iter()
        .map(|(r, c, v)| (r, (c, v)))
        .unzip();

    let coo = CooMatrix::try_from_triplets(shape.nrows, shape.ncols, rows, cols, vals)
        .map_err(|e| anyhow::anyhow!("invalid triplets in {}: {}", mtx_file, e))?;

    Ok(CscMatrix::from(&coo))
}
