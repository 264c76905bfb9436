use crate::csc_view::{CscError, CscParts, CscView};
use crate::sparse_stat::{RowMoments, SparseRunningStatistics};
use crate::traits::SparseScaleOps;
use clap::ValueEnum;
use indicatif::ParallelProgressIterator;
use log::{debug, warn};
use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;
use num_traits::Float;
use rayon::prelude::*;
use std::ops::AddAssign;

/// How the dense fill decides that a cell still needs the row's
/// standardized zero
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
pub enum ZeroFill {
    /// remember which cells were written by stored entries
    #[default]
    Occupancy,
    /// treat any cell that still reads exactly zero as unwritten;
    /// a stored value equal to its row mean gets overwritten
    ValueTest,
}

/// Accumulate and finalize per-row moments in one pass over the
/// stored entries
pub fn row_moments<T>(view: &CscView<'_, T>) -> RowMoments<T>
where
    T: Float + AddAssign,
{
    let mut stat = SparseRunningStatistics::new(view.nrows());
    stat.add_view(view);
    stat.to_moments()
}

/// Same as `row_moments`, with per-thread partial sums over column
/// blocks merged at the end
pub fn par_row_moments<T>(view: &CscView<'_, T>) -> RowMoments<T>
where
    T: Float + AddAssign + Send + Sync,
{
    let nrows = view.nrows();
    let ncols = view.ncols();
    let block_size = ncols.div_ceil(rayon::current_num_threads().max(1)).max(1);
    let nblocks = ncols.div_ceil(block_size);

    let stat = (0..nblocks)
        .into_par_iter()
        .fold(
            || SparseRunningStatistics::new(nrows),
            |mut stat, b| {
                let lb = b * block_size;
                let ub = ((b + 1) * block_size).min(ncols);
                stat.add_view_columns(view, lb, ub);
                stat
            },
        )
        .reduce(
            || SparseRunningStatistics::new(nrows),
            |mut lhs, rhs| {
                lhs.merge(&rhs);
                lhs
            },
        );

    stat.to_moments()
}

/// Write standardized values into a dense `nrows x ncols` matrix in
/// the input's orientation.
///
/// Stored entries are written first. Every cell that was not written
/// then receives the row's standardized zero, where "not written" is
/// decided by `zero_fill`.
///
/// `moments` must have been computed over the same matrix.
pub fn fill_standardized<T>(
    view: &CscView<'_, T>,
    moments: &RowMoments<T>,
    zero_fill: ZeroFill,
) -> anyhow::Result<DMatrix<T>>
where
    T: Float + nalgebra::Scalar,
{
    if moments.nrows() != view.nrows() || moments.ncols != view.ncols() {
        anyhow::bail!(
            "moments over {} x {} do not match the {} x {} matrix",
            moments.nrows(),
            moments.ncols,
            view.nrows(),
            view.ncols()
        );
    }
    Ok(fill_with_moments(view, moments, zero_fill))
}

fn fill_with_moments<T>(
    view: &CscView<'_, T>,
    moments: &RowMoments<T>,
    zero_fill: ZeroFill,
) -> DMatrix<T>
where
    T: Float + nalgebra::Scalar,
{
    let nrows = view.nrows();
    let ncols = view.ncols();

    let mut ret = DMatrix::<T>::from_element(nrows, ncols, T::zero());

    // column-major, same layout as `ret`
    let mut occupied = match zero_fill {
        ZeroFill::Occupancy => vec![false; nrows * ncols],
        ZeroFill::ValueTest => vec![],
    };

    for (col, (rows, vals)) in view.col_iter().enumerate() {
        for (&row, &x) in rows.iter().zip(vals.iter()) {
            ret[(row, col)] = moments.standardize(row, x);
            if zero_fill == ZeroFill::Occupancy {
                occupied[row + col * nrows] = true;
            }
        }
    }

    let zeros = moments.standardized_zeros();

    for (col, mut ret_j) in ret.column_iter_mut().enumerate() {
        for (row, x) in ret_j.iter_mut().enumerate() {
            let vacant = match zero_fill {
                ZeroFill::Occupancy => !occupied[row + col * nrows],
                ZeroFill::ValueTest => *x == T::zero(),
            };
            if vacant {
                *x = zeros[row];
            }
        }
    }

    ret
}

/// Standardize every row of a sparse matrix over all of its columns.
///
/// Returns the dense result transposed: `ncols x nrows`, so that
/// column `r` of the output holds the standardized row `r`.
pub fn standardize_rows<T>(view: &CscView<'_, T>, zero_fill: ZeroFill) -> DMatrix<T>
where
    T: Float + AddAssign + nalgebra::Scalar,
{
    let moments = row_moments(view);

    let ndegenerate = moments.zero_variance.iter().filter(|&&z| z).count();
    if ndegenerate > 0 {
        debug!(
            "{} of {} rows have zero variance",
            ndegenerate,
            moments.nrows()
        );
    }

    fill_with_moments(view, &moments, zero_fill).transpose()
}

/// Parallel `standardize_rows` with explicit occupancy.
///
/// Each output column (an input row) is prefilled with its
/// standardized zero, then exactly the stored positions are
/// overwritten, so every cell is written by one of the two steps.
pub fn par_standardize_rows<T>(view: &CscView<'_, T>) -> DMatrix<T>
where
    T: Float + AddAssign + nalgebra::Scalar + Send + Sync,
{
    let nrows = view.nrows();
    let ncols = view.ncols();
    let moments = par_row_moments(view);
    let zeros = moments.standardized_zeros();

    let mut ret = DMatrix::<T>::from_element(ncols, nrows, T::zero());

    ret.as_mut_slice()
        .par_chunks_mut(ncols)
        .zip(zeros.par_iter())
        .progress_count(nrows as u64)
        .for_each(|(ret_r, &z)| ret_r.fill(z));

    for (col, (rows, vals)) in view.col_iter().enumerate() {
        for (&row, &x) in rows.iter().zip(vals.iter()) {
            ret[(col, row)] = moments.standardize(row, x);
        }
    }

    ret
}

/// Validate raw column-compressed arrays, as handed over by a foreign
/// caller, and standardize their rows.
///
/// # Arguments
/// * `nrows` - number of rows
/// * `ncols` - number of columns
/// * `values` - stored values
/// * `row_index` - zero-based row of each stored value
/// * `col_ptr` - `ncols + 1` column pointers
///
/// # Returns
/// the `ncols x nrows` standardized dense matrix
pub fn row_scale_sparse<I>(
    nrows: I,
    ncols: I,
    values: Vec<f64>,
    row_index: &[I],
    col_ptr: &[I],
) -> Result<DMatrix<f64>, CscError>
where
    I: Copy + Into<i64>,
{
    let parts = CscParts::from_signed(nrows, ncols, values, row_index, col_ptr)?;
    Ok(standardize_rows(&parts.view(), ZeroFill::Occupancy))
}

/// Replace every stored value `x` by `log2(1 + x)`; implicit zeros
/// stay zero
pub fn log2_1p_inplace<T: Float>(values: &mut [T]) {
    let mut nbad = 0_usize;
    for x in values.iter_mut() {
        *x = (T::one() + *x).log2();
        if !x.is_finite() {
            nbad += 1;
        }
    }
    if nbad > 0 {
        warn!("{} stored values became non-finite after log2(1 + x)", nbad);
    }
}

impl<T> SparseScaleOps for CscMatrix<T>
where
    T: Float + AddAssign + nalgebra::Scalar + Send + Sync,
{
    type Scalar = T;
    type Mat = DMatrix<T>;

    fn row_moments(&self) -> anyhow::Result<RowMoments<T>> {
        let view = CscView::from_csc(self)?;
        Ok(row_moments(&view))
    }

    fn row_scale_dense(&self, zero_fill: ZeroFill) -> anyhow::Result<DMatrix<T>> {
        let view = CscView::from_csc(self)?;
        Ok(standardize_rows(&view, zero_fill))
    }

    fn par_row_scale_dense(&self) -> anyhow::Result<DMatrix<T>> {
        let view = CscView::from_csc(self)?;
        Ok(par_standardize_rows(&view))
    }
}
