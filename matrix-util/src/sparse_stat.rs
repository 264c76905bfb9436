use crate::common_io::write_lines;
use crate::csc_view::CscView;
use num_traits::Float;
use std::fmt::Display;
use std::ops::AddAssign;

/// Running statistics that accepts sparse column input but stores
/// sufficient statistics in dense vectors, one slot per row.
///
/// Only stored values are ever visited. Implicit zeros add nothing
/// to `s1` or `s2`, so it is enough to count the columns seen and use
/// that count as the row length.
///
#[derive(Clone, Debug)]
pub struct SparseRunningStatistics<T>
where
    T: Float,
{
    nrows: usize,
    ncols_processed: usize,
    nnz: Vec<usize>,
    s1: Vec<T>,
    s2: Vec<T>,
}

impl<T> SparseRunningStatistics<T>
where
    T: Float + AddAssign,
{
    /// Create a new SparseRunningStatistics object
    ///
    /// # Arguments
    /// * `nrows` - Number of rows
    ///
    pub fn new(nrows: usize) -> Self {
        SparseRunningStatistics {
            nrows,
            ncols_processed: 0,
            nnz: vec![0; nrows],
            s1: vec![T::zero(); nrows],
            s2: vec![T::zero(); nrows],
        }
    }

    /// Add a sparse column to the running statistics
    ///
    /// # Arguments
    /// * `row_indices` - Row indices of stored values
    /// * `values` - Stored values
    ///
    pub fn add_sparse_column(&mut self, row_indices: &[usize], values: &[T]) {
        debug_assert_eq!(row_indices.len(), values.len());

        for (&row, &val) in row_indices.iter().zip(values.iter()) {
            self.nnz[row] += 1;
            self.s1[row] += val;
            self.s2[row] += val * val;
        }
        self.ncols_processed += 1;
    }

    /// Add every column of a validated view
    pub fn add_view(&mut self, view: &CscView<'_, T>) {
        debug_assert_eq!(view.nrows(), self.nrows);
        for (rows, vals) in view.col_iter() {
            self.add_sparse_column(rows, vals);
        }
    }

    /// Add columns `[lb, ub)` of a validated view
    pub fn add_view_columns(&mut self, view: &CscView<'_, T>, lb: usize, ub: usize) {
        debug_assert!(lb <= ub && ub <= view.ncols());
        for col in lb..ub {
            let (rows, vals) = view.column(col);
            self.add_sparse_column(rows, vals);
        }
    }

    /// Fold in statistics gathered over a disjoint set of columns
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.nrows, other.nrows);
        for (a, &b) in self.nnz.iter_mut().zip(other.nnz.iter()) {
            *a += b;
        }
        for (a, &b) in self.s1.iter_mut().zip(other.s1.iter()) {
            *a += b;
        }
        for (a, &b) in self.s2.iter_mut().zip(other.s2.iter()) {
            *a += b;
        }
        self.ncols_processed += other.ncols_processed;
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns processed so far
    pub fn ncols_processed(&self) -> usize {
        self.ncols_processed
    }

    /// Mean and population variance `s2/n - mean^2` of every row,
    /// before any clamping. `None` until a column has been seen.
    fn raw_mean_variance(&self) -> Option<(Vec<T>, Vec<T>)> {
        if self.ncols_processed == 0 {
            return None;
        }
        let n = T::from(self.ncols_processed)?;
        let mean: Vec<T> = self.s1.iter().map(|&s1| s1 / n).collect();
        let variance = self
            .s2
            .iter()
            .zip(mean.iter())
            .map(|(&s2, &mu)| s2 / n - mu * mu)
            .collect();
        Some((mean, variance))
    }

    /// Finalize into per-row moments, using the number of columns
    /// processed as the length of every row.
    ///
    /// Rows of an accumulator that has seen no column come out with
    /// mean `0` and the zero-variance guard set.
    pub fn to_moments(&self) -> RowMoments<T> {
        let (mean, variance) = self
            .raw_mean_variance()
            .unwrap_or_else(|| (vec![T::zero(); self.nrows], vec![T::zero(); self.nrows]));

        // cancellation can leave a tiny negative variance
        let (sd, zero_variance): (Vec<T>, Vec<bool>) = variance
            .into_iter()
            .map(|v| {
                let sig = v.max(T::zero()).sqrt();
                if sig == T::zero() {
                    (T::one(), true)
                } else {
                    (sig, false)
                }
            })
            .unzip();

        RowMoments {
            ncols: self.ncols_processed,
            nnz: self.nnz.clone(),
            sum: self.s1.clone(),
            sum_sq: self.s2.clone(),
            mean,
            sd,
            zero_variance,
        }
    }
}

/// Finalized per-row moments over all `ncols` entries of each row.
///
/// `sd` already carries the zero-variance guard: rows whose standard
/// deviation vanishes get `1`, and are flagged in `zero_variance`.
#[derive(Clone, Debug, PartialEq)]
pub struct RowMoments<T> {
    pub ncols: usize,
    pub nnz: Vec<usize>,
    pub sum: Vec<T>,
    pub sum_sq: Vec<T>,
    pub mean: Vec<T>,
    pub sd: Vec<T>,
    pub zero_variance: Vec<bool>,
}

impl<T> RowMoments<T>
where
    T: Float,
{
    pub fn nrows(&self) -> usize {
        self.mean.len()
    }

    /// `(x - mean[row]) / sd[row]`
    #[inline]
    pub fn standardize(&self, row: usize, x: T) -> T {
        (x - self.mean[row]) / self.sd[row]
    }

    /// Standardized value of an implicit zero in `row`
    #[inline]
    pub fn standardized_zero(&self, row: usize) -> T {
        self.standardize(row, T::zero())
    }

    /// Standardized zero of every row
    pub fn standardized_zeros(&self) -> Vec<T> {
        (0..self.nrows()).map(|r| self.standardized_zero(r)).collect()
    }

    /// Standard deviation before the zero-variance guard
    pub fn raw_sd(&self, row: usize) -> T {
        if self.zero_variance[row] {
            T::zero()
        } else {
            self.sd[row]
        }
    }
}

impl<T> RowMoments<T>
where
    T: Float + Display,
{
    /// Save the statistics to a file
    /// # Arguments
    /// * `filename` - output file (`.gz` for compression, or `stdout`)
    /// * `names` - row names; row positions are used if `None`
    /// * `sep` - separator string
    pub fn save(&self, filename: &str, names: Option<&[Box<str>]>, sep: &str) -> anyhow::Result<()> {
        let mut out = self.to_string_vec(names, sep)?;
        let header = format!("#name{}nnz{}tot{}mu{}sig", sep, sep, sep, sep);
        out.insert(0, header.into_boxed_str());
        write_lines(&out, filename)?;
        Ok(())
    }

    /// Convert statistics to string vectors for output
    pub fn to_string_vec(
        &self,
        names: Option<&[Box<str>]>,
        sep: &str,
    ) -> anyhow::Result<Vec<Box<str>>> {
        let nrows = self.nrows();
        if let Some(names) = names {
            if names.len() != nrows {
                anyhow::bail!(
                    "The number of names ({}) does not match nrows ({})",
                    names.len(),
                    nrows
                );
            }
        }

        let out: Vec<Box<str>> = (0..nrows)
            .map(|i| {
                let name = match names {
                    Some(names) => names[i].to_string(),
                    None => i.to_string(),
                };
                format!(
                    "{}{}{}{}{}{}{}{}{}",
                    name,
                    sep,
                    self.nnz[i],
                    sep,
                    format_value(self.sum[i]),
                    sep,
                    format_value(self.mean[i]),
                    sep,
                    format_value(self.raw_sd(i))
                )
                .into_boxed_str()
            })
            .collect();
        Ok(out)
    }
}

fn format_value<T: Float + Display>(v: T) -> String {
    let v_f64 = v.to_f64().unwrap_or(0.0);
    if !v_f64.is_finite() {
        format!("{}", v_f64)
    } else if v_f64.abs() > 1e-4 {
        format!("{:.4}", v_f64)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else if v_f64.abs() > 1e-20 {
        format!("{:.4e}", v_f64)
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_running_stat_basic() {
        let mut stat = SparseRunningStatistics::<f32>::new(4);

        // Column 0: [1, 0, 2, 0]
        stat.add_sparse_column(&[0, 2], &[1.0, 2.0]);

        // Column 1: [0, 3, 0, 4]
        stat.add_sparse_column(&[1, 3], &[3.0, 4.0]);

        assert_eq!(stat.ncols_processed(), 2);
        let moments = stat.to_moments();
        assert_eq!(moments.nnz, vec![1, 1, 1, 1]);
        assert_eq!(moments.sum, vec![1.0, 3.0, 2.0, 4.0]);

        // mean: [0.5, 1.5, 1.0, 2.0]
        assert!((moments.mean[0] - 0.5).abs() < 1e-6);
        assert!((moments.mean[1] - 1.5).abs() < 1e-6);
        assert!((moments.mean[2] - 1.0).abs() < 1e-6);
        assert!((moments.mean[3] - 2.0).abs() < 1e-6);

        // population sd of [x, 0] is x / 2
        assert!((moments.sd[3] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_columns_seen() {
        let stat = SparseRunningStatistics::<f64>::new(2);
        let moments = stat.to_moments();
        assert_eq!(moments.ncols, 0);
        assert_eq!(moments.mean, vec![0.0, 0.0]);
        assert_eq!(moments.sd, vec![1.0, 1.0]);
        assert_eq!(moments.zero_variance, vec![true, true]);
        assert!(moments.mean.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_moments_worked_example() {
        // [2, 0, 4]
        // [0, 0, 0]
        let values = [2.0, 4.0];
        let rows = [0, 0];
        let ptr = [0, 1, 1, 2];
        let view = CscView::new(2, 3, &values, &rows, &ptr).unwrap();

        let mut stat = SparseRunningStatistics::<f64>::new(2);
        stat.add_view(&view);
        let moments = stat.to_moments();

        assert_eq!(moments.ncols, 3);
        assert_eq!(moments.nnz, vec![2, 0]);
        assert_eq!(moments.sum, vec![6.0, 0.0]);
        assert_eq!(moments.sum_sq, vec![20.0, 0.0]);
        assert!((moments.mean[0] - 2.0).abs() < 1e-12);
        assert!((moments.sd[0] - (8.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(!moments.zero_variance[0]);

        assert_eq!(moments.mean[1], 0.0);
        assert_eq!(moments.sd[1], 1.0);
        assert!(moments.zero_variance[1]);
        assert_eq!(moments.raw_sd(1), 0.0);
        assert_eq!(moments.standardized_zero(1), 0.0);
    }

    #[test]
    fn test_constant_row_guard() {
        // a row of [5, 5, 5] has zero variance up to rounding
        let mut stat = SparseRunningStatistics::<f64>::new(1);
        for _ in 0..3 {
            stat.add_sparse_column(&[0], &[5.0]);
        }
        let moments = stat.to_moments();
        assert_eq!(moments.mean[0], 5.0);
        assert_eq!(moments.sd[0], 1.0);
        assert!(moments.zero_variance[0]);
        assert_eq!(moments.standardize(0, 5.0), 0.0);
    }

    #[test]
    fn test_negative_variance_is_clamped() {
        // [0.1, 0.1, 0.1]: s2/n - mean^2 rounds below zero
        let mut stat = SparseRunningStatistics::<f64>::new(1);
        for _ in 0..3 {
            stat.add_sparse_column(&[0], &[0.1]);
        }

        let (_, variance) = stat.raw_mean_variance().unwrap();
        assert!(variance[0] < 0.0);

        let moments = stat.to_moments();
        assert!(moments.zero_variance[0]);
        assert_eq!(moments.sd[0], 1.0);
        assert_eq!(moments.raw_sd(0), 0.0);
        assert!(moments.standardize(0, 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_merge_partial_statistics() {
        let mut left = SparseRunningStatistics::<f64>::new(2);
        left.add_sparse_column(&[0, 1], &[1.0, 2.0]);

        let mut right = SparseRunningStatistics::<f64>::new(2);
        right.add_sparse_column(&[0], &[3.0]);
        right.add_sparse_column(&[], &[]);

        left.merge(&right);

        assert_eq!(left.ncols_processed(), 3);
        let moments = left.to_moments();
        assert_eq!(moments.sum, vec![4.0, 2.0]);
        assert_eq!(moments.nnz, vec![2, 1]);
        assert!((moments.mean[0] - 4.0 / 3.0).abs() < 1e-12);
        assert!((moments.mean[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stat_lines() -> anyhow::Result<()> {
        let mut stat = SparseRunningStatistics::<f64>::new(2);
        stat.add_sparse_column(&[0], &[2.0]);
        stat.add_sparse_column(&[], &[]);
        let moments = stat.to_moments();

        let names: Vec<Box<str>> = vec!["a".into(), "b".into()];
        let lines = moments.to_string_vec(Some(&names), "\t")?;
        assert_eq!(lines[0].as_ref(), "a\t1\t2\t1\t1");
        assert_eq!(lines[1].as_ref(), "b\t0\t0\t0\t0");

        let lines = moments.to_string_vec(None, ",")?;
        assert_eq!(lines[1].as_ref(), "1,0,0,0,0");

        assert!(moments.to_string_vec(Some(&names[..1]), "\t").is_err());
        Ok(())
    }
}
