use nalgebra_sparse::CscMatrix;
use std::fmt;

/// Reasons a column-compressed input is rejected before any pass runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CscError {
    /// `nrows <= 0` or `ncols <= 0`
    InvalidDimensions { nrows: i64, ncols: i64 },
    /// column pointers disagree with the dimensions or the value array
    MalformedColumnPointer(Box<str>),
    /// a row index falls outside `[0, nrows)`
    RowIndexOutOfRange { position: usize, row: i64, nrows: usize },
}

impl fmt::Display for CscError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CscError::InvalidDimensions { nrows, ncols } => {
                write!(f, "invalid dimensions: {} x {}", nrows, ncols)
            }
            CscError::MalformedColumnPointer(msg) => {
                write!(f, "malformed column pointer: {}", msg)
            }
            CscError::RowIndexOutOfRange {
                position,
                row,
                nrows,
            } => write!(
                f,
                "row index {} at position {} is outside [0, {})",
                row, position, nrows
            ),
        }
    }
}

impl std::error::Error for CscError {}

fn malformed(msg: String) -> CscError {
    CscError::MalformedColumnPointer(msg.into_boxed_str())
}

fn to_i64(x: usize) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

/// A read-only, validated view of a column-compressed sparse matrix.
///
/// Column `c` holds `values[col_offsets[c]..col_offsets[c + 1]]` with
/// the matching zero-based rows in `row_indices`. Every other cell is
/// an implicit zero.
///
/// A `CscView` can only be obtained through validation, so the passes
/// that consume it never see malformed input.
#[derive(Debug, Clone, Copy)]
pub struct CscView<'a, T> {
    nrows: usize,
    ncols: usize,
    values: &'a [T],
    row_indices: &'a [usize],
    col_offsets: &'a [usize],
}

impl<'a, T> CscView<'a, T> {
    /// Validate the three arrays and wrap them
    ///
    /// # Arguments
    /// * `nrows` - number of rows (> 0)
    /// * `ncols` - number of columns (> 0)
    /// * `values` - stored values, column by column
    /// * `row_indices` - row of each stored value
    /// * `col_offsets` - `ncols + 1` offsets into `values`
    ///
    pub fn new(
        nrows: usize,
        ncols: usize,
        values: &'a [T],
        row_indices: &'a [usize],
        col_offsets: &'a [usize],
    ) -> Result<Self, CscError> {
        if nrows == 0 || ncols == 0 {
            return Err(CscError::InvalidDimensions {
                nrows: to_i64(nrows),
                ncols: to_i64(ncols),
            });
        }

        if col_offsets.len() != ncols + 1 {
            return Err(malformed(format!(
                "expected {} entries, found {}",
                ncols + 1,
                col_offsets.len()
            )));
        }

        if col_offsets[0] != 0 {
            return Err(malformed(format!(
                "first entry must be 0, found {}",
                col_offsets[0]
            )));
        }

        if let Some(c) = col_offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(malformed(format!(
                "decreasing at column {}: {} > {}",
                c,
                col_offsets[c],
                col_offsets[c + 1]
            )));
        }

        let nnz = values.len();
        if col_offsets[ncols] != nnz {
            return Err(malformed(format!(
                "last entry {} does not match {} stored values",
                col_offsets[ncols], nnz
            )));
        }

        if row_indices.len() != nnz {
            return Err(malformed(format!(
                "{} row indices for {} stored values",
                row_indices.len(),
                nnz
            )));
        }

        if let Some(position) = row_indices.iter().position(|&r| r >= nrows) {
            return Err(CscError::RowIndexOutOfRange {
                position,
                row: to_i64(row_indices[position]),
                nrows,
            });
        }

        Ok(CscView {
            nrows,
            ncols,
            values,
            row_indices,
            col_offsets,
        })
    }

    /// Borrow the arrays of a `nalgebra_sparse::CscMatrix`
    pub fn from_csc(csc: &'a CscMatrix<T>) -> Result<Self, CscError> {
        Self::new(
            csc.nrows(),
            csc.ncols(),
            csc.values(),
            csc.row_indices(),
            csc.col_offsets(),
        )
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &'a [T] {
        self.values
    }

    pub fn row_indices(&self) -> &'a [usize] {
        self.row_indices
    }

    pub fn col_offsets(&self) -> &'a [usize] {
        self.col_offsets
    }

    /// Rows and values stored in column `col`
    pub fn column(&self, col: usize) -> (&'a [usize], &'a [T]) {
        let (lb, ub) = (self.col_offsets[col], self.col_offsets[col + 1]);
        (&self.row_indices[lb..ub], &self.values[lb..ub])
    }

    /// Visit columns left to right
    pub fn col_iter(&self) -> impl Iterator<Item = (&'a [usize], &'a [T])> + '_ {
        (0..self.ncols).map(move |c| self.column(c))
    }
}

/// Owned column-compressed arrays, validated on construction.
///
/// Foreign callers usually hand over signed integer arrays; this is
/// where negative dimensions, pointers and row indices are caught.
#[derive(Debug, Clone, PartialEq)]
pub struct CscParts<T> {
    nrows: usize,
    ncols: usize,
    values: Vec<T>,
    row_indices: Vec<usize>,
    col_offsets: Vec<usize>,
}

impl<T> CscParts<T> {
    /// Convert and validate signed arrays
    ///
    /// # Arguments
    /// * `nrows` - number of rows
    /// * `ncols` - number of columns
    /// * `values` - stored values
    /// * `row_index` - zero-based row of each stored value
    /// * `col_ptr` - `ncols + 1` column pointers
    ///
    pub fn from_signed<I>(
        nrows: I,
        ncols: I,
        values: Vec<T>,
        row_index: &[I],
        col_ptr: &[I],
    ) -> Result<Self, CscError>
    where
        I: Copy + Into<i64>,
    {
        let (nr, nc): (i64, i64) = (nrows.into(), ncols.into());
        if nr <= 0 || nc <= 0 {
            return Err(CscError::InvalidDimensions {
                nrows: nr,
                ncols: nc,
            });
        }
        let dims_err = || CscError::InvalidDimensions {
            nrows: nr,
            ncols: nc,
        };
        let nrows = usize::try_from(nr).map_err(|_| dims_err())?;
        let ncols = usize::try_from(nc).map_err(|_| dims_err())?;

        let col_offsets = col_ptr
            .iter()
            .enumerate()
            .map(|(c, &p)| {
                let p: i64 = p.into();
                usize::try_from(p)
                    .map_err(|_| malformed(format!("negative entry {} at column {}", p, c)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let row_indices = row_index
            .iter()
            .enumerate()
            .map(|(position, &r)| {
                let r: i64 = r.into();
                usize::try_from(r).map_err(|_| CscError::RowIndexOutOfRange {
                    position,
                    row: r,
                    nrows,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        CscView::new(nrows, ncols, &values, &row_indices, &col_offsets)?;

        Ok(CscParts {
            nrows,
            ncols,
            values,
            row_indices,
            col_offsets,
        })
    }

    pub fn view(&self) -> CscView<'_, T> {
        CscView {
            nrows: self.nrows,
            ncols: self.ncols,
            values: &self.values,
            row_indices: &self.row_indices,
            col_offsets: &self.col_offsets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_view() {
        // [2, 0, 4]
        // [0, 0, 0]
        let values = [2.0, 4.0];
        let rows = [0, 0];
        let ptr = [0, 1, 1, 2];
        let view = CscView::new(2, 3, &values, &rows, &ptr).unwrap();

        assert_eq!(view.nrows(), 2);
        assert_eq!(view.ncols(), 3);
        assert_eq!(view.nnz(), 2);
        let (rows_1, vals_1) = view.column(1);
        assert!(rows_1.is_empty() && vals_1.is_empty());

        let (rows_2, vals_2) = view.column(2);
        assert_eq!(rows_2, &[0]);
        assert_eq!(vals_2, &[4.0]);
        assert_eq!(view.col_iter().count(), 3);
    }

    #[test]
    fn test_invalid_dimensions() {
        let empty: [f64; 0] = [];
        let err = CscView::new(0, 3, &empty, &[], &[0, 0, 0, 0]).unwrap_err();
        assert_eq!(err, CscError::InvalidDimensions { nrows: 0, ncols: 3 });

        let err = CscParts::<f64>::from_signed(2_i32, -1, vec![], &[], &[0]).unwrap_err();
        assert_eq!(err, CscError::InvalidDimensions { nrows: 2, ncols: -1 });
    }

    #[test]
    fn test_malformed_column_pointer() {
        let values = [1.0, 2.0];
        let rows = [0, 1];

        // too short
        let err = CscView::new(2, 2, &values, &rows, &[0, 2]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));

        // does not start at zero
        let err = CscView::new(2, 2, &values, &rows, &[1, 1, 2]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));

        // decreasing
        let err = CscView::new(2, 2, &values, &rows, &[0, 2, 1]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));

        // end does not match the number of values
        let err = CscView::new(2, 2, &values, &rows, &[0, 1, 3]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));

        // row indices and values disagree
        let err = CscView::new(2, 2, &values, &[0], &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));

        // negative pointer
        let err =
            CscParts::from_signed(2_i32, 2, values.to_vec(), &[0, 1], &[0, -1, 2]).unwrap_err();
        assert!(matches!(err, CscError::MalformedColumnPointer(_)));
    }

    #[test]
    fn test_row_index_out_of_range() {
        let values = [1.0, 2.0];
        let err = CscView::new(2, 2, &values, &[0, 2], &[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            CscError::RowIndexOutOfRange {
                position: 1,
                row: 2,
                nrows: 2
            }
        );

        let err =
            CscParts::from_signed(2_i64, 2, values.to_vec(), &[-1, 0], &[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            CscError::RowIndexOutOfRange {
                position: 0,
                row: -1,
                nrows: 2
            }
        );
    }

    #[test]
    fn test_signed_parts_view() {
        let parts = CscParts::from_signed(3_i32, 2, vec![1.0, 5.0, 7.0], &[2, 0, 1], &[0, 1, 3])
            .unwrap();
        let view = parts.view();
        assert_eq!(view.nrows(), 3);
        let (rows, vals) = view.column(1);
        assert_eq!(rows, &[0, 1]);
        assert_eq!(vals, &[5.0, 7.0]);
    }

    #[test]
    fn test_from_csc() {
        use nalgebra_sparse::CooMatrix;

        let mut coo: CooMatrix<f64> = CooMatrix::new(3, 2);
        coo.push(0, 0, 1.0);
        coo.push(1, 1, 2.0);
        coo.push(2, 0, 3.0);
        let csc = CscMatrix::from(&coo);

        let view = CscView::from_csc(&csc).unwrap();
        assert_eq!(view.nnz(), 3);
        let (rows, vals) = view.column(0);
        assert_eq!(rows, &[0, 2]);
        assert_eq!(vals, &[1.0, 3.0]);
    }

    #[test]
    fn test_error_message() {
        let err = CscError::RowIndexOutOfRange {
            position: 4,
            row: 9,
            nrows: 3,
        };
        assert_eq!(
            err.to_string(),
            "row index 9 at position 4 is outside [0, 3)"
        );
    }
}
