use crate::sparse_scale::ZeroFill;
use crate::sparse_stat::RowMoments;

/// Row-wise standardization of a sparse matrix into a dense one
pub trait SparseScaleOps {
    type Scalar;
    type Mat;

    /// Per-row mean and standard deviation over all columns
    fn row_moments(&self) -> anyhow::Result<RowMoments<Self::Scalar>>;

    /// Standardize every row over all of its columns and return the
    /// dense result transposed, `ncols x nrows`
    fn row_scale_dense(&self, zero_fill: ZeroFill) -> anyhow::Result<Self::Mat>;

    /// Same as `row_scale_dense` with explicit occupancy, on the rayon pool
    fn par_row_scale_dense(&self) -> anyhow::Result<Self::Mat>;
}

/// Read and write dense matrices from and to delimited text files
pub trait IoOps {
    type Scalar;
    type Mat;

    fn read_file_delim(
        file: &str,
        delim: &str,
        skip: Option<usize>,
    ) -> anyhow::Result<Self::Mat>;

    fn from_tsv(tsv_file: &str, skip: Option<usize>) -> anyhow::Result<Self::Mat> {
        Self::read_file_delim(tsv_file, "\t", skip)
    }

    /// Write with an optional header line of column names and an
    /// optional leading column of row names
    fn write_file_delim_with_names(
        &self,
        file: &str,
        delim: &str,
        row_names: Option<&[Box<str>]>,
        column_names: Option<&[Box<str>]>,
    ) -> anyhow::Result<()>;

    fn write_file_delim(&self, file: &str, delim: &str) -> anyhow::Result<()> {
        self.write_file_delim_with_names(file, delim, None, None)
    }

    fn to_tsv(&self, tsv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(tsv_file, "\t")
    }

    fn to_csv(&self, csv_file: &str) -> anyhow::Result<()> {
        self.write_file_delim(csv_file, ",")
    }
}
