use crate::common_io::{open_buf_writer, read_lines_of_types};
use crate::traits::IoOps;
pub use nalgebra::DMatrix;
use std::fmt::{Debug, Display};
use std::io::Write;
use std::str::FromStr;

impl<T> IoOps for DMatrix<T>
where
    T: nalgebra::Scalar + Send + FromStr + Display + Copy,
    <T as FromStr>::Err: Debug,
{
    type Scalar = T;
    type Mat = Self;

    fn read_file_delim(
        tsv_file: &str,
        delim: &str,
        skip: Option<usize>,
    ) -> anyhow::Result<Self::Mat> {
        let hdr_line = match skip {
            Some(skip) => skip as i64,
            None => -1, // no skipping
        };

        let data = read_lines_of_types::<T>(tsv_file, delim, hdr_line)?.lines;

        if data.is_empty() {
            return Err(anyhow::anyhow!("No data in file {}", tsv_file));
        }

        let ncols = data[0].len();
        let nrows = data.len();

        if let Some(i) = data.iter().position(|x| x.len() != ncols) {
            return Err(anyhow::anyhow!(
                "line {} has {} fields, expected {}",
                i,
                data[i].len(),
                ncols
            ));
        }

        let data = data.into_iter().flatten().collect::<Vec<_>>();

        Ok(DMatrix::<T>::from_row_iterator(nrows, ncols, data))
    }

    fn write_file_delim_with_names(
        &self,
        file: &str,
        delim: &str,
        row_names: Option<&[Box<str>]>,
        column_names: Option<&[Box<str>]>,
    ) -> anyhow::Result<()> {
        let (nrows, ncols) = self.shape();

        if let Some(names) = row_names {
            if names.len() != nrows {
                anyhow::bail!("{} row names for {} rows", names.len(), nrows);
            }
        }

        if let Some(names) = column_names {
            if names.len() != ncols {
                anyhow::bail!("{} column names for {} columns", names.len(), ncols);
            }
        }

        let mut buf = open_buf_writer(file)?;

        if let Some(names) = column_names {
            let mut hdr = names.join(delim);
            if row_names.is_some() {
                hdr.insert_str(0, delim);
            }
            writeln!(buf, "{}", hdr)?;
        }

        // one row at a time; the matrix is column-major
        for (i, row) in self.row_iter().enumerate() {
            let mut line = row
                .iter()
                .map(|x| format!("{}", *x))
                .collect::<Vec<String>>()
                .join(delim);

            if let Some(names) = row_names {
                line.insert_str(0, delim);
                line.insert_str(0, &names[i]);
            }

            writeln!(buf, "{}", line)?;
        }

        buf.flush()?;
        Ok(())
    }
}
