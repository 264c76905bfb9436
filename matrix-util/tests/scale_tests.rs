use approx::assert_abs_diff_eq;
use matrix_util::common_io::create_temp_dir_file;
use matrix_util::csc_view::CscError;
use matrix_util::mtx_io::{read_mtx_csc, write_mtx_triplets};
use matrix_util::simulate::{generate_sparse_counts, SimArgs};
use matrix_util::sparse_scale::{row_scale_sparse, ZeroFill};
use matrix_util::traits::{IoOps, SparseScaleOps};

#[test]
fn worked_example_from_signed_arrays() {
    // [2, 0, 4]
    // [0, 0, 0]
    let out = row_scale_sparse(2_i32, 3, vec![2.0, 4.0], &[0, 0], &[0, 1, 1, 2]).unwrap();

    assert_eq!(out.shape(), (3, 2));
    let expected = nalgebra::DMatrix::<f64>::from_row_slice(
        3,
        2,
        &[0.0, 0.0, -1.224744871391589, 0.0, 1.224744871391589, 0.0],
    );
    assert_abs_diff_eq!(out, expected, epsilon = 1e-12);
}

#[test]
fn malformed_input_is_rejected_before_any_pass() {
    let err = row_scale_sparse(-2_i64, 3, vec![], &[], &[0, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, CscError::InvalidDimensions { .. }));

    let err = row_scale_sparse(2_i64, 3, vec![1.0], &[0], &[0, 0, 0, 2]).unwrap_err();
    assert!(matches!(err, CscError::MalformedColumnPointer(_)));

    let err = row_scale_sparse(2_i64, 1, vec![1.0], &[3], &[0, 1]).unwrap_err();
    assert!(matches!(err, CscError::RowIndexOutOfRange { .. }));
}

#[test]
fn simulated_mtx_to_standardized_tsv() -> anyhow::Result<()> {
    let (nrows, ncols) = (30, 40);
    let args = SimArgs {
        rows: nrows,
        cols: ncols,
        mean: 0.7,
        overdisp: 1.5,
        rseed: 11,
    };
    let triplets = generate_sparse_counts(&args)?;

    let mtx_file = create_temp_dir_file("mtx.gz")?;
    let mtx_file = mtx_file.to_str().ok_or(anyhow::anyhow!("path"))?;
    write_mtx_triplets(&triplets, nrows, ncols, mtx_file)?;

    let csc = read_mtx_csc(mtx_file)?;
    assert_eq!(csc.nnz(), triplets.len());

    let moments = csc.row_moments()?;
    let out = csc.row_scale_dense(ZeroFill::Occupancy)?;
    assert_eq!(out.shape(), (ncols, nrows));

    for r in 0..nrows {
        let z = out.column(r);
        let n = ncols as f64;
        assert_abs_diff_eq!(z.sum() / n, 0.0, epsilon = 1e-9);
        if moments.zero_variance[r] {
            assert!(z.iter().all(|&x| x == 0.0));
        } else {
            assert_abs_diff_eq!(z.dot(&z) / n, 1.0, epsilon = 1e-9);
        }
    }

    let par = csc.par_row_scale_dense()?;
    assert_abs_diff_eq!(out, par, epsilon = 1e-12);

    let tsv_file = create_temp_dir_file("tsv.gz")?;
    let tsv_file = tsv_file.to_str().ok_or(anyhow::anyhow!("path"))?;
    out.to_tsv(tsv_file)?;

    let back = nalgebra::DMatrix::<f64>::from_tsv(tsv_file, None)?;
    assert_eq!(out, back);

    Ok(())
}
