pub mod common_io; // plain or gzipped text files
pub mod csc_view; // validated column-compressed input
pub mod dmatrix_io; // dense matrix output
pub mod mtx_io; // matrix market triplets
pub mod simulate; // random sparse count data
pub mod sparse_scale; // row standardization into dense output
pub mod sparse_stat; // row moments over implicit zeros
pub mod traits;
