#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

pub mod rigid;
/// Module to calculate the SVD of a 2x2 matrix
pub mod svd;
