//! CPU reference implementations of the processing kernels.
//!
//! These are the baseline the accelerated path is measured against. The
//! row loops switch to rayon once an image crosses `PARALLEL_THRESHOLD`
//! pixels; below that the sequential version is faster than the fork/join
//! overhead.

mod convolve;
mod edges;

pub use convolve::{convolve_2d, convolve_separable, gaussian_kernel_1d};
pub use edges::{canny_edges, sobel_magnitude};

/// Minimum pixel count before the row loops parallelize.
pub(crate) const PARALLEL_THRESHOLD: usize = 64 * 64;
