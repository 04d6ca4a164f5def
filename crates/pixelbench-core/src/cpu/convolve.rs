//! Dense and separable convolution over single-channel buffers.
//!
//! Border handling is clamp-to-edge throughout: when the kernel window
//! extends past the image boundary, the nearest edge pixel is sampled.
//! Accumulation is f32; output is saturated to the 8-bit range only at the
//! final step, so separable passes lose no precision in between.

use rayon::prelude::*;

use super::PARALLEL_THRESHOLD;

/// Generate a 1D Gaussian kernel of length `2 * half_size + 1`, normalized
/// so the coefficients sum to 1.
pub fn gaussian_kernel_1d(half_size: usize, sigma: f32) -> Vec<f32> {
    debug_assert!(sigma > 0.0, "sigma must be positive, got {}", sigma);
    let len = 2 * half_size + 1;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..len)
        .map(|i| {
            let x = i as f32 - half_size as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Dense 2D convolution with a square kernel of odd side `ksize`,
/// coefficients in row-major order. No normalization is applied; the
/// result saturates to [0, 255].
pub fn convolve_2d(src: &[u8], width: usize, height: usize, kernel: &[f32], ksize: usize) -> Vec<u8> {
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(kernel.len(), ksize * ksize);
    debug_assert_eq!(ksize % 2, 1);

    let half = (ksize / 2) as isize;
    let mut out = vec![0u8; width * height];

    let fill_row = |y: usize, row: &mut [u8]| {
        for x in 0..width {
            let mut acc = 0.0f32;
            let mut ki = 0;
            for ky in -half..=half {
                let sy = (y as isize + ky).clamp(0, height as isize - 1) as usize;
                for kx in -half..=half {
                    let sx = (x as isize + kx).clamp(0, width as isize - 1) as usize;
                    acc += src[sy * width + sx] as f32 * kernel[ki];
                    ki += 1;
                }
            }
            row[x] = acc.clamp(0.0, 255.0).round() as u8;
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    } else {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    }
    out
}

/// Separable convolution: horizontal pass with `kernel`, then vertical
/// pass with the same kernel. Saturates to [0, 255] after the second pass.
pub fn convolve_separable(src: &[u8], width: usize, height: usize, kernel: &[f32]) -> Vec<u8> {
    let src_f: Vec<f32> = src.iter().map(|&v| v as f32).collect();
    let mid = convolve_rows_f32(&src_f, width, height, kernel);
    let out_f = convolve_cols_f32(&mid, width, height, kernel);
    out_f
        .into_iter()
        .map(|v| v.clamp(0.0, 255.0).round() as u8)
        .collect()
}

/// Horizontal 1D pass over an f32 plane. Exposed within the crate for the
/// edge detector, which needs the unquantized smoothed plane.
pub(crate) fn convolve_rows_f32(
    src: &[f32],
    width: usize,
    height: usize,
    kernel: &[f32],
) -> Vec<f32> {
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(kernel.len() % 2, 1);

    let half = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f32; width * height];

    let fill_row = |y: usize, row: &mut [f32]| {
        let src_row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + ki as isize - half).clamp(0, width as isize - 1) as usize;
                acc += src_row[sx] * kv;
            }
            row[x] = acc;
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    } else {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    }
    out
}

/// Vertical 1D pass over an f32 plane.
pub(crate) fn convolve_cols_f32(
    src: &[f32],
    width: usize,
    height: usize,
    kernel: &[f32],
) -> Vec<f32> {
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(kernel.len() % 2, 1);

    let half = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f32; width * height];

    let fill_row = |y: usize, row: &mut [f32]| {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = (y as isize + ki as isize - half).clamp(0, height as isize - 1) as usize;
                acc += src[sy * width + x] * kv;
            }
            row[x] = acc;
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    } else {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(y, row));
    }
    out
}
