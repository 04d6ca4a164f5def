//! Sobel gradients and the Canny-style reference edge detector.
//!
//! The reference detector runs the full chain: Gaussian smoothing, Sobel
//! gradients, non-maximum suppression, and double-threshold hysteresis.
//! `sobel_magnitude` is the plain gradient-magnitude detector the
//! accelerated path implements; it is kept here so the two algorithms can
//! be compared on the CPU as well.

use rayon::prelude::*;

use super::convolve::{convolve_cols_f32, convolve_rows_f32, gaussian_kernel_1d};
use super::PARALLEL_THRESHOLD;

/// Smoothing applied before gradient computation: a 5-tap Gaussian.
const SMOOTH_HALF_WIDTH: usize = 2;
const SMOOTH_SIGMA: f32 = 1.4;

/// Hysteresis thresholds on the suppressed gradient magnitude.
const LOW_THRESHOLD: f32 = 50.0;
const HIGH_THRESHOLD: f32 = 150.0;

/// Intensity written for edge pixels; non-edges are 0.
const EDGE_VALUE: u8 = 255;

/// Sobel gradient magnitude, saturated to [0, 255]. Clamp-to-edge
/// sampling, so border pixels are defined.
pub fn sobel_magnitude(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(src.len(), width * height);
    let src_f: Vec<f32> = src.iter().map(|&v| v as f32).collect();
    let (gx, gy) = sobel_gradients(&src_f, width, height);
    let mut out = vec![0u8; width * height];

    let fill_row = |y: usize, row: &mut [u8]| {
        for x in 0..width {
            let i = y * width + x;
            let mag = (gx[i] * gx[i] + gy[i] * gy[i]).sqrt();
            row[x] = mag.clamp(0.0, 255.0).round() as u8;
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

/// Canny-style edge detection: smoothing, gradients, non-maximum
/// suppression, and hysteresis. Edge pixels are 255, everything else 0.
/// Images too small to hold an interior (under 3x3) come back all zero.
pub fn canny_edges(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(src.len(), width * height);
    if width < 3 || height < 3 {
        return vec![0u8; width * height];
    }

    let kernel = gaussian_kernel_1d(SMOOTH_HALF_WIDTH, SMOOTH_SIGMA);
    let src_f: Vec<f32> = src.iter().map(|&v| v as f32).collect();
    let smoothed = convolve_cols_f32(
        &convolve_rows_f32(&src_f, width, height, &kernel),
        width,
        height,
        &kernel,
    );

    let (gx, gy) = sobel_gradients(&smoothed, width, height);
    let mag: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(a, b)| (a * a + b * b).sqrt())
        .collect();

    let suppressed = non_maximum_suppression(&mag, &gx, &gy, width, height);
    hysteresis(&suppressed, width, height)
}

/// Sobel x/y gradients with clamp-to-edge sampling.
fn sobel_gradients(src: &[f32], width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let mut gx = vec![0.0f32; width * height];
    let mut gy = vec![0.0f32; width * height];

    let fill_row = |y: usize, (gx_row, gy_row): (&mut [f32], &mut [f32])| {
        let ym = y.saturating_sub(1);
        let yp = (y + 1).min(height - 1);
        for x in 0..width {
            let xm = x.saturating_sub(1);
            let xp = (x + 1).min(width - 1);

            let a = src[ym * width + xm];
            let b = src[ym * width + x];
            let c = src[ym * width + xp];
            let d = src[y * width + xm];
            let f = src[y * width + xp];
            let g = src[yp * width + xm];
            let h = src[yp * width + x];
            let i = src[yp * width + xp];

            gx_row[x] = (c + 2.0 * f + i) - (a + 2.0 * d + g);
            gy_row[x] = (g + 2.0 * h + i) - (a + 2.0 * b + c);
        }
    };

    if width * height >= PARALLEL_THRESHOLD {
        gx.par_chunks_mut(width)
            .zip(gy.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, rows)| fill_row(y, rows));
    } else {
        gx.chunks_mut(width)
            .zip(gy.chunks_mut(width))
            .enumerate()
            .for_each(|(y, rows)| fill_row(y, rows));
    }
    (gx, gy)
}

/// Keep only pixels that are local maxima along their gradient direction.
/// Ties are kept, so plateau edges survive. The one-pixel border is
/// cleared; an image boundary is not an edge.
fn non_maximum_suppression(
    mag: &[f32],
    gx: &[f32],
    gy: &[f32],
    width: usize,
    height: usize,
) -> Vec<f32> {
    let mut out = vec![0.0f32; width * height];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y * width + x;
            let m = mag[i];
            if m <= 0.0 {
                continue;
            }

            let mut angle = gy[i].atan2(gx[i]).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            // Quantize the gradient direction into one of four sectors and
            // compare against the two neighbors along it.
            let (n1, n2) = if !(22.5..157.5).contains(&angle) {
                (i - 1, i + 1)
            } else if angle < 67.5 {
                (i - width + 1, i + width - 1)
            } else if angle < 112.5 {
                (i - width, i + width)
            } else {
                (i - width - 1, i + width + 1)
            };

            if m >= mag[n1] && m >= mag[n2] {
                out[i] = m;
            }
        }
    }
    out
}

/// Double threshold with connectivity: strong pixels seed edges, weak
/// pixels join only when 8-connected to an already-accepted pixel.
fn hysteresis(suppressed: &[f32], width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    let mut stack: Vec<usize> = Vec::new();

    for (i, &m) in suppressed.iter().enumerate() {
        if m >= HIGH_THRESHOLD {
            out[i] = EDGE_VALUE;
            stack.push(i);
        }
    }

    while let Some(i) = stack.pop() {
        let x = (i % width) as isize;
        let y = (i / width) as isize;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let ni = ny as usize * width + nx as usize;
                if out[ni] == 0 && suppressed[ni] >= LOW_THRESHOLD {
                    out[ni] = EDGE_VALUE;
                    stack.push(ni);
                }
            }
        }
    }
    out
}
