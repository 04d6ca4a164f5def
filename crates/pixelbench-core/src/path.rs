//! Execution-path abstraction: one capability set, two strategies.
//!
//! The engine selects an implementation once per request and never switches
//! mid-call. Both strategies share the contract that the input is never
//! mutated and the output has the input's dimensions.

use crate::cpu;
use crate::error::ProcessError;
use crate::frame::{FrameBuffer, PixelLayout};
use crate::models::{FilterSpec, Operation};

/// The capability set both execution strategies implement.
pub trait ProcessingPath {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Reduce any layout to single-channel luminance; `Gray` input is
    /// copied unchanged.
    fn grayscale(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError>;

    /// Edge map of a single-channel frame.
    fn edge_detect(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError>;

    /// Dense 2D convolution of a single-channel frame.
    fn convolve(
        &self,
        input: &FrameBuffer,
        filter: &FilterSpec,
    ) -> Result<FrameBuffer, ProcessError>;

    /// Separable Gaussian blur of a single-channel frame.
    fn gaussian_blur(&self, input: &FrameBuffer, sigma: f32) -> Result<FrameBuffer, ProcessError>;

    /// Dispatch one operation to the matching capability.
    fn run(
        &self,
        operation: &Operation,
        input: &FrameBuffer,
    ) -> Result<FrameBuffer, ProcessError> {
        match operation {
            Operation::Grayscale => self.grayscale(input),
            Operation::EdgeDetect => self.edge_detect(input),
            Operation::Convolve(filter) => self.convolve(input, filter),
            Operation::GaussianBlur { sigma } => self.gaussian_blur(input, *sigma),
        }
    }
}

/// Half-width of the blur kernel derived from sigma. Three standard
/// deviations cover the Gaussian's significant mass.
pub(crate) fn blur_half_width(sigma: f32) -> usize {
    ((3.0 * sigma).ceil() as usize).max(1)
}

/// Synchronous reference implementation backed by the CPU kernels.
pub struct CpuPath;

impl ProcessingPath for CpuPath {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn grayscale(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError> {
        Ok(input.to_canonical())
    }

    fn edge_detect(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError> {
        let out = cpu::canny_edges(
            input.data(),
            input.width() as usize,
            input.height() as usize,
        );
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, out)
    }

    fn convolve(
        &self,
        input: &FrameBuffer,
        filter: &FilterSpec,
    ) -> Result<FrameBuffer, ProcessError> {
        let out = cpu::convolve_2d(
            input.data(),
            input.width() as usize,
            input.height() as usize,
            filter.coefficients(),
            filter.size() as usize,
        );
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, out)
    }

    fn gaussian_blur(&self, input: &FrameBuffer, sigma: f32) -> Result<FrameBuffer, ProcessError> {
        let kernel = cpu::gaussian_kernel_1d(blur_half_width(sigma), sigma);
        let out = cpu::convolve_separable(
            input.data(),
            input.width() as usize,
            input.height() as usize,
            &kernel,
        );
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_grayscale_copies_single_channel() {
        let input = FrameBuffer::filled(4, 4, PixelLayout::Gray, 10).unwrap();
        let out = CpuPath.grayscale(&input).unwrap();
        assert_eq!(out.data(), input.data());
    }

    #[test]
    fn cpu_ops_preserve_dimensions() {
        let input = FrameBuffer::filled(9, 7, PixelLayout::Gray, 50).unwrap();
        let ops = [
            Operation::Grayscale,
            Operation::EdgeDetect,
            Operation::Convolve(FilterSpec::sharpen()),
            Operation::GaussianBlur { sigma: 1.2 },
        ];
        for op in &ops {
            let out = CpuPath.run(op, &input).unwrap();
            assert_eq!(out.width(), 9, "{}", op.name());
            assert_eq!(out.height(), 7, "{}", op.name());
        }
    }

    #[test]
    fn cpu_ops_do_not_mutate_input() {
        let input = FrameBuffer::filled(8, 8, PixelLayout::Gray, 77).unwrap();
        let before = input.data().to_vec();
        let _ = CpuPath.edge_detect(&input).unwrap();
        let _ = CpuPath.gaussian_blur(&input, 2.0).unwrap();
        assert_eq!(input.data(), &before[..]);
    }

    #[test]
    fn blur_half_width_grows_with_sigma() {
        assert_eq!(blur_half_width(0.3), 1);
        assert_eq!(blur_half_width(1.0), 3);
        assert_eq!(blur_half_width(1.4), 5);
    }
}
