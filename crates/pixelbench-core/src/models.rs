//! Request, result, and parameter types shared by the engine and the bridge.

use std::fmt;

use serde::Serialize;

use crate::error::ProcessError;
use crate::frame::FrameBuffer;

/// Which execution strategy a request is routed to. The engine never
/// switches paths mid-call and never falls back from one to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Synchronous CPU baseline, assumed correct.
    Reference,
    /// GPU compute path with its own memory layout and scheduling.
    Accelerated,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Reference => write!(f, "reference"),
            PathKind::Accelerated => write!(f, "accelerated"),
        }
    }
}

/// A square convolution filter: odd size, `size * size` coefficients in
/// row-major order. Validated at construction so downstream code can rely
/// on the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    size: u32,
    coefficients: Vec<f32>,
}

impl FilterSpec {
    pub fn new(size: u32, coefficients: Vec<f32>) -> Result<Self, ProcessError> {
        if size == 0 || size % 2 == 0 {
            return Err(ProcessError::InvalidRequest(format!(
                "filter size must be odd and positive, got {}",
                size
            )));
        }
        let expected = (size * size) as usize;
        if coefficients.len() != expected {
            return Err(ProcessError::InvalidRequest(format!(
                "filter has {} coefficients, expected {} for size {}",
                coefficients.len(),
                expected,
                size
            )));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProcessError::InvalidRequest(
                "filter coefficients must be finite".to_string(),
            ));
        }
        Ok(Self { size, coefficients })
    }

    /// Classic 3x3 sharpening kernel.
    pub fn sharpen() -> Self {
        Self {
            size: 3,
            coefficients: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    /// Normalized box filter of the given odd size.
    pub fn box_filter(size: u32) -> Result<Self, ProcessError> {
        let count = (size as usize).checked_mul(size as usize).unwrap_or(0);
        let weight = 1.0 / count as f32;
        Self::new(size, vec![weight; count])
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }
}

/// One image processing operation with its parameters.
#[derive(Debug, Clone)]
pub enum Operation {
    Grayscale,
    EdgeDetect,
    Convolve(FilterSpec),
    GaussianBlur { sigma: f32 },
}

impl Operation {
    /// Short identifier used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Grayscale => "grayscale",
            Operation::EdgeDetect => "edge_detect",
            Operation::Convolve(_) => "convolve",
            Operation::GaussianBlur { .. } => "gaussian_blur",
        }
    }

    /// Check operation parameters. `FilterSpec` is already validated at
    /// construction; only the blur sigma can arrive inconsistent.
    pub fn validate(&self) -> Result<(), ProcessError> {
        if let Operation::GaussianBlur { sigma } = self {
            if !sigma.is_finite() || *sigma <= 0.0 {
                return Err(ProcessError::InvalidRequest(format!(
                    "blur sigma must be positive and finite, got {}",
                    sigma
                )));
            }
        }
        Ok(())
    }
}

/// A single processing request. Request-scoped: built at call entry,
/// discarded at call return.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub input: FrameBuffer,
    pub operation: Operation,
    pub path: PathKind,
}

/// Output frame plus the wall-clock time of the path invocation alone
/// (conversion overhead outside the path is not included).
#[derive(Debug)]
pub struct ProcessingResult {
    pub output: FrameBuffer,
    pub elapsed_ms: f64,
}

impl ProcessingResult {
    /// Frames per second this call corresponds to. Undefined (None) when
    /// the elapsed time is not positive.
    pub fn fps(&self) -> Option<f64> {
        if self.elapsed_ms > 0.0 {
            Some(1000.0 / self.elapsed_ms)
        } else {
            None
        }
    }
}

/// Aggregate timings from one benchmark run: equal iteration counts on
/// each path, measured in independent sessions.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub iterations: u32,
    pub reference_total_ms: f64,
    pub accelerated_total_ms: f64,
}

impl BenchmarkResult {
    /// Reference total over accelerated total. Undefined (None) for zero
    /// iterations or a non-positive accelerated total; never 0/0.
    pub fn speedup(&self) -> Option<f64> {
        if self.iterations > 0 && self.accelerated_total_ms > 0.0 {
            Some(self.reference_total_ms / self.accelerated_total_ms)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_spec_rejects_even_size() {
        assert!(FilterSpec::new(2, vec![0.25; 4]).is_err());
    }

    #[test]
    fn filter_spec_rejects_count_mismatch() {
        assert!(FilterSpec::new(3, vec![1.0; 8]).is_err());
    }

    #[test]
    fn filter_spec_rejects_nan() {
        assert!(FilterSpec::new(1, vec![f32::NAN]).is_err());
    }

    #[test]
    fn box_filter_sums_to_one() {
        let spec = FilterSpec::box_filter(5).unwrap();
        let sum: f32 = spec.coefficients().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blur_sigma_validation() {
        assert!(Operation::GaussianBlur { sigma: 1.5 }.validate().is_ok());
        assert!(Operation::GaussianBlur { sigma: 0.0 }.validate().is_err());
        assert!(Operation::GaussianBlur { sigma: -2.0 }.validate().is_err());
        assert!(Operation::GaussianBlur { sigma: f32::NAN }.validate().is_err());
    }

    #[test]
    fn fps_undefined_for_zero_elapsed() {
        let frame = FrameBuffer::filled(2, 2, crate::frame::PixelLayout::Gray, 0).unwrap();
        let result = ProcessingResult {
            output: frame,
            elapsed_ms: 0.0,
        };
        assert!(result.fps().is_none());
    }

    #[test]
    fn speedup_undefined_for_zero_iterations() {
        let result = BenchmarkResult {
            iterations: 0,
            reference_total_ms: 0.0,
            accelerated_total_ms: 0.0,
        };
        assert!(result.speedup().is_none());
    }

    #[test]
    fn speedup_ratio() {
        let result = BenchmarkResult {
            iterations: 4,
            reference_total_ms: 100.0,
            accelerated_total_ms: 25.0,
        };
        assert_eq!(result.speedup(), Some(4.0));
    }
}
