//! Processing engine: request validation, path selection, and timing.

use std::time::Instant;

use crate::error::ProcessError;
use crate::frame::PixelLayout;
use crate::models::{Operation, PathKind, ProcessingRequest, ProcessingResult};
use crate::path::{CpuPath, ProcessingPath};

#[cfg(feature = "gpu")]
use crate::gpu::GpuPath;

/// Routes a processing request to the reference or accelerated path and
/// measures the path invocation alone.
///
/// The accelerated path is attached at construction or not at all; a
/// request selecting it on an engine without one fails with
/// `PathUnavailable` rather than silently running the reference path,
/// since a substituted path would invalidate any timing comparison.
pub struct ProcessingEngine {
    reference: CpuPath,
    #[cfg(feature = "gpu")]
    accelerated: Option<GpuPath>,
}

impl ProcessingEngine {
    /// Build an engine with the reference path and, when the `gpu` feature
    /// is enabled and an adapter is present, the accelerated path. A failed
    /// GPU setup degrades to a CPU-only engine and is logged.
    pub fn new() -> Self {
        #[cfg(feature = "gpu")]
        let accelerated = match GpuPath::new() {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("accelerated path unavailable: {}", e);
                None
            }
        };
        Self {
            reference: CpuPath,
            #[cfg(feature = "gpu")]
            accelerated,
        }
    }

    /// An engine with no accelerated path. Never probes the GPU; used by
    /// tests and by callers that only want the baseline.
    pub fn cpu_only() -> Self {
        Self {
            reference: CpuPath,
            #[cfg(feature = "gpu")]
            accelerated: None,
        }
    }

    /// Whether a request may select the accelerated path on this engine.
    pub fn has_accelerated(&self) -> bool {
        #[cfg(feature = "gpu")]
        {
            self.accelerated.is_some()
        }
        #[cfg(not(feature = "gpu"))]
        {
            false
        }
    }

    fn path_for(&self, kind: PathKind) -> Result<&dyn ProcessingPath, ProcessError> {
        match kind {
            PathKind::Reference => Ok(&self.reference),
            PathKind::Accelerated => {
                #[cfg(feature = "gpu")]
                if let Some(ref path) = self.accelerated {
                    return Ok(path);
                }
                Err(ProcessError::PathUnavailable(PathKind::Accelerated))
            }
        }
    }

    /// Validate the request, dispatch it strictly by `request.path`, and
    /// time the path invocation. Validation and result packaging happen
    /// outside the timed span.
    pub fn process(&self, request: &ProcessingRequest) -> Result<ProcessingResult, ProcessError> {
        validate_request(request)?;
        let path = self.path_for(request.path)?;

        let started = Instant::now();
        let output = path.run(&request.operation, &request.input)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        log::debug!(
            "{} {} on {}x{}: {:.3} ms",
            path.name(),
            request.operation.name(),
            request.input.width(),
            request.input.height(),
            elapsed_ms
        );
        Ok(ProcessingResult { output, elapsed_ms })
    }
}

impl Default for ProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_request(request: &ProcessingRequest) -> Result<(), ProcessError> {
    // Dimension invariants are enforced when the FrameBuffer is built, so
    // only operation parameters and the layout contract remain.
    request.operation.validate()?;
    if !matches!(request.operation, Operation::Grayscale)
        && request.input.layout() != PixelLayout::Gray
    {
        return Err(ProcessError::InvalidRequest(format!(
            "operation {} requires a single-channel input, got {:?}",
            request.operation.name(),
            request.input.layout()
        )));
    }
    Ok(())
}
