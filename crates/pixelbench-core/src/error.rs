//! Error taxonomy for processing, benchmarking, and boundary marshalling.

use crate::models::PathKind;

/// Errors that terminate the current call. None of these are retried
/// internally; the caller decides how to surface them.
#[derive(Debug, Clone)]
pub enum ProcessError {
    /// Exclusive access to the external buffer could not be obtained.
    /// The buffer is left untouched.
    BufferAcquisition(String),
    /// Malformed dimensions or operation parameters. Nothing was processed.
    InvalidRequest(String),
    /// The selected path is not present in this build or on this machine.
    /// The other path is never substituted silently.
    PathUnavailable(PathKind),
    /// A path failed while executing the operation.
    Execution(String),
    /// The outward-facing result could not be constructed. Any acquired
    /// buffer access has already been released.
    ResultConstruction(String),
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::BufferAcquisition(e) => {
                write!(f, "Failed to acquire frame buffer: {}", e)
            }
            ProcessError::InvalidRequest(e) => write!(f, "Invalid request: {}", e),
            ProcessError::PathUnavailable(kind) => {
                write!(f, "The {} path is not available", kind)
            }
            ProcessError::Execution(e) => write!(f, "Processing failed: {}", e),
            ProcessError::ResultConstruction(e) => {
                write!(f, "Failed to construct result: {}", e)
            }
        }
    }
}

impl std::error::Error for ProcessError {}

#[cfg(feature = "gpu")]
impl From<crate::gpu::GpuError> for ProcessError {
    fn from(e: crate::gpu::GpuError) -> Self {
        match e {
            // A missing adapter means the accelerated path does not exist
            // on this machine, not that an operation failed.
            crate::gpu::GpuError::NoAdapter => {
                ProcessError::PathUnavailable(PathKind::Accelerated)
            }
            other => ProcessError::Execution(other.to_string()),
        }
    }
}
