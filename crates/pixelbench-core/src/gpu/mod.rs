//! GPU-accelerated path built on wgpu compute pipelines.
//!
//! Enabled with the `gpu` cargo feature. Whether an adapter exists is an
//! explicit, checkable condition: a request that selects the accelerated
//! path on a machine without one fails with `PathUnavailable` instead of
//! silently running on the CPU.
//!
//! Every operation synchronizes on the device before returning, so from
//! the contract boundary the accelerated path is as blocking and ordered
//! as the reference path.

mod buffers;
mod context;
mod ops;
mod shaders;

#[cfg(test)]
mod tests;

pub use context::{GpuContext, GpuError};
pub use ops::GpuPath;

use std::sync::OnceLock;

static GPU_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Check whether a suitable GPU adapter is present. The probe runs once
/// per process; later calls return the cached answer.
pub fn is_gpu_available() -> bool {
    *GPU_AVAILABLE.get_or_init(context::probe_adapter)
}

/// Human-readable description of the adapter the accelerated path would
/// use, or None when there is none.
pub fn gpu_info() -> Option<String> {
    context::device_info()
}
