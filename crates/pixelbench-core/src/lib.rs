//! Pixelbench Core Library
//!
//! Processes a single in-memory image along one of two interchangeable
//! execution paths, a CPU reference path and a GPU-accelerated path, and
//! reports wall-clock performance for each, so callers can compare
//! throughput between the two.

pub mod benchmark;
pub mod bridge;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod frame;
pub mod models;
pub mod path;

// GPU acceleration module (optional, enabled with the "gpu" feature)
#[cfg(feature = "gpu")]
pub mod gpu;

// Re-export commonly used types
pub use benchmark::run_benchmark;
pub use bridge::{benchmark_frame, process_frame, process_frame_op, FrameMetrics, SharedFrame};
pub use engine::ProcessingEngine;
pub use error::ProcessError;
pub use frame::{FrameBuffer, PixelLayout};
pub use models::{
    BenchmarkResult, FilterSpec, Operation, PathKind, ProcessingRequest, ProcessingResult,
};
pub use path::{CpuPath, ProcessingPath};

// Re-export GPU helpers when available
#[cfg(feature = "gpu")]
pub use gpu::{gpu_info, is_gpu_available};

use std::sync::Once;

static INIT: Once = Once::new();

/// Process-wide one-time setup. Idempotent; safe to call from any thread,
/// any number of times.
///
/// Logs the library version and, when the `gpu` feature is enabled, warms
/// the cached adapter probe so later availability checks are cheap. There
/// is no corresponding teardown and no state persists across processes.
pub fn initialize() {
    INIT.call_once(|| {
        log::info!("pixelbench-core {} initialized", env!("CARGO_PKG_VERSION"));
        #[cfg(feature = "gpu")]
        {
            if gpu::is_gpu_available() {
                if let Some(info) = gpu::gpu_info() {
                    log::info!("accelerated path available: {}", info);
                }
            } else {
                log::info!("no GPU adapter found, accelerated path disabled");
            }
        }
    });
}
