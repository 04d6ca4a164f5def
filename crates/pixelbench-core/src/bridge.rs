//! Boundary marshalling between a caller-owned pixel buffer and the engine.
//!
//! The caller keeps ownership of its pixel storage before and after every
//! call; the bridge takes scoped exclusive access, converts to the
//! canonical single-channel layout, drives the engine or the benchmark
//! harness, and restores the original layout in place. The lock guard
//! releases on every exit path, success or failure alike, and the in-place
//! write is all-or-nothing: on any error the caller's bytes are untouched.

use std::sync::{Mutex, MutexGuard, TryLockError};

use serde::Serialize;

use crate::benchmark::run_benchmark;
use crate::engine::ProcessingEngine;
use crate::error::ProcessError;
use crate::frame::{FrameBuffer, PixelLayout};
use crate::models::{Operation, PathKind, ProcessingRequest, ProcessingResult};

/// A caller-owned external frame. The pixel bytes live behind a mutex;
/// a bridge call holds the lock for its full duration, so passing the same
/// frame into a second concurrent call yields `BufferAcquisition` for the
/// loser of the race instead of interleaved access.
pub struct SharedFrame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Mutex<Vec<u8>>,
}

impl SharedFrame {
    /// Validates the same length invariant as `FrameBuffer`.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, ProcessError> {
        let frame = FrameBuffer::new(width, height, layout, pixels)?;
        Ok(Self {
            width,
            height,
            layout,
            pixels: Mutex::new(frame.into_data()),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Copy out the current pixel bytes, or fail if the frame is in use.
    pub fn snapshot(&self) -> Result<Vec<u8>, ProcessError> {
        self.acquire().map(|guard| guard.clone())
    }

    /// Scoped exclusive access. Contention and poisoning both surface as
    /// `BufferAcquisition`; the bridge never blocks waiting for a frame.
    fn acquire(&self) -> Result<MutexGuard<'_, Vec<u8>>, ProcessError> {
        match self.pixels.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(ProcessError::BufferAcquisition(
                "frame is locked by another call".to_string(),
            )),
            Err(TryLockError::Poisoned(_)) => Err(ProcessError::BufferAcquisition(
                "frame lock was poisoned by a previous panic".to_string(),
            )),
        }
    }
}

/// Outward-facing metrics record returned by the bridge entry points.
#[derive(Debug, Clone, Serialize)]
pub struct FrameMetrics {
    /// Frames per second: the selected path's rate for a single frame, or
    /// the reference path's rate over all iterations for a benchmark.
    /// Zero when the underlying elapsed time was not positive.
    pub fps: f64,
    pub reference_time_ms: f64,
    /// None when no accelerated path exists in this build or runtime.
    pub accelerated_time_ms: Option<f64>,
    /// Reference time over accelerated time; None whenever undefined.
    pub speedup: Option<f64>,
    /// Present on benchmark records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

/// Process one frame in place with edge detection and report both path
/// timings. See [`process_frame_op`].
pub fn process_frame(
    engine: &ProcessingEngine,
    frame: &SharedFrame,
    use_accelerated: bool,
) -> Result<FrameMetrics, ProcessError> {
    process_frame_op(engine, frame, &Operation::EdgeDetect, use_accelerated)
}

/// Process one frame in place with the given operation.
///
/// The frame is converted to the canonical single-channel layout and run
/// through the engine on the reference path and, when one is attached, the
/// accelerated path. Both timings come from real invocations; neither is
/// ever derived from the other. The path named by `use_accelerated`
/// supplies the output written back to the caller's buffer in its original
/// layout.
pub fn process_frame_op(
    engine: &ProcessingEngine,
    frame: &SharedFrame,
    operation: &Operation,
    use_accelerated: bool,
) -> Result<FrameMetrics, ProcessError> {
    if use_accelerated && !engine.has_accelerated() {
        return Err(ProcessError::PathUnavailable(PathKind::Accelerated));
    }

    let mut guard = frame.acquire()?;
    log::debug!(
        "processing {}x{} {:?} frame, operation={}, accelerated={}",
        frame.width,
        frame.height,
        frame.layout,
        operation.name(),
        use_accelerated
    );

    let canonical =
        FrameBuffer::new(frame.width, frame.height, frame.layout, guard.clone())?.to_canonical();

    let reference = engine.process(&ProcessingRequest {
        input: canonical.clone(),
        operation: operation.clone(),
        path: PathKind::Reference,
    })?;
    let accelerated = if engine.has_accelerated() {
        Some(engine.process(&ProcessingRequest {
            input: canonical,
            operation: operation.clone(),
            path: PathKind::Accelerated,
        })?)
    } else {
        None
    };

    let selected: &ProcessingResult = match (use_accelerated, accelerated.as_ref()) {
        (true, Some(result)) => result,
        (true, None) => return Err(ProcessError::PathUnavailable(PathKind::Accelerated)),
        (false, _) => &reference,
    };

    // Restore the original layout into a fresh vector first; the caller's
    // storage is only written once the full conversion succeeded.
    let restored = selected.output.expand_to(frame.layout)?;
    if restored.len() != guard.len() {
        return Err(ProcessError::ResultConstruction(format!(
            "restored frame is {} bytes, expected {}",
            restored.len(),
            guard.len()
        )));
    }
    guard.copy_from_slice(&restored);
    drop(guard);

    let accelerated_time_ms = accelerated.as_ref().map(|r| r.elapsed_ms);
    let speedup = accelerated_time_ms.and_then(|accel| {
        if accel > 0.0 {
            Some(reference.elapsed_ms / accel)
        } else {
            None
        }
    });
    Ok(FrameMetrics {
        fps: selected.fps().unwrap_or(0.0),
        reference_time_ms: reference.elapsed_ms,
        accelerated_time_ms,
        speedup,
        iterations: None,
    })
}

/// Benchmark edge detection over a caller-owned frame.
///
/// The frame stays locked for the duration of the run but its bytes are
/// never modified; the harness works on a canonical copy.
pub fn benchmark_frame(
    engine: &ProcessingEngine,
    frame: &SharedFrame,
    iterations: u32,
) -> Result<FrameMetrics, ProcessError> {
    let guard = frame.acquire()?;
    let canonical =
        FrameBuffer::new(frame.width, frame.height, frame.layout, guard.clone())?.to_canonical();

    let result = run_benchmark(engine, &canonical, &Operation::EdgeDetect, iterations)?;
    drop(guard);

    let fps = if result.reference_total_ms > 0.0 {
        1000.0 * f64::from(result.iterations) / result.reference_total_ms
    } else {
        0.0
    };
    Ok(FrameMetrics {
        fps,
        reference_time_ms: result.reference_total_ms,
        accelerated_time_ms: Some(result.accelerated_total_ms),
        speedup: result.speedup(),
        iterations: Some(result.iterations),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_rgba_frame(width: u32, height: u32, color: [u8; 4]) -> SharedFrame {
        let mut pixels = Vec::with_capacity((width * height) as usize * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        SharedFrame::new(width, height, PixelLayout::Rgba, pixels).unwrap()
    }

    #[test]
    fn locked_frame_fails_acquisition_and_stays_untouched() {
        let frame = uniform_rgba_frame(4, 4, [40, 80, 120, 255]);
        let engine = ProcessingEngine::cpu_only();

        let held = frame.acquire().unwrap();
        let before = held.clone();
        let result = process_frame(&engine, &frame, false);
        assert!(matches!(result, Err(ProcessError::BufferAcquisition(_))));
        drop(held);

        assert_eq!(frame.snapshot().unwrap(), before);
    }

    #[test]
    fn process_frame_writes_back_in_original_layout() {
        // Edge detection of a uniform frame is all zeros; the write-back
        // replicates that into RGB with opaque alpha.
        let frame = uniform_rgba_frame(8, 8, [40, 80, 120, 200]);
        let engine = ProcessingEngine::cpu_only();

        let metrics = process_frame(&engine, &frame, false).unwrap();
        assert!(metrics.reference_time_ms >= 0.0);

        let pixels = frame.snapshot().unwrap();
        for px in pixels.chunks_exact(4) {
            assert_eq!(px[0], 0);
            assert_eq!(px[1], 0);
            assert_eq!(px[2], 0);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn accelerated_selection_without_gpu_leaves_frame_unchanged() {
        let frame = uniform_rgba_frame(4, 4, [10, 20, 30, 255]);
        let engine = ProcessingEngine::cpu_only();
        let before = frame.snapshot().unwrap();

        let result = process_frame(&engine, &frame, true);
        assert!(matches!(
            result,
            Err(ProcessError::PathUnavailable(PathKind::Accelerated))
        ));
        assert_eq!(frame.snapshot().unwrap(), before);
    }

    #[test]
    fn cpu_only_metrics_report_no_accelerated_time() {
        let frame = uniform_rgba_frame(8, 8, [90, 90, 90, 255]);
        let engine = ProcessingEngine::cpu_only();
        let metrics = process_frame(&engine, &frame, false).unwrap();
        assert!(metrics.accelerated_time_ms.is_none());
        assert!(metrics.speedup.is_none());
    }

    #[test]
    fn grayscale_operation_round_trips_pixels() {
        // A uniform gray-ish frame stays visually identical: grayscale of
        // the canonical buffer is the identity.
        let frame = uniform_rgba_frame(4, 4, [70, 70, 70, 255]);
        let engine = ProcessingEngine::cpu_only();
        process_frame_op(&engine, &frame, &Operation::Grayscale, false).unwrap();
        let pixels = frame.snapshot().unwrap();
        for px in pixels.chunks_exact(4) {
            assert_eq!(&px[..3], &[70, 70, 70]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn benchmark_frame_does_not_modify_pixels() {
        let frame = uniform_rgba_frame(8, 8, [1, 2, 3, 4]);
        let engine = ProcessingEngine::cpu_only();
        let before = frame.snapshot().unwrap();

        let metrics = benchmark_frame(&engine, &frame, 0).unwrap();
        assert_eq!(metrics.iterations, Some(0));
        assert_eq!(metrics.reference_time_ms, 0.0);
        assert_eq!(metrics.accelerated_time_ms, Some(0.0));
        assert!(metrics.speedup.is_none());
        assert_eq!(metrics.fps, 0.0);

        assert_eq!(frame.snapshot().unwrap(), before);
    }

    #[test]
    fn benchmark_frame_requires_the_accelerated_path() {
        let frame = uniform_rgba_frame(8, 8, [50, 50, 50, 255]);
        let engine = ProcessingEngine::cpu_only();
        let result = benchmark_frame(&engine, &frame, 2);
        assert!(matches!(
            result,
            Err(ProcessError::PathUnavailable(PathKind::Accelerated))
        ));
    }

    #[test]
    fn metrics_serialize_to_json() {
        let metrics = FrameMetrics {
            fps: 30.0,
            reference_time_ms: 33.3,
            accelerated_time_ms: None,
            speedup: None,
            iterations: None,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["fps"], 30.0);
        assert!(json["accelerated_time_ms"].is_null());
        assert!(json.get("iterations").is_none());
    }
}
