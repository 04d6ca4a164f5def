//! Benchmark harness: equal-iteration timing of both execution paths.

use crate::engine::ProcessingEngine;
use crate::error::ProcessError;
use crate::frame::FrameBuffer;
use crate::models::{BenchmarkResult, Operation, PathKind, ProcessingRequest};

/// Run `operation` `iterations` times on each path and sum the per-call
/// elapsed times.
///
/// The two loops are independent measurement sessions: the reference loop
/// completes before the accelerated loop starts, and per-iteration outputs
/// are dropped immediately. With zero iterations neither path is invoked
/// and both totals are zero; the speedup is then undefined, not 0/0.
///
/// Any failed iteration terminates the run with its error; iterations are
/// never retried. On an engine without an accelerated path, the first
/// accelerated iteration fails with `PathUnavailable`.
pub fn run_benchmark(
    engine: &ProcessingEngine,
    input: &FrameBuffer,
    operation: &Operation,
    iterations: u32,
) -> Result<BenchmarkResult, ProcessError> {
    log::debug!(
        "benchmark: {} x{} on {}x{}",
        operation.name(),
        iterations,
        input.width(),
        input.height()
    );

    let reference_total_ms = time_path(engine, input, operation, PathKind::Reference, iterations)?;
    let accelerated_total_ms =
        time_path(engine, input, operation, PathKind::Accelerated, iterations)?;

    let result = BenchmarkResult {
        iterations,
        reference_total_ms,
        accelerated_total_ms,
    };
    match result.speedup() {
        Some(speedup) => log::info!(
            "benchmark complete: reference {:.2} ms, accelerated {:.2} ms, speedup {:.2}x",
            result.reference_total_ms,
            result.accelerated_total_ms,
            speedup
        ),
        None => log::info!("benchmark complete: no iterations run"),
    }
    Ok(result)
}

fn time_path(
    engine: &ProcessingEngine,
    input: &FrameBuffer,
    operation: &Operation,
    path: PathKind,
    iterations: u32,
) -> Result<f64, ProcessError> {
    if iterations == 0 {
        return Ok(0.0);
    }
    let request = ProcessingRequest {
        input: input.clone(),
        operation: operation.clone(),
        path,
    };
    let mut total_ms = 0.0;
    for _ in 0..iterations {
        // The output frame is dropped here; only the timing accumulates.
        total_ms += engine.process(&request)?.elapsed_ms;
    }
    Ok(total_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelLayout;

    #[test]
    fn zero_iterations_yield_zero_totals_and_undefined_speedup() {
        let engine = ProcessingEngine::cpu_only();
        let input = FrameBuffer::filled(8, 8, PixelLayout::Gray, 100).unwrap();
        let result = run_benchmark(&engine, &input, &Operation::EdgeDetect, 0).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.reference_total_ms, 0.0);
        assert_eq!(result.accelerated_total_ms, 0.0);
        assert!(result.speedup().is_none());
    }

    #[test]
    fn missing_accelerated_path_fails_the_run() {
        let engine = ProcessingEngine::cpu_only();
        let input = FrameBuffer::filled(8, 8, PixelLayout::Gray, 100).unwrap();
        let result = run_benchmark(&engine, &input, &Operation::EdgeDetect, 2);
        assert!(matches!(
            result,
            Err(ProcessError::PathUnavailable(PathKind::Accelerated))
        ));
    }
}
