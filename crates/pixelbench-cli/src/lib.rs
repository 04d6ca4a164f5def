//! Shared helpers for the pixelbench command-line interface.

pub mod io;
pub mod ops;

use pixelbench_core::FrameMetrics;

/// Human-readable rendering of a metrics record.
pub fn print_metrics(metrics: &FrameMetrics) {
    if let Some(iterations) = metrics.iterations {
        println!("  Iterations:       {}", iterations);
    }
    println!("  FPS:              {:.2}", metrics.fps);
    println!("  Reference path:   {:.3} ms", metrics.reference_time_ms);
    match metrics.accelerated_time_ms {
        Some(t) => println!("  Accelerated path: {:.3} ms", t),
        None => println!("  Accelerated path: not available"),
    }
    if let Some(speedup) = metrics.speedup {
        println!("  Speedup:          {:.2}x", speedup);
    }
}

/// JSON rendering of a metrics record.
pub fn metrics_json(metrics: &FrameMetrics) -> Result<String, String> {
    serde_json::to_string_pretty(metrics).map_err(|e| format!("Failed to serialize metrics: {}", e))
}
