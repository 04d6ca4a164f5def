//! Benchmarks for the processing operations on both execution paths.
//!
//! Run with: cargo bench -p pixelbench-core
//!
//! GPU groups appear only when an adapter is present. Criterion's wall
//! time includes the accelerated path's upload and download, which is the
//! contract: marshalling is part of that path's execution strategy.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pixelbench_core::{
    FilterSpec, FrameBuffer, Operation, PathKind, PixelLayout, ProcessingEngine, ProcessingRequest,
};

/// Synthetic scene with gradients and block structure, enough texture that
/// edge detection does real work.
fn generate_frame(width: u32, height: u32) -> FrameBuffer {
    let mut data = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let base = (x * 200 / width + y * 55 / height) as u8;
            let block = if (x / 32 + y / 32) % 2 == 0 { 40 } else { 0 };
            data.push(base.saturating_add(block));
        }
    }
    FrameBuffer::new(width, height, PixelLayout::Gray, data).unwrap()
}

fn bench_operation(c: &mut Criterion, group_name: &str, operation: Operation) {
    let engine = ProcessingEngine::new();
    let mut group = c.benchmark_group(group_name);

    for size in [256u32, 512, 1024] {
        let input = generate_frame(size, size);
        group.throughput(Throughput::Elements(u64::from(size) * u64::from(size)));

        group.bench_with_input(
            BenchmarkId::new("cpu", format!("{}x{}", size, size)),
            &input,
            |b, input| {
                let request = ProcessingRequest {
                    input: input.clone(),
                    operation: operation.clone(),
                    path: PathKind::Reference,
                };
                b.iter(|| engine.process(black_box(&request)).unwrap());
            },
        );

        if engine.has_accelerated() {
            group.bench_with_input(
                BenchmarkId::new("gpu", format!("{}x{}", size, size)),
                &input,
                |b, input| {
                    let request = ProcessingRequest {
                        input: input.clone(),
                        operation: operation.clone(),
                        path: PathKind::Accelerated,
                    };
                    b.iter(|| engine.process(black_box(&request)).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn bench_edge_detect(c: &mut Criterion) {
    bench_operation(c, "edge_detect", Operation::EdgeDetect);
}

fn bench_gaussian_blur(c: &mut Criterion) {
    bench_operation(c, "gaussian_blur", Operation::GaussianBlur { sigma: 1.4 });
}

fn bench_convolve(c: &mut Criterion) {
    bench_operation(c, "convolve", Operation::Convolve(FilterSpec::sharpen()));
}

fn bench_grayscale(c: &mut Criterion) {
    bench_operation(c, "grayscale", Operation::Grayscale);
}

criterion_group!(
    benches,
    bench_edge_detect,
    bench_gaussian_blur,
    bench_convolve,
    bench_grayscale,
);
criterion_main!(benches);
