use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pixelbench_cli::{io, metrics_json, ops, print_metrics};
use pixelbench_core::{benchmark_frame, process_frame_op, ProcessingEngine};

#[derive(Parser)]
#[command(name = "pixelbench")]
#[command(version, about = "CPU vs GPU image processing benchmark", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an image through one execution path and report timings
    Process {
        /// Input image file
        input: PathBuf,

        /// Write the processed frame to this file
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Operation: grayscale, edges, blur, or convolve
        #[arg(long, default_value = "edges")]
        operation: String,

        /// Gaussian blur sigma
        #[arg(long, value_name = "FLOAT", default_value = "1.4")]
        sigma: f32,

        /// Built-in convolution kernel: sharpen, box3, or box5
        #[arg(long, value_name = "NAME")]
        kernel: Option<String>,

        /// Take the output from the accelerated path instead of the
        /// reference path (both are always measured when present)
        #[arg(long)]
        accelerated: bool,

        /// Print the metrics record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Time edge detection on both paths over repeated iterations
    Benchmark {
        /// Input image file
        input: PathBuf,

        /// Iterations per path
        #[arg(short = 'n', long, value_name = "N", default_value = "10")]
        iterations: u32,

        /// Print the metrics record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show accelerated-path availability and adapter details
    Info,
}

fn main() {
    env_logger::init();
    pixelbench_core::initialize();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Process {
            input,
            out,
            operation,
            sigma,
            kernel,
            accelerated,
            json,
        } => cmd_process(input, out, operation, sigma, kernel, accelerated, json),
        Commands::Benchmark {
            input,
            iterations,
            json,
        } => cmd_benchmark(input, iterations, json),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_process(
    input: PathBuf,
    out: Option<PathBuf>,
    operation: String,
    sigma: f32,
    kernel: Option<String>,
    accelerated: bool,
    json: bool,
) -> Result<(), String> {
    let operation = ops::parse_operation(&operation, sigma, kernel.as_deref())?;
    let frame = io::load_frame(&input)?;

    if !json {
        println!(
            "Processing {} ({}x{}, {:?})...",
            input.display(),
            frame.width(),
            frame.height(),
            frame.layout()
        );
    }

    let engine = ProcessingEngine::new();
    let metrics =
        process_frame_op(&engine, &frame, &operation, accelerated).map_err(|e| e.to_string())?;

    if json {
        println!("{}", metrics_json(&metrics)?);
    } else {
        print_metrics(&metrics);
    }

    if let Some(out) = out {
        io::save_frame(&frame, &out)?;
        if !json {
            println!("Processed frame saved to: {}", out.display());
        }
    }
    Ok(())
}

fn cmd_benchmark(input: PathBuf, iterations: u32, json: bool) -> Result<(), String> {
    let frame = io::load_frame(&input)?;

    if !json {
        println!(
            "Benchmarking edge detection on {} ({}x{}), {} iterations per path...",
            input.display(),
            frame.width(),
            frame.height(),
            iterations
        );
    }

    let engine = ProcessingEngine::new();
    let metrics = benchmark_frame(&engine, &frame, iterations).map_err(|e| e.to_string())?;

    if json {
        println!("{}", metrics_json(&metrics)?);
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

fn cmd_info() -> Result<(), String> {
    let engine = ProcessingEngine::new();
    println!(
        "Accelerated path: {}",
        if engine.has_accelerated() {
            "available"
        } else {
            "not available"
        }
    );

    #[cfg(feature = "gpu")]
    if let Some(info) = pixelbench_core::gpu_info() {
        println!("Adapter:          {}", info);
    }
    Ok(())
}
