//! GPU context: wgpu device, queue, and pre-compiled compute pipelines.

use std::sync::Arc;

use super::shaders::Shaders;

/// Errors that can occur during GPU operations.
#[derive(Debug, Clone)]
pub enum GpuError {
    /// No suitable GPU adapter found
    NoAdapter,
    /// Failed to request GPU device
    DeviceRequest(String),
    /// Buffer operation failed
    BufferError(String),
    /// GPU execution failed
    ExecutionError(String),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::NoAdapter => write!(f, "No suitable GPU adapter found"),
            GpuError::DeviceRequest(e) => write!(f, "Failed to request GPU device: {}", e),
            GpuError::BufferError(e) => write!(f, "Buffer operation failed: {}", e),
            GpuError::ExecutionError(e) => write!(f, "GPU execution failed: {}", e),
        }
    }
}

impl std::error::Error for GpuError {}

/// Probe for an adapter without creating a device.
pub(crate) fn probe_adapter() -> bool {
    request_adapter().is_some()
}

/// Describe the adapter the accelerated path would run on.
pub(crate) fn device_info() -> Option<String> {
    request_adapter().map(|adapter| {
        let info = adapter.get_info();
        format!("{} ({:?}, {:?})", info.name, info.device_type, info.backend)
    })
}

fn request_adapter() -> Option<wgpu::Adapter> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
}

/// Pre-compiled compute pipelines for the four operations. The blur
/// pipeline runs twice per call, once per separable direction.
pub(crate) struct GpuPipelines {
    pub grayscale: wgpu::ComputePipeline,
    pub sobel: wgpu::ComputePipeline,
    pub convolve: wgpu::ComputePipeline,
    pub blur: wgpu::ComputePipeline,
    /// input (read-only) + output (read-write) + params uniform
    pub io_params_layout: wgpu::BindGroupLayout,
    /// io_params_layout plus a read-only kernel coefficient buffer
    pub io_kernel_layout: wgpu::BindGroupLayout,
}

/// GPU context holding the wgpu device, queue, and compiled pipelines.
pub struct GpuContext {
    pub(crate) device: Arc<wgpu::Device>,
    pub(crate) queue: Arc<wgpu::Queue>,
    pub(crate) pipelines: GpuPipelines,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Create a new GPU context, initializing the device and compiling all
    /// shaders.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async())
    }

    /// Async version of context creation.
    pub async fn new_async() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        log::debug!("creating GPU context on {}", adapter_info.name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pixelbench-gpu"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceRequest(e.to_string()))?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);
        let pipelines = create_pipelines(&device);

        Ok(Self {
            device,
            queue,
            pipelines,
            adapter_info,
        })
    }

    /// Get the adapter info for this context.
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Submit a command encoder and block until the device is done.
    pub(crate) fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);
    }
}

/// Compile all shaders and create the compute pipelines.
fn create_pipelines(device: &wgpu::Device) -> GpuPipelines {
    let grayscale_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("grayscale"),
        source: wgpu::ShaderSource::Wgsl(Shaders::GRAYSCALE.into()),
    });
    let sobel_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sobel"),
        source: wgpu::ShaderSource::Wgsl(Shaders::SOBEL.into()),
    });
    let convolve_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("convolve"),
        source: wgpu::ShaderSource::Wgsl(Shaders::CONVOLVE.into()),
    });
    let blur_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("blur"),
        source: wgpu::ShaderSource::Wgsl(Shaders::BLUR.into()),
    });

    let io_params_layout = create_io_params_layout(device);
    let io_params_pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("io_params_pipeline_layout"),
            bind_group_layouts: &[&io_params_layout],
            push_constant_ranges: &[],
        });

    let io_kernel_layout = create_io_kernel_layout(device);
    let io_kernel_pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("io_kernel_pipeline_layout"),
            bind_group_layouts: &[&io_kernel_layout],
            push_constant_ranges: &[],
        });

    let grayscale = create_compute_pipeline(
        device,
        "grayscale",
        &io_params_pipeline_layout,
        &grayscale_module,
        "gray_convert",
    );
    let sobel = create_compute_pipeline(
        device,
        "sobel",
        &io_params_pipeline_layout,
        &sobel_module,
        "edge_sobel",
    );
    let convolve = create_compute_pipeline(
        device,
        "convolve",
        &io_kernel_pipeline_layout,
        &convolve_module,
        "convolve_2d",
    );
    let blur = create_compute_pipeline(
        device,
        "blur",
        &io_kernel_pipeline_layout,
        &blur_module,
        "blur_pass",
    );

    GpuPipelines {
        grayscale,
        sobel,
        convolve,
        blur,
        io_params_layout,
        io_kernel_layout,
    }
}

fn create_compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    entry_point: &str,
) -> wgpu::ComputePipeline {
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        module,
        entry_point: Some(entry_point),
        compilation_options: Default::default(),
        cache: None,
    })
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_io_params_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("io_params_layout"),
        entries: &[
            storage_entry(0, true),
            storage_entry(1, false),
            uniform_entry(2),
        ],
    })
}

fn create_io_kernel_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("io_kernel_layout"),
        entries: &[
            storage_entry(0, true),
            storage_entry(1, false),
            uniform_entry(2),
            storage_entry(3, true),
        ],
    })
}
