//! Accelerated implementations of the processing capability set.
//!
//! Each operation uploads the frame, dispatches one or two compute passes,
//! and downloads the result. The sequence blocks on the device before
//! returning, so the caller observes a synchronous call whose measured
//! time covers the whole upload/execute/download round trip.

use std::sync::Arc;

use crate::error::ProcessError;
use crate::frame::{FrameBuffer, PixelLayout};
use crate::models::FilterSpec;
use crate::path::{blur_half_width, ProcessingPath};

use super::buffers::{
    create_kernel_buffer, create_uniform_buffer, GpuImage, ImageParams, KernelParams,
};
use super::context::{GpuContext, GpuError};

const WORKGROUP_SIZE: u32 = 256;
const MAX_WORKGROUPS_PER_DIM: u32 = 65535;

/// GPU-backed execution strategy. Holds the device context for its whole
/// lifetime; pipelines are compiled once at construction.
pub struct GpuPath {
    ctx: GpuContext,
}

impl GpuPath {
    pub fn new() -> Result<Self, GpuError> {
        Ok(Self {
            ctx: GpuContext::new()?,
        })
    }

    fn upload_plane(&self, input: &FrameBuffer) -> Result<GpuImage, GpuError> {
        let data: Vec<f32> = input.data().iter().map(|&b| b as f32).collect();
        GpuImage::upload(
            self.ctx.device.clone(),
            &data,
            input.width(),
            input.height(),
            input.layout().channels() as u32,
        )
    }

    fn device(&self) -> &Arc<wgpu::Device> {
        &self.ctx.device
    }

    /// Run one compute pass over `pixel_count` invocations and wait.
    fn dispatch(
        &self,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        pixel_count: u32,
        label: &str,
    ) -> Result<(), GpuError> {
        let workgroups = pixel_count.div_ceil(WORKGROUP_SIZE);
        if workgroups > MAX_WORKGROUPS_PER_DIM {
            return Err(GpuError::ExecutionError(format!(
                "Image too large: {} pixels requires {} workgroups, max supported is {}",
                pixel_count, workgroups, MAX_WORKGROUPS_PER_DIM
            )));
        }

        let mut encoder = self
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        self.ctx.submit_and_wait(encoder);
        Ok(())
    }

    fn io_params_bind_group(
        &self,
        input: &GpuImage,
        output: &GpuImage,
        uniform: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.ctx.pipelines.io_params_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    fn io_kernel_bind_group(
        &self,
        input: &GpuImage,
        output: &GpuImage,
        uniform: &wgpu::Buffer,
        kernel: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.ctx.pipelines.io_kernel_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: kernel.as_entire_binding(),
                },
            ],
        })
    }

    fn download_quantized(&self, plane: &GpuImage) -> Result<Vec<u8>, GpuError> {
        let data = plane.download(&self.ctx.queue)?;
        Ok(data
            .into_iter()
            .map(|v| v.clamp(0.0, 255.0).round() as u8)
            .collect())
    }
}

impl ProcessingPath for GpuPath {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn grayscale(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError> {
        let image = self.upload_plane(input)?;
        let output = GpuImage::allocate(self.device().clone(), input.width(), input.height());
        let params = ImageParams {
            width: image.width,
            height: image.height,
            channels: image.channels,
            pixel_count: image.pixel_count(),
        };
        let uniform = create_uniform_buffer(self.device(), &params, "grayscale_params");
        let bind_group = self.io_params_bind_group(&image, &output, &uniform, "grayscale_bind");
        self.dispatch(
            &self.ctx.pipelines.grayscale,
            &bind_group,
            image.pixel_count(),
            "grayscale",
        )?;
        let bytes = self.download_quantized(&output)?;
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, bytes)
    }

    fn edge_detect(&self, input: &FrameBuffer) -> Result<FrameBuffer, ProcessError> {
        let image = self.upload_plane(input)?;
        let output = GpuImage::allocate(self.device().clone(), input.width(), input.height());
        let params = ImageParams {
            width: image.width,
            height: image.height,
            channels: 1,
            pixel_count: image.pixel_count(),
        };
        let uniform = create_uniform_buffer(self.device(), &params, "sobel_params");
        let bind_group = self.io_params_bind_group(&image, &output, &uniform, "sobel_bind");
        self.dispatch(
            &self.ctx.pipelines.sobel,
            &bind_group,
            image.pixel_count(),
            "sobel",
        )?;
        let bytes = self.download_quantized(&output)?;
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, bytes)
    }

    fn convolve(
        &self,
        input: &FrameBuffer,
        filter: &FilterSpec,
    ) -> Result<FrameBuffer, ProcessError> {
        let image = self.upload_plane(input)?;
        let output = GpuImage::allocate(self.device().clone(), input.width(), input.height());
        let params = KernelParams {
            width: image.width,
            height: image.height,
            kernel_size: filter.size(),
            horizontal: 0,
        };
        let uniform = create_uniform_buffer(self.device(), &params, "convolve_params");
        let kernel = create_kernel_buffer(self.device(), filter.coefficients());
        let bind_group =
            self.io_kernel_bind_group(&image, &output, &uniform, &kernel, "convolve_bind");
        self.dispatch(
            &self.ctx.pipelines.convolve,
            &bind_group,
            image.pixel_count(),
            "convolve",
        )?;
        let bytes = self.download_quantized(&output)?;
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, bytes)
    }

    fn gaussian_blur(&self, input: &FrameBuffer, sigma: f32) -> Result<FrameBuffer, ProcessError> {
        let taps = crate::cpu::gaussian_kernel_1d(blur_half_width(sigma), sigma);
        let image = self.upload_plane(input)?;
        // The intermediate plane stays on the device between the two
        // separable passes; only the final plane is downloaded.
        let mid = GpuImage::allocate(self.device().clone(), input.width(), input.height());
        let output = GpuImage::allocate(self.device().clone(), input.width(), input.height());
        let kernel = create_kernel_buffer(self.device(), &taps);

        let horizontal = KernelParams {
            width: image.width,
            height: image.height,
            kernel_size: taps.len() as u32,
            horizontal: 1,
        };
        let vertical = KernelParams {
            horizontal: 0,
            ..horizontal
        };
        let h_uniform = create_uniform_buffer(self.device(), &horizontal, "blur_h_params");
        let v_uniform = create_uniform_buffer(self.device(), &vertical, "blur_v_params");

        let h_bind = self.io_kernel_bind_group(&image, &mid, &h_uniform, &kernel, "blur_h_bind");
        let v_bind = self.io_kernel_bind_group(&mid, &output, &v_uniform, &kernel, "blur_v_bind");

        self.dispatch(
            &self.ctx.pipelines.blur,
            &h_bind,
            image.pixel_count(),
            "blur_h",
        )?;
        self.dispatch(
            &self.ctx.pipelines.blur,
            &v_bind,
            image.pixel_count(),
            "blur_v",
        )?;
        let bytes = self.download_quantized(&output)?;
        FrameBuffer::new(input.width(), input.height(), PixelLayout::Gray, bytes)
    }
}
