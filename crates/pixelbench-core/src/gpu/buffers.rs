//! GPU buffer management for image planes, kernel coefficients, and
//! dispatch parameters.
//!
//! Image data travels as f32 storage buffers: u8 pixels are widened on
//! upload and saturated back on download. That marshalling belongs to the
//! accelerated path's execution and is counted in its measured time.

use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::context::GpuError;

/// GPU image plane with metadata.
pub struct GpuImage {
    pub(crate) buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    device: Arc<wgpu::Device>,
}

impl GpuImage {
    /// Upload CPU data into a new storage buffer.
    pub fn upload(
        device: Arc<wgpu::Device>,
        data: &[f32],
        width: u32,
        height: u32,
        channels: u32,
    ) -> Result<Self, GpuError> {
        let expected = (width * height * channels) as usize;
        if data.len() != expected {
            return Err(GpuError::BufferError(format!(
                "Data size mismatch: expected {}, got {}",
                expected,
                data.len()
            )));
        }

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gpu_image"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            buffer,
            width,
            height,
            channels,
            device,
        })
    }

    /// Allocate an uninitialized single-channel plane of the given size.
    pub fn allocate(device: Arc<wgpu::Device>, width: u32, height: u32) -> Self {
        let size = (width as u64 * height as u64) * std::mem::size_of::<f32>() as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_image_out"),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
            channels: 1,
            device,
        }
    }

    /// Download the plane back to the CPU through a staging buffer.
    pub fn download(&self, queue: &wgpu::Queue) -> Result<Vec<f32>, GpuError> {
        let size =
            (self.width * self.height * self.channels) as u64 * std::mem::size_of::<f32>() as u64;

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("download_encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // If the receiver is gone the recv below fails on its own.
            let _ = tx.send(result);
        });

        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|e| GpuError::BufferError(e.to_string()))?
            .map_err(|e| GpuError::BufferError(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();

        drop(data);
        staging_buffer.unmap();

        Ok(result)
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

// Parameter structures for uniform buffers.
// These must match the WGSL struct layouts exactly.

/// Parameters for the grayscale and Sobel dispatches.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub pixel_count: u32,
}

/// Parameters for the convolve and blur dispatches. `kernel_size` is the
/// full odd side (convolve) or tap count (blur); `horizontal` selects the
/// blur pass direction and is unused by convolve.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct KernelParams {
    pub width: u32,
    pub height: u32,
    pub kernel_size: u32,
    pub horizontal: u32,
}

/// Create a uniform buffer from parameter data.
pub fn create_uniform_buffer<T: Pod>(device: &wgpu::Device, data: &T, label: &str) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Create a read-only storage buffer holding kernel coefficients.
pub fn create_kernel_buffer(device: &wgpu::Device, coefficients: &[f32]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("kernel_coefficients"),
        contents: bytemuck::cast_slice(coefficients),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    })
}
