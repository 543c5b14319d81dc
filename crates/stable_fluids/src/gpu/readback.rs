//! Blocking texture readback for tests and diagnostics.
//!
//! Copies a field texture into a mappable staging buffer, waits for the
//! map, and unpacks the padded rows into a host [`Field`].

use bytemuck::Pod;
use std::sync::mpsc;

use sim2d::{Field, Texel, Vec4};

use super::{await_buffer_map, FieldTexture, GpuError};

/// Row pitch of a texture copy, rounded up to the copy alignment.
pub fn padded_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let unpadded = width * bytes_per_texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// A staging buffer sized for one texture copy.
struct StagingBuffer {
    buffer: wgpu::Buffer,
    bytes_per_row: u32,
}

impl StagingBuffer {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32, bytes_per_texel: u32) -> Self {
        let bytes_per_row = padded_bytes_per_row(width, bytes_per_texel);
        Self {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: bytes_per_row as u64 * height as u64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            bytes_per_row,
        }
    }

    fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, texture: &wgpu::Texture, extent: wgpu::Extent3d) {
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(self.bytes_per_row),
                    rows_per_image: Some(extent.height),
                },
            },
            extent,
        );
    }

    fn map(&self, device: &wgpu::Device) -> Result<(), GpuError> {
        let (tx, rx) = mpsc::channel();
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        device.poll(wgpu::Maintain::Wait);
        await_buffer_map(rx)
    }

    /// Copy out tightly packed rows, dropping the alignment padding.
    fn read_rows<P: Pod>(&self, row_bytes: usize, height: u32) -> Vec<P> {
        let data = self.buffer.slice(..).get_mapped_range();
        let mut out = Vec::with_capacity(row_bytes / std::mem::size_of::<P>() * height as usize);
        for row in data.chunks(self.bytes_per_row as usize).take(height as usize) {
            out.extend_from_slice(bytemuck::cast_slice(&row[..row_bytes]));
        }
        drop(data);
        self.buffer.unmap();
        out
    }
}

fn read_texture<P: Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    extent: wgpu::Extent3d,
    bytes_per_texel: u32,
) -> Result<Vec<P>, GpuError> {
    let staging = StagingBuffer::new(
        device,
        "Field Readback Staging",
        extent.width,
        extent.height,
        bytes_per_texel,
    );
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Field Readback Encoder"),
    });
    staging.copy_from(&mut encoder, texture, extent);
    queue.submit(std::iter::once(encoder.finish()));

    staging.map(device)?;
    Ok(staging.read_rows((extent.width * bytes_per_texel) as usize, extent.height))
}

/// Read a float field texture back into host memory.
pub fn read_field<T: Texel>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    target: &FieldTexture,
) -> Result<Field<T>, GpuError> {
    let bytes_per_texel = target.bytes_per_texel();
    let components = (bytes_per_texel / 4) as usize;
    let floats: Vec<f32> =
        read_texture(device, queue, &target.texture, target.extent(), bytes_per_texel)?;

    let grid = target.grid;
    Ok(Field::from_fn(grid, |i, j| {
        let start = grid.index(i, j) * components;
        let mut v = [0.0f32; 4];
        v[..components].copy_from_slice(&floats[start..start + components]);
        T::from_vec4(Vec4::from_array(v))
    }))
}

/// Read an RGBA8 texture (the offscreen output) as pixels, row 0 at the top.
pub fn read_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    extent: wgpu::Extent3d,
) -> Result<Vec<[u8; 4]>, GpuError> {
    read_texture(device, queue, texture, extent, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(64, 4), 256);
        assert_eq!(padded_bytes_per_row(65, 4), 512);
        assert_eq!(padded_bytes_per_row(1, 16), 256);
        assert_eq!(padded_bytes_per_row(128, 8), 1024);
    }
}
