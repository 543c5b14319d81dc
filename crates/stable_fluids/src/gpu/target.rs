//! GPU-resident field storage.

use sim2d::{FluidError, Grid, GridTarget};

/// One 2-D float texture a pass can render into and sample from.
pub struct FieldTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub grid: Grid,
    pub format: wgpu::TextureFormat,
}

impl FieldTexture {
    /// Create a zero-initialized render target.
    ///
    /// Creation runs inside out-of-memory and validation error scopes so a
    /// failed allocation comes back as [`FluidError::Allocation`].
    pub fn new(
        device: &wgpu::Device,
        grid: Grid,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Result<Self, FluidError> {
        let limit = device.limits().max_texture_dimension_2d;
        if grid.width > limit || grid.height > limit {
            return Err(FluidError::Allocation {
                label: label.to_string(),
                grid,
                reason: format!("exceeds max texture dimension {}", limit),
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: grid.width,
                height: grid.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(error) = validation.or(out_of_memory) {
            return Err(FluidError::Allocation {
                label: label.to_string(),
                grid,
                reason: error.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            grid,
            format,
        })
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.grid.width,
            height: self.grid.height,
            depth_or_array_layers: 1,
        }
    }

    /// Bytes per texel for the float formats fields use.
    pub fn bytes_per_texel(&self) -> u32 {
        self.format.block_copy_size(None).unwrap_or(16)
    }
}

impl GridTarget for FieldTexture {
    fn grid(&self) -> Grid {
        self.grid
    }
}
