//! One fullscreen render pipeline per simulation pass.
//!
//! Every program draws a single triangle covering its target. Binding 0 is
//! the program's uniform block; bindings 1.. are the input fields, read with
//! `textureLoad` so bilinear filtering and edge clamping match the CPU
//! kernels exactly.

use bytemuck::{Pod, Zeroable};
use std::mem;

use sim2d::{AdvectParams, FluidError, SplatParams, StencilParams};

use super::{COLOR_FORMAT, SCALAR_FORMAT, VECTOR_FORMAT};

const FULLSCREEN: &str = include_str!("shaders/fullscreen.wgsl");

/// Splat uniforms (must match splat.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SplatUniforms {
    pub value: [f32; 4],
    pub point: [f32; 2],
    pub radius: f32,
    pub aspect_ratio: f32,
}

impl From<&SplatParams> for SplatUniforms {
    fn from(p: &SplatParams) -> Self {
        Self {
            value: p.value.to_array(),
            point: p.point.to_array(),
            radius: p.radius,
            aspect_ratio: p.aspect_ratio,
        }
    }
}

/// Advection uniforms (must match advect.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct AdvectUniforms {
    pub texel_size: [f32; 2],
    pub dt: f32,
    pub dissipation: f32,
}

impl From<&AdvectParams> for AdvectUniforms {
    fn from(p: &AdvectParams) -> Self {
        Self {
            texel_size: p.texel_size.to_array(),
            dt: p.dt,
            dissipation: p.dissipation,
        }
    }
}

/// Divergence, Jacobi and gradient uniforms
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StencilUniforms {
    pub half_rdx: f32,
    pub alpha: f32,
    pub rbeta: f32,
    pub _pad: f32,
}

impl From<&StencilParams> for StencilUniforms {
    fn from(p: &StencilParams) -> Self {
        Self {
            half_rdx: p.half_rdx,
            alpha: p.alpha,
            rbeta: p.rbeta,
            _pad: 0.0,
        }
    }
}

/// Display uniforms (must match display.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DisplayUniforms {
    pub output_size: [f32; 2],
    pub _pad: [f32; 2],
}

/// A compiled pass: pipeline, input layout and its uniform buffer.
pub struct Program {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
}

impl Program {
    /// Build a program from a pass shader with `inputs` field bindings.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        pass_source: &str,
        inputs: u32,
        uniform_size: u64,
        target: wgpu::TextureFormat,
    ) -> Result<Self, FluidError> {
        let source = format!("{}\n{}", FULLSCREEN, pass_source);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        entries.extend((1..=inputs).map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(FluidError::ProgramBuild {
                program: label.to_string(),
                reason: error.to_string(),
            });
        }

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            label,
            pipeline,
            bind_group_layout,
            uniforms,
        })
    }

    /// Write uniforms and record one fullscreen draw into `target`.
    ///
    /// The draw is submitted immediately; queue order keeps passes sequential.
    pub fn draw<U: Pod>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &U,
        inputs: &[&wgpu::TextureView],
        target: &wgpu::TextureView,
    ) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: self.uniforms.as_entire_binding(),
        }];
        entries.extend(inputs.iter().enumerate().map(|(i, view)| wgpu::BindGroupEntry {
            binding: i as u32 + 1,
            resource: wgpu::BindingResource::TextureView(view),
        }));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(self.label),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(self.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Every pass program the backend needs.
///
/// Splat and advect run on both velocity and dye targets, so they are built
/// once per target format.
pub struct Programs {
    pub splat_vector: Program,
    pub splat_color: Program,
    pub advect_vector: Program,
    pub advect_color: Program,
    pub divergence: Program,
    pub jacobi: Program,
    pub gradient: Program,
    pub display: Program,
}

impl Programs {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Result<Self, FluidError> {
        let splat = include_str!("shaders/splat.wgsl");
        let advect = include_str!("shaders/advect.wgsl");
        let splat_size = mem::size_of::<SplatUniforms>() as u64;
        let advect_size = mem::size_of::<AdvectUniforms>() as u64;
        let stencil_size = mem::size_of::<StencilUniforms>() as u64;

        Ok(Self {
            splat_vector: Program::new(device, "Splat Velocity", splat, 1, splat_size, VECTOR_FORMAT)?,
            splat_color: Program::new(device, "Splat Dye", splat, 1, splat_size, COLOR_FORMAT)?,
            advect_vector: Program::new(device, "Advect Velocity", advect, 2, advect_size, VECTOR_FORMAT)?,
            advect_color: Program::new(device, "Advect Dye", advect, 2, advect_size, COLOR_FORMAT)?,
            divergence: Program::new(
                device,
                "Divergence",
                include_str!("shaders/divergence.wgsl"),
                1,
                stencil_size,
                SCALAR_FORMAT,
            )?,
            jacobi: Program::new(
                device,
                "Jacobi",
                include_str!("shaders/jacobi.wgsl"),
                2,
                stencil_size,
                SCALAR_FORMAT,
            )?,
            gradient: Program::new(
                device,
                "Subtract Gradient",
                include_str!("shaders/gradient.wgsl"),
                2,
                stencil_size,
                VECTOR_FORMAT,
            )?,
            display: Program::new(
                device,
                "Display",
                include_str!("shaders/display.wgsl"),
                1,
                mem::size_of::<DisplayUniforms>() as u64,
                output_format,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_wgsl_layout() {
        assert_eq!(mem::size_of::<SplatUniforms>(), 32);
        assert_eq!(mem::size_of::<AdvectUniforms>(), 16);
        assert_eq!(mem::size_of::<StencilUniforms>(), 16);
        assert_eq!(mem::size_of::<DisplayUniforms>(), 16);
    }

    #[test]
    fn test_splat_uniforms_from_params() {
        let params = SplatParams {
            point: sim2d::Vec2::new(0.25, 0.75),
            radius: 0.03,
            aspect_ratio: 1.5,
            value: sim2d::Vec4::new(1.0, 2.0, 3.0, 0.0),
        };
        let u = SplatUniforms::from(&params);
        assert_eq!(u.value, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(u.point, [0.25, 0.75]);
        assert_eq!(u.radius, 0.03);
        assert_eq!(u.aspect_ratio, 1.5);
    }
}
