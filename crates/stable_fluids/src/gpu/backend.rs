//! wgpu execution of the simulation passes.

use sim2d::{
    AdvectParams, Field, FluidBackend, FluidError, Grid, SplatParams, StencilParams, Texel,
};

use super::programs::{
    AdvectUniforms, DisplayUniforms, Programs, SplatUniforms, StencilUniforms,
};
use super::readback;
use super::{FieldTexture, GpuContext, GpuError, COLOR_FORMAT, SCALAR_FORMAT, VECTOR_FORMAT};

/// Runs every pass as a fullscreen draw into a field texture.
///
/// Each draw is submitted on its own, so submission order is pass order.
pub struct GpuBackend {
    ctx: GpuContext,
    programs: Programs,
    /// Composited output when there is no surface
    offscreen: Option<wgpu::Texture>,
}

impl GpuBackend {
    pub fn new(ctx: GpuContext) -> Result<Self, FluidError> {
        let programs = Programs::new(&ctx.device, ctx.surface_format())?;
        let offscreen = if ctx.surface.is_none() {
            Some(Self::create_offscreen(&ctx))
        } else {
            None
        };
        log::info!("GPU backend ready, output format {:?}", ctx.surface_format());
        Ok(Self {
            ctx,
            programs,
            offscreen,
        })
    }

    fn create_offscreen(ctx: &GpuContext) -> wgpu::Texture {
        ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Output"),
            size: wgpu::Extent3d {
                width: ctx.config.width,
                height: ctx.config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Resize the presentation surface (or offscreen output).
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        if self.offscreen.is_some() {
            self.offscreen = Some(Self::create_offscreen(&self.ctx));
        }
    }

    pub fn read_field<T: Texel>(&self, target: &FieldTexture) -> Result<Field<T>, GpuError> {
        readback::read_field(&self.ctx.device, &self.ctx.queue, target)
    }

    /// Pixels of the offscreen output, `None` when presenting to a window.
    pub fn read_output(&self) -> Option<Result<Vec<[u8; 4]>, GpuError>> {
        let texture = self.offscreen.as_ref()?;
        Some(readback::read_rgba8(
            &self.ctx.device,
            &self.ctx.queue,
            texture,
            texture.size(),
        ))
    }

    fn create(&self, grid: Grid, format: wgpu::TextureFormat, label: &str) -> Result<FieldTexture, FluidError> {
        log::debug!("Creating {} ({}, {:?})", label, grid, format);
        FieldTexture::new(&self.ctx.device, grid, format, label)
    }

    fn draw_display(&self, view: &wgpu::TextureView, dye: &FieldTexture) {
        let uniforms = DisplayUniforms {
            output_size: [self.ctx.config.width as f32, self.ctx.config.height as f32],
            _pad: [0.0; 2],
        };
        self.programs.display.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &uniforms,
            &[&dye.view],
            view,
        );
    }
}

impl FluidBackend for GpuBackend {
    type Scalar = FieldTexture;
    type Vector = FieldTexture;
    type Color = FieldTexture;

    fn create_scalar(&mut self, grid: Grid, label: &str) -> Result<Self::Scalar, FluidError> {
        self.create(grid, SCALAR_FORMAT, label)
    }

    fn create_vector(&mut self, grid: Grid, label: &str) -> Result<Self::Vector, FluidError> {
        self.create(grid, VECTOR_FORMAT, label)
    }

    fn create_color(&mut self, grid: Grid, label: &str) -> Result<Self::Color, FluidError> {
        self.create(grid, COLOR_FORMAT, label)
    }

    fn splat_vector(&mut self, src: &Self::Vector, dst: &mut Self::Vector, params: &SplatParams) {
        self.programs.splat_vector.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &SplatUniforms::from(params),
            &[&src.view],
            &dst.view,
        );
    }

    fn splat_color(&mut self, src: &Self::Color, dst: &mut Self::Color, params: &SplatParams) {
        self.programs.splat_color.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &SplatUniforms::from(params),
            &[&src.view],
            &dst.view,
        );
    }

    fn advect_vector(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Vector,
        dst: &mut Self::Vector,
        params: &AdvectParams,
    ) {
        self.programs.advect_vector.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &AdvectUniforms::from(params),
            &[&velocity.view, &src.view],
            &dst.view,
        );
    }

    fn advect_color(
        &mut self,
        velocity: &Self::Vector,
        src: &Self::Color,
        dst: &mut Self::Color,
        params: &AdvectParams,
    ) {
        self.programs.advect_color.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &AdvectUniforms::from(params),
            &[&velocity.view, &src.view],
            &dst.view,
        );
    }

    fn divergence(&mut self, velocity: &Self::Vector, dst: &mut Self::Scalar, params: &StencilParams) {
        self.programs.divergence.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &StencilUniforms::from(params),
            &[&velocity.view],
            &dst.view,
        );
    }

    fn jacobi(
        &mut self,
        pressure: &Self::Scalar,
        divergence: &Self::Scalar,
        dst: &mut Self::Scalar,
        params: &StencilParams,
    ) {
        self.programs.jacobi.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &StencilUniforms::from(params),
            &[&pressure.view, &divergence.view],
            &dst.view,
        );
    }

    fn subtract_gradient(
        &mut self,
        pressure: &Self::Scalar,
        velocity: &Self::Vector,
        dst: &mut Self::Vector,
        params: &StencilParams,
    ) {
        self.programs.gradient.draw(
            &self.ctx.device,
            &self.ctx.queue,
            &StencilUniforms::from(params),
            &[&pressure.view, &velocity.view],
            &dst.view,
        );
    }

    fn present(&mut self, dye: &Self::Color) -> Result<(), FluidError> {
        if let Some(texture) = &self.offscreen {
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.draw_display(&view, dye);
            return Ok(());
        }

        let Some(surface) = &self.ctx.surface else {
            return Ok(());
        };
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.ctx.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out, skipping present");
                return Ok(());
            }
            Err(e) => return Err(FluidError::Present(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.draw_display(&view, dye);
        frame.present();
        Ok(())
    }
}
