pub mod backend;
pub mod programs;
pub mod readback;
pub mod target;

pub use backend::GpuBackend;
pub use target::FieldTexture;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use wgpu::SurfaceTarget;
use winit::window::Window;

use crate::error::AppError;
use sim2d::FluidError;

/// Field formats: divergence/pressure, velocity, dye.
pub const SCALAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
pub const VECTOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Output format when rendering without a window.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Set when a readback channel dies or the device reports out-of-memory.
static DEVICE_LOST: AtomicBool = AtomicBool::new(false);

pub fn is_device_lost() -> bool {
    DEVICE_LOST.load(Ordering::SeqCst)
}

/// Clear the flag once a fresh device exists.
pub fn reset_device_lost() {
    DEVICE_LOST.store(false, Ordering::SeqCst);
}

/// Readback failures.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("device lost before readback")]
    DeviceLost,

    #[error("staging buffer map failed: {0}")]
    BufferMapFailed(#[from] wgpu::BufferAsyncError),

    #[error("staging buffer callback dropped without a result")]
    ChannelDisconnected,
}

/// Block on the map callback of a staging buffer.
///
/// A dropped callback means the device went away, so the lost flag is set.
pub fn await_buffer_map(rx: mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>) -> Result<(), GpuError> {
    if is_device_lost() {
        return Err(GpuError::DeviceLost);
    }
    match rx.recv() {
        Ok(result) => Ok(result?),
        Err(_) => {
            log::error!("Staging buffer callback dropped, marking device lost");
            DEVICE_LOST.store(true, Ordering::SeqCst);
            Err(GpuError::ChannelDisconnected)
        }
    }
}

/// Fail with a distinct error if the adapter cannot render into and read
/// back float field textures.
pub fn check_capabilities(adapter: &wgpu::Adapter) -> Result<(), FluidError> {
    let required = wgpu::TextureUsages::RENDER_ATTACHMENT
        | wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_SRC;
    for format in [SCALAR_FORMAT, VECTOR_FORMAT, COLOR_FORMAT] {
        let features = adapter.get_texture_format_features(format);
        if !features.allowed_usages.contains(required) {
            return Err(FluidError::MissingCapability(format!(
                "{:?} is not renderable on this adapter (allowed usages {:?})",
                format, features.allowed_usages
            )));
        }
    }
    Ok(())
}

/// Central GPU context holding device, queue, and (when windowed) surface
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: Option<wgpu::Surface<'static>>,
    pub config: wgpu::SurfaceConfiguration,
    pub size: (u32, u32),
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> Result<Self, AppError> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(SurfaceTarget::from(window.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(AppError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info());
        check_capabilities(&adapter)?;
        let (device, queue) = Self::request_device(&adapter).await?;

        // Dye is written as display values, so skip the sRGB encode.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| FluidError::MissingCapability("surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface: Some(surface),
            config,
            size: (width, height),
        })
    }

    /// Context without a window; frames are composited into an offscreen texture.
    pub async fn headless(width: u32, height: u32) -> Result<Self, AppError> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(AppError::NoAdapter)?;

        log::info!("Using GPU (headless): {:?}", adapter.get_info());
        check_capabilities(&adapter)?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: OFFSCREEN_FORMAT,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface: None,
            config,
            size: (width, height),
        })
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue), AppError> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Fluid Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("GPU uncaptured error: {:?}", error);
            if matches!(error, wgpu::Error::OutOfMemory { .. }) {
                DEVICE_LOST.store(true, Ordering::SeqCst);
            }
        }));

        reset_device_lost();

        Ok((device, queue))
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            if let Some(surface) = &self.surface {
                surface.configure(&self.device, &self.config);
            }
        }
    }

    /// Re-apply the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test, since the lost flag is process-wide.
    #[test]
    fn test_await_buffer_map_results() {
        let (tx, rx) = mpsc::channel();
        tx.send(Err(wgpu::BufferAsyncError)).unwrap();
        assert!(matches!(await_buffer_map(rx), Err(GpuError::BufferMapFailed(_))));
        assert!(!is_device_lost());

        let (tx, rx) = mpsc::channel();
        drop(tx);
        let err = await_buffer_map(rx).unwrap_err();
        assert!(matches!(err, GpuError::ChannelDisconnected));
        assert!(is_device_lost());

        // Later readbacks fail fast until the flag is cleared
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(())).unwrap();
        assert!(matches!(await_buffer_map(rx), Err(GpuError::DeviceLost)));
        assert_eq!(GpuError::DeviceLost.to_string(), "device lost before readback");

        reset_device_lost();
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(())).unwrap();
        assert!(await_buffer_map(rx).is_ok());
    }
}
