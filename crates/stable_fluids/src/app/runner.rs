use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use sim2d::{Simulation, SurfaceSize};

use super::{config::AppConfig, input::PointerTracker};
use crate::error::AppError;
use crate::gpu::{self, GpuBackend, GpuContext};

/// Open a window and step the simulation until it is closed.
///
/// The first fatal error stops the event loop and is returned.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut runner = AppRunner::new(config);
    event_loop.run_app(&mut runner)?;
    match runner.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct FluidApp {
    window: Arc<Window>,
    backend: GpuBackend,
    sim: Simulation<GpuBackend>,
}

impl FluidApp {
    fn init(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, AppError> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(config.window.title.clone())
                    .with_inner_size(LogicalSize::new(config.window.width, config.window.height)),
            )?,
        );

        let ctx = pollster::block_on(GpuContext::new(window.clone()))?;
        let mut backend = GpuBackend::new(ctx)?;
        let surface = surface_size(&window);
        let sim = Simulation::new(&mut backend, config.fluid.clone(), surface)?;
        log::info!(
            "Simulation ready: {}x{} surface, {} pressure iterations",
            surface.width,
            surface.height,
            config.fluid.pressure_iterations
        );

        Ok(Self {
            window,
            backend,
            sim,
        })
    }

    fn frame(&mut self, input: &mut PointerTracker) -> Result<(), AppError> {
        if gpu::is_device_lost() {
            log::error!("GPU device lost, stopping");
            return Err(AppError::DeviceLost);
        }
        let pointer = input.take_frame();
        self.sim
            .step(&mut self.backend, surface_size(&self.window), &pointer)?;
        Ok(())
    }
}

fn surface_size(window: &Window) -> SurfaceSize {
    let size = window.inner_size();
    SurfaceSize::new(size.width, size.height)
}

struct AppRunner {
    config: AppConfig,
    app: Option<FluidApp>,
    input: PointerTracker,
    error: Option<AppError>,
}

impl AppRunner {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            app: None,
            input: PointerTracker::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() && self.error.is_none() {
            match FluidApp::init(event_loop, &self.config) {
                Ok(app) => self.app = Some(app),
                Err(error) => self.fail(event_loop, error),
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(app) = &mut self.app else {
            return;
        };
        match event {
            WindowEvent::Resized(size) => {
                log::info!("Window resized to {}x{}", size.width, size.height);
                app.backend.resize_surface(size.width, size.height);
                app.window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.input.pressed(),
                ElementState::Released => self.input.released(),
            },
            WindowEvent::Touch(touch) => {
                self.input
                    .touch(touch.phase, touch.location.x as f32, touch.location.y as f32);
            }
            WindowEvent::RedrawRequested => {
                if let Err(error) = app.frame(&mut self.input) {
                    self.fail(event_loop, error);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}
