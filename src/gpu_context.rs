//! GPU context and window surface
//!
//! `GpuContext` owns the wgpu instance, adapter, device and queue;
//! `WindowSurface` owns the swapchain surface of the viewer window.

use std::sync::Arc;
use winit::window::Window;

/// Errors that can occur while acquiring the GPU
#[derive(Debug)]
pub enum GpuContextError {
    /// The window surface could not be created
    CreateSurface(wgpu::CreateSurfaceError),
    /// No adapter can present to the surface
    NoAdapter,
    /// The adapter refused to create a device
    RequestDevice(wgpu::RequestDeviceError),
}

impl std::fmt::Display for GpuContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuContextError::CreateSurface(e) => write!(f, "Failed to create surface: {}", e),
            GpuContextError::NoAdapter => write!(f, "No suitable GPU adapter found"),
            GpuContextError::RequestDevice(e) => write!(f, "Failed to create device: {}", e),
        }
    }
}

impl std::error::Error for GpuContextError {}

impl From<wgpu::CreateSurfaceError> for GpuContextError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuContextError::CreateSurface(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuContextError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuContextError::RequestDevice(e)
    }
}

/// Shared GPU resources
pub struct GpuContext {
    /// The wgpu instance
    pub instance: wgpu::Instance,
    /// The selected GPU adapter
    pub adapter: wgpu::Adapter,
    /// The GPU device for creating resources
    pub device: wgpu::Device,
    /// The command queue for submitting GPU work
    pub queue: wgpu::Queue,
    /// The preferred surface format (typically sRGB)
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Create the GPU context and the surface of `window`
    pub async fn new(window: Arc<Window>) -> Result<(Self, WindowSurface), GpuContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuContextError::NoAdapter)?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);
        tracing::info!("Backend: {:?}", adapter.get_info().backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("VR Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        // Errors outside an error scope (e.g. a bad draw) are logged, not fatal
        device.on_uncaptured_error(Box::new(|error| {
            tracing::error!("Uncaptured GPU error: {}", error);
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(GpuContextError::NoAdapter)?;

        tracing::info!("Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let gpu = Self {
            instance,
            adapter,
            device,
            queue,
            surface_format,
        };

        Ok((gpu, WindowSurface { surface, config }))
    }
}

/// Swapchain surface of the viewer window
pub struct WindowSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    /// Resize the window surface
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(device, &self.config);
    }

    /// Reconfigure after the surface was lost or outdated
    pub fn reconfigure(&self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
    }

    /// Next swapchain texture
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }
}
