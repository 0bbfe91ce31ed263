//! VR Viewer
//!
//! Opens a window and plays a still frame or a test pattern as flat, 180° or
//! 360° content. Drop an image on the window to play it. `L` cycles the
//! layout, `F` the format, `S` toggles between the flat look-around view and
//! the side-by-side stereo preview.

use std::path::PathBuf;
use std::sync::Arc;

use vr_viewer::driver::FrameReport;
use vr_viewer::telemetry::{init_logging, LogConfig};
use vr_viewer::{
    CliArgs, FlatDriver, FramePass, GpuContext, Layout, LookCamera, PlaybackInfo, RenderTarget,
    Renderer, SideBySideSession, StereoDriver, StereoSession, StillImageSource, TestPatternSource,
    VideoSource, VideoStream, ViewerSettings, WindowSurface,
};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "VR Viewer";
const DRAG_SENSITIVITY: f32 = 0.005;
const TEST_PATTERN_SIZE: (u32, u32) = (2048, 1024);

/// Open the configured media, or a test pattern matching the layout
fn open_source(media: Option<&PathBuf>, layout: Layout) -> Box<dyn VideoSource> {
    if let Some(path) = media {
        match StillImageSource::open(path) {
            Ok(source) => return Box::new(source),
            Err(e) => tracing::warn!("Failed to open {}: {}, showing test pattern", path.display(), e),
        }
    }
    Box::new(TestPatternSource::new(layout, TEST_PATTERN_SIZE.0, TEST_PATTERN_SIZE.1))
}

/// Everything that exists once the window and GPU are up
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    surface: WindowSurface,
    renderer: Renderer,
    stream: VideoStream,
    flat: FlatDriver,
    stereo: StereoDriver,
    session: SideBySideSession,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl Viewer {
    fn new(window: Arc<Window>, settings: &ViewerSettings, media: Option<&PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let (gpu, surface) = pollster::block_on(GpuContext::new(window.clone()))?;

        let renderer = Renderer::new(&gpu.device, gpu.surface_format, settings.layout, settings.format)?;
        tracing::info!(
            "Renderer ready: {} {}, {} indices",
            settings.format,
            settings.layout,
            renderer.index_count()
        );

        let stream = VideoStream::new(&gpu.device, open_source(media, settings.layout));
        let camera = LookCamera::new(settings.field_of_view_degrees);

        Ok(Self {
            window,
            gpu,
            surface,
            renderer,
            stream,
            flat: FlatDriver::new(camera.clone(), settings.screen_distance),
            stereo: StereoDriver::new(settings.screen_distance),
            session: SideBySideSession::new(camera),
            dragging: false,
            last_cursor: None,
        })
    }

    /// Replace the renderer, keeping the current one if construction fails
    fn rebuild_renderer(&mut self, settings: &ViewerSettings) -> bool {
        match Renderer::new(&self.gpu.device, self.gpu.surface_format, settings.layout, settings.format) {
            Ok(renderer) => {
                tracing::info!("Switched to {} {}", settings.format, settings.layout);
                self.renderer = renderer;
                true
            }
            Err(e) => {
                tracing::error!("Failed to rebuild renderer: {}", e);
                false
            }
        }
    }

    /// Switch to a new source; nothing is drawn until its first frame is uploaded
    fn replace_source(&mut self, source: Box<dyn VideoSource>) {
        self.stream = VideoStream::new(&self.gpu.device, source);
    }

    fn camera_mut(&mut self, debug: bool) -> &mut LookCamera {
        if debug {
            self.flat.camera_mut()
        } else {
            self.session.head_mut()
        }
    }

    fn render(&mut self, debug: bool) -> Result<(), wgpu::SurfaceError> {
        self.stream.pump(&self.gpu.device, &self.gpu.queue);

        let output = self.surface.acquire()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = (self.surface.width(), self.surface.height());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("VR Viewer Frame Encoder"),
            });

        let target = RenderTarget::new(&view, width, height);
        Renderer::clear(&mut encoder, &target, wgpu::Color::BLACK);

        // Nothing is sampled until the first frame is in the texture
        if self.stream.is_ready() {
            let (video_width, video_height) = self.stream.dimensions();
            let info = PlaybackInfo::from_renderer(&self.renderer, video_width, video_height);

            let mut pass = FramePass {
                renderer: &self.renderer,
                device: &self.gpu.device,
                queue: &self.gpu.queue,
                encoder: &mut encoder,
                target,
                texture: self.stream.texture().view(),
            };

            let report = if debug {
                self.flat.render_frame(&mut pass, &info, width, height)
            } else {
                match self.session.begin_frame(width, height) {
                    Some(frame) => self.stereo.render_frame(&mut pass, &info, &frame),
                    None => FrameReport::default(),
                }
            };

            if !report.dropped.is_empty() {
                tracing::debug!("Frame incomplete: {:?}", report);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

enum AppState {
    Uninitialized,
    Running(Box<Viewer>),
    Failed,
}

/// Main application handler implementing winit's ApplicationHandler trait
struct VrViewerApp {
    settings: ViewerSettings,
    media: Option<PathBuf>,
    state: AppState,
}

impl VrViewerApp {
    fn new(settings: ViewerSettings, media: Option<PathBuf>) -> Self {
        Self {
            settings,
            media,
            state: AppState::Uninitialized,
        }
    }

    fn handle_key(&mut self, key: Key, event_loop: &ActiveEventLoop) {
        let AppState::Running(viewer) = &mut self.state else {
            return;
        };

        match key.as_ref() {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Character(c) if c.eq_ignore_ascii_case("l") => {
                let previous = self.settings.layout;
                self.settings.layout = previous.next();
                if !viewer.rebuild_renderer(&self.settings) {
                    self.settings.layout = previous;
                } else if self.media.is_none() {
                    // The test pattern is drawn per layout
                    viewer.replace_source(open_source(None, self.settings.layout));
                }
            }
            Key::Character(c) if c.eq_ignore_ascii_case("f") => {
                let previous = self.settings.format;
                self.settings.format = previous.next();
                if !viewer.rebuild_renderer(&self.settings) {
                    self.settings.format = previous;
                }
            }
            Key::Character(c) if c.eq_ignore_ascii_case("s") => {
                self.settings.debug = !self.settings.debug;
                tracing::info!(
                    "{} view",
                    if self.settings.debug { "Flat" } else { "Stereo preview" }
                );
            }
            Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                viewer.camera_mut(self.settings.debug).reset();
            }
            _ => return,
        }

        viewer.window.request_redraw();
    }
}

impl ApplicationHandler for VrViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self.state, AppState::Uninitialized) {
            return;
        }

        tracing::info!("Creating window...");
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                self.state = AppState::Failed;
                event_loop.exit();
                return;
            }
        };

        match Viewer::new(window.clone(), &self.settings, self.media.as_ref()) {
            Ok(viewer) => {
                window.request_redraw();
                self.state = AppState::Running(Box::new(viewer));
            }
            Err(e) => {
                tracing::error!("Failed to start viewer: {}", e);
                self.state = AppState::Failed;
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                self.handle_key(event.logical_key, event_loop);
            }
            other => {
                let debug = self.settings.debug;
                let AppState::Running(viewer) = &mut self.state else {
                    return;
                };

                match other {
                    WindowEvent::DroppedFile(path) => match StillImageSource::open(&path) {
                        Ok(source) => {
                            tracing::info!("Playing dropped file {}", path.display());
                            viewer.replace_source(Box::new(source));
                            self.settings.remember_media(&path);
                            self.media = Some(path);
                            viewer.window.request_redraw();
                        }
                        Err(e) => tracing::warn!("Cannot play {}: {}", path.display(), e),
                    },
                    WindowEvent::Resized(size) => {
                        viewer.surface.resize(&viewer.gpu.device, size.width, size.height);
                        let logical = size.to_logical::<u32>(viewer.window.scale_factor());
                        self.settings.window_width = logical.width;
                        self.settings.window_height = logical.height;
                        viewer.window.request_redraw();
                    }
                    WindowEvent::MouseInput {
                        state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        viewer.dragging = state == ElementState::Pressed;
                        if !viewer.dragging {
                            viewer.last_cursor = None;
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if viewer.dragging {
                            if let Some((x, y)) = viewer.last_cursor {
                                let delta = ((position.x - x) as f32, (position.y - y) as f32);
                                viewer.camera_mut(debug).on_mouse_drag(delta, DRAG_SENSITIVITY);
                                viewer.window.request_redraw();
                            }
                        }
                        viewer.last_cursor = Some((position.x, position.y));
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                        };
                        viewer.camera_mut(debug).on_scroll(amount);
                        viewer.window.request_redraw();
                    }
                    WindowEvent::RedrawRequested => match viewer.render(debug) {
                        Ok(()) => {
                            // Keep pumping until the first frame is on screen
                            if !viewer.stream.is_ready() {
                                viewer.window.request_redraw();
                            }
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            tracing::warn!("Surface lost, reconfiguring...");
                            viewer.surface.reconfigure(&viewer.gpu.device);
                            viewer.window.request_redraw();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("Out of GPU memory!");
                            event_loop.exit();
                        }
                        Err(e) => tracing::warn!("Surface error: {:?}", e),
                    },
                    _ => {}
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppState::Running(viewer) = &self.state {
            self.settings.field_of_view_degrees = viewer.flat.camera().fov_degrees();
        }
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
        if let AppState::Running(viewer) = &mut self.state {
            viewer.session.end();
        }
    }
}

fn main() {
    let log_config = LogConfig::from_env();
    // Keep the guard alive for the program duration
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("VR Viewer v{}", env!("CARGO_PKG_VERSION"));

    let args = CliArgs::parse(std::env::args().skip(1));
    let mut settings = ViewerSettings::load();
    settings.apply_cli(&args);

    let media = args.media.clone().or_else(|| {
        settings
            .last_opened_file
            .as_ref()
            .map(PathBuf::from)
            .filter(|p| p.exists())
    });

    tracing::info!(
        "Format: {}, layout: {}, {} view",
        settings.format,
        settings.layout,
        if settings.debug { "flat" } else { "stereo preview" }
    );

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = VrViewerApp::new(settings, media);
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {}", e);
    }

    if matches!(app.state, AppState::Failed) {
        std::process::exit(1);
    }
}
