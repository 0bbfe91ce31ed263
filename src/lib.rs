//! VR Viewer Library
//!
//! Plays flat, 180° and 360° video, mono or stereo, by drawing a single
//! video texture onto a quad or an inward-facing sphere with per-eye
//! texture-coordinate windows.

pub mod driver;
pub mod gpu_context;
pub mod player;
pub mod settings;
pub mod telemetry;
pub mod video;

pub use driver::{EyeSink, FlatDriver, FramePass, LookCamera, PlaybackInfo, SideBySideSession, StereoDriver, StereoSession};
pub use gpu_context::{GpuContext, GpuContextError, WindowSurface};
pub use player::{Eye, EyeTransforms, EyeWindows, Format, Layout, RenderProps, RenderTarget, Renderer, RendererError, TexCoordWindow, Viewport};
pub use settings::{CliArgs, SettingsError, ViewerSettings};
pub use video::{DecodedFrame, StillImageSource, TestPatternSource, VideoSource, VideoStream, VideoTexture};
