//! Render-loop drivers
//!
//! Drivers decide when and how often the player renderer draws. The flat
//! driver draws once per animation frame into the whole window; the stereo
//! driver draws once per eye supplied by a display session. Both only hold a
//! borrowed [`EyeSink`], which in the binary is a [`FramePass`] around the
//! [`Renderer`].

pub mod camera;
pub mod flat;
pub mod session;
pub mod stereo;

use glam::{Mat4, Vec3};

use crate::player::{
    Eye, EyeTransforms, EyeWindows, Format, Layout, RenderProps, RenderTarget, Renderer,
    RendererError,
};

pub use camera::LookCamera;
pub use flat::FlatDriver;
pub use session::{EyeView, SideBySideSession, StereoFrame, StereoSession};
pub use stereo::StereoDriver;

/// Something that can draw one eye of the video surface
pub trait EyeSink {
    fn draw_eye(&mut self, eye: Eye, transforms: EyeTransforms) -> Result<(), RendererError>;
}

/// One frame's GPU context around a renderer
pub struct FramePass<'a> {
    pub renderer: &'a Renderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub target: RenderTarget<'a>,
    /// The current video frame
    pub texture: &'a wgpu::TextureView,
}

impl EyeSink for FramePass<'_> {
    fn draw_eye(&mut self, eye: Eye, transforms: EyeTransforms) -> Result<(), RendererError> {
        let props = RenderProps::new(transforms, self.texture);
        self.renderer
            .draw(self.device, self.queue, self.encoder, &self.target, &props, eye)
    }
}

/// What a driver needs to know about the content being played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackInfo {
    pub format: Format,
    pub windows: EyeWindows,
    /// Per-eye aspect ratio of the video
    pub video_aspect: f32,
}

impl PlaybackInfo {
    pub fn new(format: Format, layout: Layout, video_aspect: f32) -> Self {
        Self {
            format,
            windows: EyeWindows::for_layout(layout),
            video_aspect,
        }
    }

    /// Info for a renderer playing a video of the given size
    ///
    /// Falls back to a square aspect while the size is unknown.
    pub fn from_renderer(renderer: &Renderer, video_width: u32, video_height: u32) -> Self {
        Self {
            format: renderer.format(),
            windows: renderer.tex_coord_windows(),
            video_aspect: renderer.aspect_ratio(video_width, video_height).unwrap_or(1.0),
        }
    }

    /// Model matrix placing the mesh in front of a viewer at the origin
    ///
    /// The flat quad is widened to the video's aspect and pushed
    /// `screen_distance` down -Z; the sphere stays centred on the viewer.
    pub fn model_matrix(&self, screen_distance: f32) -> Mat4 {
        match self.format {
            Format::Screen => {
                Mat4::from_translation(Vec3::new(0.0, 0.0, -screen_distance))
                    * Mat4::from_scale(Vec3::new(self.video_aspect, 1.0, 1.0))
            }
            Format::Fov180 | Format::Fov360 => Mat4::IDENTITY,
        }
    }
}

/// Outcome of one driver frame
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Eyes drawn, in draw order
    pub drawn: Vec<Eye>,
    /// Eyes whose draw was rejected
    pub dropped: Vec<Eye>,
}

impl FrameReport {
    /// Draw one eye, logging and recording a failure instead of propagating it
    pub(crate) fn draw(&mut self, sink: &mut dyn EyeSink, eye: Eye, transforms: EyeTransforms) {
        match sink.draw_eye(eye, transforms) {
            Ok(()) => self.drawn.push(eye),
            Err(e) => {
                tracing::warn!("Dropped {:?} eye draw: {}", eye, e);
                self.dropped.push(eye);
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty() && !self.drawn.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_model_scales_by_aspect() {
        let info = PlaybackInfo::new(Format::Screen, Layout::Mono, 16.0 / 9.0);
        let model = info.model_matrix(2.0);
        let corner = model.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((corner.x - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(corner.y, 1.0);
        assert_eq!(corner.z, -2.0);
    }

    #[test]
    fn test_sphere_model_is_identity() {
        for format in [Format::Fov180, Format::Fov360] {
            let info = PlaybackInfo::new(format, Layout::StereoLeftRight, 0.9);
            assert_eq!(info.model_matrix(2.0), Mat4::IDENTITY);
        }
    }

    #[test]
    fn test_report_completeness() {
        let mut report = FrameReport::default();
        assert!(!report.is_complete());
        report.drawn.push(Eye::Left);
        assert!(report.is_complete());
        report.dropped.push(Eye::Right);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_gpu_draw_failure_marks_eye_dropped() {
        let info = PlaybackInfo::new(Format::Fov180, Layout::StereoLeftRight, 0.9);
        let mut session = SideBySideSession::new(LookCamera::default());
        let frame = session.begin_frame(1920, 1080).expect("active session");
        let mut sink = testing::RecordingSink::new(1920, 1080);
        sink.gpu_rejects = Some(Eye::Left);

        let report = StereoDriver::new(2.0).render_frame(&mut sink, &info, &frame);

        assert_eq!(report.dropped, vec![Eye::Left]);
        assert_eq!(report.drawn, vec![Eye::Right]);
        assert!(!report.is_complete());
    }
}
