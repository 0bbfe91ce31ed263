//! Stereo display session contract
//!
//! A session supplies, per device frame, one view/projection/viewport per
//! eye. [`SideBySideSession`] stands in for a head-mounted display by
//! splitting a flat window into two eye halves.

use glam::{Mat4, Vec3};

use crate::player::{Eye, Viewport};

use super::LookCamera;

/// Average human inter-pupillary distance in metres
pub const DEFAULT_IPD: f32 = 0.063;

/// One eye's view as reported by the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeView {
    pub eye: Eye,
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: Viewport,
}

/// Views for one device frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoFrame {
    pub views: Vec<EyeView>,
}

impl StereoFrame {
    /// First view supplied for an eye
    pub fn view_for(&self, eye: Eye) -> Option<&EyeView> {
        self.views.iter().find(|v| v.eye == eye)
    }
}

/// Source of per-frame eye views from a stereo display
pub trait StereoSession {
    /// Whether the display is ready to present
    fn is_ready(&self) -> bool;

    /// Views for the next frame, `None` when nothing should be drawn
    fn begin_frame(&mut self, surface_width: u32, surface_height: u32) -> Option<StereoFrame>;

    /// Stop presenting
    fn end(&mut self);
}

/// Simulated head-mounted display on a flat window
///
/// Both eyes share the head orientation of a [`LookCamera`] and are offset
/// by half the IPD along the head's X axis.
pub struct SideBySideSession {
    head: LookCamera,
    ipd: f32,
    active: bool,
}

impl SideBySideSession {
    pub fn new(head: LookCamera) -> Self {
        Self::with_ipd(head, DEFAULT_IPD)
    }

    pub fn with_ipd(head: LookCamera, ipd: f32) -> Self {
        Self {
            head,
            ipd,
            active: true,
        }
    }

    /// View matrix of one eye
    pub fn eye_view_matrix(&self, eye: Eye) -> Mat4 {
        let half = self.ipd * 0.5;
        let offset = match eye {
            Eye::Left => Vec3::new(-half, 0.0, 0.0),
            Eye::Right => Vec3::new(half, 0.0, 0.0),
        };
        Mat4::from_translation(-offset) * self.head.view_matrix()
    }

    pub fn head(&self) -> &LookCamera {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut LookCamera {
        &mut self.head
    }
}

impl StereoSession for SideBySideSession {
    fn is_ready(&self) -> bool {
        self.active
    }

    fn begin_frame(&mut self, surface_width: u32, surface_height: u32) -> Option<StereoFrame> {
        if !self.active || surface_width < 2 || surface_height == 0 {
            return None;
        }

        let views = Eye::BOTH
            .iter()
            .map(|&eye| {
                let viewport = Viewport::side_by_side(eye, surface_width, surface_height);
                EyeView {
                    eye,
                    view: self.eye_view_matrix(eye),
                    projection: self.head.projection_for_aspect(viewport.aspect()),
                    viewport,
                }
            })
            .collect();

        Some(StereoFrame { views })
    }

    fn end(&mut self) {
        if self.active {
            tracing::info!("Side-by-side session ended");
        }
        self.active = false;
    }
}
