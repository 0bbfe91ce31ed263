//! Flat-screen (debug) driver
//!
//! Draws the left eye's image once per animation frame into the whole
//! surface, seen through a [`LookCamera`].

use crate::player::{Eye, EyeTransforms, Viewport};

use super::{EyeSink, FrameReport, LookCamera, PlaybackInfo};

/// Driver for a window repainted once per animation frame
pub struct FlatDriver {
    camera: LookCamera,
    screen_distance: f32,
}

impl FlatDriver {
    pub fn new(camera: LookCamera, screen_distance: f32) -> Self {
        Self {
            camera,
            screen_distance,
        }
    }

    /// Transforms for the single full-surface draw
    pub fn eye_transforms(&self, info: &PlaybackInfo, surface_width: u32, surface_height: u32) -> EyeTransforms {
        let viewport = Viewport::full(surface_width, surface_height);
        EyeTransforms {
            model: info.model_matrix(self.screen_distance),
            view: self.camera.view_matrix(),
            projection: self.camera.projection_for_aspect(viewport.aspect()),
            tex_coord_scale_offset: info.windows.for_eye(Eye::Left),
            viewport,
        }
    }

    /// Draw one frame
    pub fn render_frame(
        &mut self,
        sink: &mut dyn EyeSink,
        info: &PlaybackInfo,
        surface_width: u32,
        surface_height: u32,
    ) -> FrameReport {
        self.camera
            .set_aspect(Viewport::full(surface_width, surface_height).aspect());

        let mut report = FrameReport::default();
        let transforms = self.eye_transforms(info, surface_width, surface_height);
        report.draw(sink, Eye::Left, transforms);
        report
    }

    pub fn camera(&self) -> &LookCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut LookCamera {
        &mut self.camera
    }
}
