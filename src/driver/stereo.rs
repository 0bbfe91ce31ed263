//! Stereo display driver
//!
//! Draws each eye supplied by a [`StereoSession`](super::StereoSession)
//! frame into its own viewport, always left before right.

use crate::player::{Eye, EyeTransforms};

use super::{EyeSink, FrameReport, PlaybackInfo, StereoFrame};

/// Driver for a display that hands out per-eye views every frame
pub struct StereoDriver {
    screen_distance: f32,
}

impl StereoDriver {
    pub fn new(screen_distance: f32) -> Self {
        Self { screen_distance }
    }

    /// Draw one device frame
    ///
    /// Eyes missing from the frame are skipped. Mono content is still drawn
    /// for both eyes with the same full-frame window.
    pub fn render_frame(
        &mut self,
        sink: &mut dyn EyeSink,
        info: &PlaybackInfo,
        frame: &StereoFrame,
    ) -> FrameReport {
        let model = info.model_matrix(self.screen_distance);
        let mut report = FrameReport::default();

        for eye in Eye::BOTH {
            let Some(view) = frame.view_for(eye) else {
                continue;
            };
            let transforms = EyeTransforms {
                model,
                view: view.view,
                projection: view.projection,
                tex_coord_scale_offset: info.windows.for_eye(eye),
                viewport: view.viewport,
            };
            report.draw(sink, eye, transforms);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::RecordingSink;
    use crate::driver::{EyeView, LookCamera, SideBySideSession, StereoSession};
    use crate::player::{Format, Layout, TexCoordWindow, Viewport};
    use glam::Mat4;

    fn view(eye: Eye, viewport: Viewport) -> EyeView {
        EyeView {
            eye,
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_rh(1.5, 1.0, 0.1, 10.0),
            viewport,
        }
    }

    #[test]
    fn test_draws_left_before_right_whatever_the_session_order() {
        let frame = StereoFrame {
            views: vec![
                view(Eye::Right, Viewport::new(960, 0, 960, 1080)),
                view(Eye::Left, Viewport::new(0, 0, 960, 1080)),
            ],
        };
        let info = PlaybackInfo::new(Format::Fov180, Layout::StereoLeftRight, 0.8889);
        let mut sink = RecordingSink::new(1920, 1080);

        let report = StereoDriver::new(2.0).render_frame(&mut sink, &info, &frame);

        assert_eq!(report.drawn, vec![Eye::Left, Eye::Right]);
        let (first, left) = &sink.draws[0];
        let (second, right) = &sink.draws[1];
        assert_eq!((*first, *second), (Eye::Left, Eye::Right));
        assert_eq!(left.viewport.x, 0);
        assert_eq!(right.viewport.x, 960);
        assert_eq!(left.tex_coord_scale_offset.to_scale_offset(), [0.5, 1.0, 0.0, 0.0]);
        assert_eq!(right.tex_coord_scale_offset.to_scale_offset(), [0.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_mono_draws_both_eyes_with_identity_window() {
        let mut session = SideBySideSession::new(LookCamera::default());
        let frame = session.begin_frame(1920, 1080).expect("active session");
        let info = PlaybackInfo::new(Format::Fov360, Layout::Mono, 2.0);
        let mut sink = RecordingSink::new(1920, 1080);

        let report = StereoDriver::new(2.0).render_frame(&mut sink, &info, &frame);

        assert!(report.is_complete());
        assert_eq!(sink.draws.len(), 2);
        for (_, transforms) in &sink.draws {
            assert_eq!(transforms.tex_coord_scale_offset, TexCoordWindow::IDENTITY);
        }
    }

    #[test]
    fn test_missing_eye_is_skipped() {
        let frame = StereoFrame {
            views: vec![view(Eye::Right, Viewport::new(0, 0, 100, 100))],
        };
        let info = PlaybackInfo::new(Format::Screen, Layout::StereoTopBottom, 1.0);
        let mut sink = RecordingSink::new(100, 100);

        let report = StereoDriver::new(2.0).render_frame(&mut sink, &info, &frame);

        assert_eq!(report.drawn, vec![Eye::Right]);
        assert_eq!(
            sink.draws[0].1.tex_coord_scale_offset.to_scale_offset(),
            [1.0, 0.5, 0.0, 0.5]
        );
    }

    #[test]
    fn test_bad_eye_does_not_stop_the_other() {
        let frame = StereoFrame {
            views: vec![
                view(Eye::Left, Viewport::new(0, 0, 0, 0)),
                view(Eye::Right, Viewport::new(50, 0, 50, 100)),
            ],
        };
        let info = PlaybackInfo::new(Format::Fov180, Layout::StereoLeftRight, 1.0);
        let mut sink = RecordingSink::new(100, 100);

        let report = StereoDriver::new(2.0).render_frame(&mut sink, &info, &frame);

        assert_eq!(report.dropped, vec![Eye::Left]);
        assert_eq!(report.drawn, vec![Eye::Right]);
    }
}
