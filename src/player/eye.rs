//! Per-eye texture windows and aspect ratio correction
//!
//! A stereo frame packs both eye images into one texture. Each eye samples
//! its half through a scale/offset window: `uv' = uv * scale + offset`.

use glam::{Vec2, Vec4};

use super::types::Layout;

/// One of the two rendered viewpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Both eyes in draw order
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    /// Slot index (left = 0, right = 1)
    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    /// Eye for a slot index; anything past 0 is the right eye
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Eye::Left
        } else {
            Eye::Right
        }
    }
}

/// Texture coordinate scale/offset selecting one eye's region of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoordWindow {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl TexCoordWindow {
    /// Full-frame window
    pub const IDENTITY: Self = Self::new(Vec2::ONE, Vec2::ZERO);

    pub const fn new(scale: Vec2, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    /// Map a full-frame coordinate into this window
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        uv * self.scale + self.offset
    }

    /// Packed as `scale.xy, offset.xy` for the shader uniform
    pub fn to_scale_offset(&self) -> [f32; 4] {
        Vec4::new(self.scale.x, self.scale.y, self.offset.x, self.offset.y).to_array()
    }

    /// Whether every component is finite
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.offset.is_finite()
    }
}

impl Default for TexCoordWindow {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The left and right sampling windows for a layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeWindows {
    pub left: TexCoordWindow,
    pub right: TexCoordWindow,
}

impl EyeWindows {
    /// Windows for a layout
    ///
    /// Top/bottom gives the top half to the left eye, left/right gives the
    /// left half to the left eye, mono gives the whole frame to both.
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::StereoTopBottom => Self {
                left: TexCoordWindow::new(Vec2::new(1.0, 0.5), Vec2::new(0.0, 0.0)),
                right: TexCoordWindow::new(Vec2::new(1.0, 0.5), Vec2::new(0.0, 0.5)),
            },
            Layout::StereoLeftRight => Self {
                left: TexCoordWindow::new(Vec2::new(0.5, 1.0), Vec2::new(0.0, 0.0)),
                right: TexCoordWindow::new(Vec2::new(0.5, 1.0), Vec2::new(0.5, 0.0)),
            },
            Layout::Mono => Self {
                left: TexCoordWindow::IDENTITY,
                right: TexCoordWindow::IDENTITY,
            },
        }
    }

    /// Window for one eye
    pub fn for_eye(&self, eye: Eye) -> TexCoordWindow {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }
}

/// Per-eye aspect ratio of a packed video frame
///
/// Dimensions must be positive; see [`try_aspect_ratio`] for unchecked input.
pub fn aspect_ratio(layout: Layout, video_width: u32, video_height: u32) -> f32 {
    let width = video_width as f32;
    let height = video_height as f32;
    match layout {
        Layout::StereoTopBottom => (width / height) * 0.5,
        Layout::StereoLeftRight => (width * 0.5) / height,
        Layout::Mono => width / height,
    }
}

/// [`aspect_ratio`] that returns `None` for empty dimensions
pub fn try_aspect_ratio(layout: Layout, video_width: u32, video_height: u32) -> Option<f32> {
    if video_width == 0 || video_height == 0 {
        return None;
    }
    Some(aspect_ratio(layout, video_width, video_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_mono_windows_are_identity() {
        let windows = EyeWindows::for_layout(Layout::Mono);
        assert_eq!(windows.left, TexCoordWindow::IDENTITY);
        assert_eq!(windows.right, TexCoordWindow::IDENTITY);
    }

    #[test]
    fn test_stereo_windows_tile_the_frame() {
        let tb = EyeWindows::for_layout(Layout::StereoTopBottom);
        assert_eq!(tb.left.offset.y + tb.left.scale.y, tb.right.offset.y);
        assert_eq!(tb.right.offset.y + tb.right.scale.y, 1.0);
        assert_eq!(tb.left.scale.x, 1.0);
        assert_eq!(tb.right.offset.x, 0.0);

        let lr = EyeWindows::for_layout(Layout::StereoLeftRight);
        assert_eq!(lr.left.offset.x + lr.left.scale.x, lr.right.offset.x);
        assert_eq!(lr.right.offset.x + lr.right.scale.x, 1.0);
        assert_eq!(lr.left.scale.y, 1.0);
        assert_eq!(lr.right.offset.y, 0.0);
    }

    #[test]
    fn test_windows_map_into_unit_square() {
        for layout in Layout::all() {
            let windows = EyeWindows::for_layout(*layout);
            for eye in Eye::BOTH {
                let window = windows.for_eye(eye);
                for corner in [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE] {
                    let mapped = window.apply(corner);
                    assert!(mapped.cmpge(Vec2::ZERO).all() && mapped.cmple(Vec2::ONE).all());
                }
            }
        }
    }

    #[test]
    fn test_scale_offset_packing() {
        let windows = EyeWindows::for_layout(Layout::StereoLeftRight);
        assert_eq!(windows.right.to_scale_offset(), [0.5, 1.0, 0.5, 0.0]);
        let windows = EyeWindows::for_layout(Layout::StereoTopBottom);
        assert_eq!(windows.right.to_scale_offset(), [1.0, 0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_aspect_ratio_per_layout() {
        assert!(approx(aspect_ratio(Layout::Mono, 1920, 1080), 1920.0 / 1080.0));
        assert!(approx(aspect_ratio(Layout::StereoLeftRight, 3840, 2160), 1920.0 / 2160.0));
        assert!(approx(aspect_ratio(Layout::StereoTopBottom, 3840, 2160), 3840.0 / 2160.0 * 0.5));
    }

    #[test]
    fn test_stereo_aspect_is_half_of_mono() {
        for (w, h) in [(1, 1), (1920, 1080), (3840, 2160), (4096, 4096), (7, 13)] {
            let mono = aspect_ratio(Layout::Mono, w, h);
            assert!(mono > 0.0);
            assert!(approx(aspect_ratio(Layout::StereoLeftRight, w, h), mono * 0.5));
            assert!(approx(aspect_ratio(Layout::StereoTopBottom, w, h), mono * 0.5));
        }
    }

    #[test]
    fn test_try_aspect_ratio_rejects_empty() {
        assert_eq!(try_aspect_ratio(Layout::Mono, 0, 1080), None);
        assert_eq!(try_aspect_ratio(Layout::Mono, 1920, 0), None);
        assert!(try_aspect_ratio(Layout::Mono, 1920, 1080).is_some());
    }

    #[test]
    fn test_eye_index_round_trip() {
        for eye in Eye::BOTH {
            assert_eq!(Eye::from_index(eye.index()), eye);
        }
    }
}
