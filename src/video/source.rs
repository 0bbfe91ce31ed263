//! Video sources and first-frame readiness
//!
//! Decoding is not done here. A [`VideoSource`] hands over ready RGBA frames;
//! [`VideoStream`] uploads them and reports readiness once the first frame is
//! actually on the GPU, so drivers never sample an empty texture.

use std::path::Path;

use crate::player::{Eye, EyeWindows, Layout};

use super::{DecodedFrame, VideoTexture};

/// Errors that can occur while opening a source
#[derive(Debug)]
pub enum SourceError {
    /// The image could not be read or decoded
    Image(image::ImageError),
    /// The source has no pixels
    EmptyFrame,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Image(e) => write!(f, "Failed to load image: {}", e),
            SourceError::EmptyFrame => write!(f, "Source frame has no pixels"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Image(e) => Some(e),
            SourceError::EmptyFrame => None,
        }
    }
}

impl From<image::ImageError> for SourceError {
    fn from(e: image::ImageError) -> Self {
        SourceError::Image(e)
    }
}

/// Supplier of video frames
pub trait VideoSource {
    /// Human readable name for logs
    fn name(&self) -> &str;

    /// Frame size, once known
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Next frame to show, if a new one is available
    fn poll_frame(&mut self) -> Option<DecodedFrame>;
}

/// Source serving a single still frame loaded from an image file
pub struct StillImageSource {
    name: String,
    width: u32,
    height: u32,
    pending: Option<DecodedFrame>,
}

impl StillImageSource {
    /// Load a PNG/JPEG/... file
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        tracing::info!("Loaded still frame {} ({}x{})", name, width, height);

        Self::from_rgba(name, image.into_raw(), width, height)
    }

    /// Wrap raw RGBA8 pixels
    pub fn from_rgba(
        name: impl Into<String>,
        data: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<Self, SourceError> {
        let frame = DecodedFrame::new(data, width, height, 0);
        if !frame.is_valid() {
            return Err(SourceError::EmptyFrame);
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            pending: Some(frame),
        })
    }
}

impl VideoSource for StillImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn poll_frame(&mut self) -> Option<DecodedFrame> {
        self.pending.take()
    }
}

/// Generated frame that tints each eye's region differently
///
/// Left-eye texels are red-dominant, right-eye texels blue-dominant, with a
/// grid every 1/16 of the frame. Useful for checking eye windows without
/// media.
pub struct TestPatternSource {
    layout: Layout,
    width: u32,
    height: u32,
    emitted: bool,
}

impl TestPatternSource {
    pub fn new(layout: Layout, width: u32, height: u32) -> Self {
        Self {
            layout,
            width: width.max(1),
            height: height.max(1),
            emitted: false,
        }
    }

    /// Eye whose window contains a normalized frame coordinate
    fn eye_at(windows: &EyeWindows, u: f32, v: f32) -> Eye {
        let right = windows.right;
        let inside_right = u >= right.offset.x
            && u < right.offset.x + right.scale.x
            && v >= right.offset.y
            && v < right.offset.y + right.scale.y;
        if inside_right && windows.right != windows.left {
            Eye::Right
        } else {
            Eye::Left
        }
    }

    /// Render the pattern
    pub fn render(&self) -> DecodedFrame {
        let windows = EyeWindows::for_layout(self.layout);
        let mut data = Vec::with_capacity(DecodedFrame::expected_size(self.width, self.height));

        for y in 0..self.height {
            let v = (y as f32 + 0.5) / self.height as f32;
            for x in 0..self.width {
                let u = (x as f32 + 0.5) / self.width as f32;
                let on_grid = (u * 16.0).fract() < 0.02 || (v * 16.0).fract() < 0.02;

                let pixel = if on_grid {
                    [255, 255, 255, 255]
                } else {
                    let shade = (64.0 + 160.0 * v) as u8;
                    match Self::eye_at(&windows, u, v) {
                        Eye::Left => [shade, (96.0 * u) as u8, 32, 255],
                        Eye::Right => [32, (96.0 * u) as u8, shade, 255],
                    }
                };
                data.extend_from_slice(&pixel);
            }
        }

        DecodedFrame::new(data, self.width, self.height, 0)
    }
}

impl VideoSource for TestPatternSource {
    fn name(&self) -> &str {
        "test pattern"
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn poll_frame(&mut self) -> Option<DecodedFrame> {
        if self.emitted {
            return None;
        }
        self.emitted = true;
        Some(self.render())
    }
}

/// Readiness event for a video stream
///
/// Opens when the first frame has been uploaded. Stays open until `reset`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FirstFrameGate {
    frames_uploaded: u64,
}

impl FirstFrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an uploaded frame; returns `true` on the frame that opens the gate
    pub fn mark_uploaded(&mut self) -> bool {
        self.frames_uploaded += 1;
        self.frames_uploaded == 1
    }

    /// Whether at least one frame is on the GPU
    pub fn is_ready(&self) -> bool {
        self.frames_uploaded > 0
    }

    /// Frames uploaded since the last reset
    pub fn frames_uploaded(&self) -> u64 {
        self.frames_uploaded
    }

    /// Close the gate, e.g. when a new source is loaded
    pub fn reset(&mut self) {
        self.frames_uploaded = 0;
    }
}

/// A source bound to the GPU texture it feeds
pub struct VideoStream {
    source: Box<dyn VideoSource>,
    texture: VideoTexture,
    gate: FirstFrameGate,
}

impl VideoStream {
    pub fn new(device: &wgpu::Device, source: Box<dyn VideoSource>) -> Self {
        let (width, height) = source.dimensions().unwrap_or((1, 1));
        tracing::info!("Opening video stream '{}'", source.name());
        Self {
            texture: VideoTexture::new(device, width, height),
            source,
            gate: FirstFrameGate::new(),
        }
    }

    /// Upload the source's newest frame, if any
    ///
    /// Returns `true` when this call made the stream ready.
    pub fn pump(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let Some(frame) = self.source.poll_frame() else {
            return false;
        };
        if !self.texture.upload(device, queue, &frame) {
            return false;
        }
        let opened = self.gate.mark_uploaded();
        if opened {
            tracing::info!(
                "First frame of '{}' ready ({}x{})",
                self.source.name(),
                frame.width,
                frame.height
            );
        }
        opened
    }

    /// Whether a frame is available for sampling
    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Size of the frames currently in the texture
    pub fn dimensions(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    pub fn texture(&self) -> &VideoTexture {
        &self.texture
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_opens_once() {
        let mut gate = FirstFrameGate::new();
        assert!(!gate.is_ready());
        assert!(gate.mark_uploaded());
        assert!(!gate.mark_uploaded());
        assert!(gate.is_ready());
        assert_eq!(gate.frames_uploaded(), 2);

        gate.reset();
        assert!(!gate.is_ready());
        assert!(gate.mark_uploaded());
    }

    #[test]
    fn test_still_image_serves_one_frame() {
        let data = vec![10u8; DecodedFrame::expected_size(4, 2)];
        let mut source = StillImageSource::from_rgba("still", data, 4, 2).expect("valid frame");
        assert_eq!(source.dimensions(), Some((4, 2)));
        let frame = source.poll_frame().expect("first poll yields the frame");
        assert!(frame.is_valid());
        assert!(source.poll_frame().is_none());
    }

    #[test]
    fn test_still_image_rejects_empty() {
        assert!(matches!(
            StillImageSource::from_rgba("empty", Vec::new(), 0, 0),
            Err(SourceError::EmptyFrame)
        ));
    }

    #[test]
    fn test_missing_image_file_is_an_error() {
        let result = StillImageSource::open(Path::new("/nonexistent/frame.png"));
        assert!(matches!(result, Err(SourceError::Image(_))));
    }

    #[test]
    fn test_pattern_tints_left_right_halves() {
        let source = TestPatternSource::new(Layout::StereoLeftRight, 64, 32);
        let frame = source.render();
        assert!(frame.is_valid());

        // Centre of each quarter, off the grid lines
        let left = frame.pixel(17, 17).expect("in frame");
        let right = frame.pixel(49, 17).expect("in frame");
        assert!(left[0] > left[2]);
        assert!(right[2] > right[0]);
    }

    #[test]
    fn test_pattern_tints_top_bottom_halves() {
        let frame = TestPatternSource::new(Layout::StereoTopBottom, 32, 64).render();
        let top = frame.pixel(17, 17).expect("in frame");
        let bottom = frame.pixel(17, 49).expect("in frame");
        assert!(top[0] > top[2]);
        assert!(bottom[2] > bottom[0]);
    }

    #[test]
    fn test_pattern_mono_is_single_eye() {
        let frame = TestPatternSource::new(Layout::Mono, 32, 32).render();
        let a = frame.pixel(5, 5).expect("in frame");
        let b = frame.pixel(27, 27).expect("in frame");
        assert!(a[0] > a[2]);
        assert!(b[0] > b[2]);
    }

    #[test]
    fn test_pattern_emits_once() {
        let mut source = TestPatternSource::new(Layout::Mono, 8, 8);
        assert!(source.poll_frame().is_some());
        assert!(source.poll_frame().is_none());
    }
}
