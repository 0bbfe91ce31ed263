//! Player types
//!
//! Defines the projection format and stereo layout of the source video.
//! Both are fixed for the lifetime of a [`Renderer`](super::Renderer).

use serde::{Deserialize, Serialize};

/// Projection type of the source video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Format {
    /// Flat video shown on a quad in front of the viewer
    #[default]
    #[serde(rename = "screen")]
    Screen,
    /// Hemispherical video, mapped onto the front half of the sphere
    #[serde(rename = "180")]
    Fov180,
    /// Full spherical video
    #[serde(rename = "360")]
    Fov360,
}

impl Format {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Format::Screen => "Screen",
            Format::Fov180 => "180°",
            Format::Fov360 => "360°",
        }
    }

    /// Get all formats for iteration
    pub fn all() -> &'static [Format] {
        &[Format::Screen, Format::Fov180, Format::Fov360]
    }

    /// Next format in [`Format::all`] order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Format::Screen => Format::Fov180,
            Format::Fov180 => Format::Fov360,
            Format::Fov360 => Format::Screen,
        }
    }

    /// Whether this format is drawn on the sphere mesh
    pub fn is_spherical(&self) -> bool {
        matches!(self, Format::Fov180 | Format::Fov360)
    }

    /// Parse a format name.
    ///
    /// Unknown names fall back to [`Format::Screen`] so a bad value never
    /// stops playback.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "screen" | "flat" => Format::Screen,
            "180" | "fov180" | "180°" | "vr180" => Format::Fov180,
            "360" | "fov360" | "360°" | "vr360" => Format::Fov360,
            other => {
                tracing::warn!("Unknown format '{}', falling back to screen", other);
                Format::Screen
            }
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Packing of the left/right eye images inside one video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Layout {
    /// Single image shown to both eyes
    #[default]
    #[serde(rename = "mono")]
    Mono,
    /// Left eye in the left half, right eye in the right half
    #[serde(rename = "stereoLeftRight")]
    StereoLeftRight,
    /// Left eye in the top half, right eye in the bottom half
    #[serde(rename = "stereoTopBottom")]
    StereoTopBottom,
}

impl Layout {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Layout::Mono => "Mono",
            Layout::StereoLeftRight => "Left | Right",
            Layout::StereoTopBottom => "Top | Bottom",
        }
    }

    /// Get all layouts for iteration
    pub fn all() -> &'static [Layout] {
        &[Layout::Mono, Layout::StereoLeftRight, Layout::StereoTopBottom]
    }

    /// Next layout in [`Layout::all`] order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Layout::Mono => Layout::StereoLeftRight,
            Layout::StereoLeftRight => Layout::StereoTopBottom,
            Layout::StereoTopBottom => Layout::Mono,
        }
    }

    /// Whether the frame carries two distinct eye images
    pub fn is_stereo(&self) -> bool {
        !matches!(self, Layout::Mono)
    }

    /// Parse a layout name.
    ///
    /// Unknown names fall back to [`Layout::Mono`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mono" => Layout::Mono,
            "stereoleftright" | "left-right" | "leftright" | "sbs" | "lr" => {
                Layout::StereoLeftRight
            }
            "stereotopbottom" | "top-bottom" | "topbottom" | "tb" | "ou" => {
                Layout::StereoTopBottom
            }
            other => {
                tracing::warn!("Unknown layout '{}', falling back to mono", other);
                Layout::Mono
            }
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
