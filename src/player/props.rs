//! Per-draw inputs
//!
//! [`RenderProps`] is built fresh by a driver for every eye of every frame
//! and never retained by the renderer.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::error::FrameInputError;
use super::eye::{Eye, TexCoordWindow};

/// Pixel rectangle of the destination surface that a draw writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole surface
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One eye's half of a surface split side by side
    ///
    /// An odd pixel column goes to the right eye.
    pub fn side_by_side(eye: Eye, width: u32, height: u32) -> Self {
        let left_width = width / 2;
        match eye {
            Eye::Left => Self::new(0, 0, left_width, height),
            Eye::Right => Self::new(left_width, 0, width - left_width, height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies inside a `width`x`height` surface
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= width as u64 && bottom <= height as u64
    }

    /// Width over height, 1.0 for an empty viewport
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Matrices, sampling window and viewport for one eye's draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeTransforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// The active eye's window into the packed frame
    pub tex_coord_scale_offset: TexCoordWindow,
    pub viewport: Viewport,
}

impl EyeTransforms {
    /// Check the transforms against a target surface size
    pub fn validate(&self, target_width: u32, target_height: u32) -> Result<(), FrameInputError> {
        for (name, matrix) in [
            ("model", &self.model),
            ("view", &self.view),
            ("projection", &self.projection),
        ] {
            if !matrix.is_finite() {
                return Err(FrameInputError::NonFiniteMatrix(name));
            }
        }

        if !self.tex_coord_scale_offset.is_finite() {
            return Err(FrameInputError::NonFiniteTexCoordWindow);
        }

        if self.viewport.is_empty() {
            return Err(FrameInputError::EmptyViewport);
        }

        if !self.viewport.fits_within(target_width, target_height) {
            let v = self.viewport;
            return Err(FrameInputError::ViewportOutOfBounds {
                viewport: (v.x, v.y, v.width, v.height),
                target: (target_width, target_height),
            });
        }

        Ok(())
    }
}

/// Everything a single draw call needs
pub struct RenderProps<'a> {
    pub transforms: EyeTransforms,
    /// The current video frame
    pub texture: &'a wgpu::TextureView,
}

impl<'a> RenderProps<'a> {
    pub fn new(transforms: EyeTransforms, texture: &'a wgpu::TextureView) -> Self {
        Self {
            transforms,
            texture,
        }
    }
}

/// Uniform block layout, matches `EyeUniforms` in player.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct EyeUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    tex_coord_scale_offset: [f32; 4],
}

impl EyeUniforms {
    /// Size of the uniform block in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

impl From<&EyeTransforms> for EyeUniforms {
    fn from(t: &EyeTransforms) -> Self {
        Self {
            model: t.model.to_cols_array_2d(),
            view: t.view.to_cols_array_2d(),
            projection: t.projection.to_cols_array_2d(),
            tex_coord_scale_offset: t.tex_coord_scale_offset.to_scale_offset(),
        }
    }
}
