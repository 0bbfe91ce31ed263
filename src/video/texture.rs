//! GPU texture for video frames
//!
//! Manages a wgpu texture that receives the latest frame and is sampled by
//! the player renderer.

use super::DecodedFrame;

/// A GPU texture holding the current video frame
pub struct VideoTexture {
    /// The GPU texture
    texture: wgpu::Texture,
    /// Texture view for binding
    view: wgpu::TextureView,
    /// Texture width in pixels
    width: u32,
    /// Texture height in pixels
    height: u32,
}

impl VideoTexture {
    /// Create a new video texture with the specified dimensions
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = Self::create_texture(device, width, height);

        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Create the GPU texture
    fn create_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Video Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Use Rgba8UnormSrgb for proper gamma-corrected color display
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            // COPY_DST for uploading data, TEXTURE_BINDING for shader sampling
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        (texture, view)
    }

    /// Upload a frame, resizing the texture first if its size changed
    ///
    /// Frames whose data does not match their dimensions are skipped and
    /// reported as `false`.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &DecodedFrame) -> bool {
        if !frame.is_valid() {
            tracing::warn!(
                "Skipping malformed frame {} ({}x{}, {} bytes)",
                frame.frame_index,
                frame.width,
                frame.height,
                frame.data.len()
            );
            return false;
        }

        self.resize(device, frame.width, frame.height);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.stride() as u32),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        true
    }

    /// Resize the texture to new dimensions
    ///
    /// This recreates the texture; views taken earlier keep the old one.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }

        let (texture, view) = Self::create_texture(device, width, height);

        self.texture = texture;
        self.view = view;
        self.width = width;
        self.height = height;

        log::debug!("Resized video texture to {}x{}", width, height);
    }

    /// Get the texture view
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the texture width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the texture height
    pub fn height(&self) -> u32 {
        self.height
    }
}
