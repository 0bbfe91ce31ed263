//! Video frame representation
//!
//! Contains the RGBA pixel data and metadata for one frame handed to the GPU.

/// An RGBA8 video frame
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Raw pixel data (4 bytes/pixel, rows top to bottom)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame index (0-based)
    pub frame_index: u64,
}

impl DecodedFrame {
    /// Create a new RGBA frame
    pub fn new(data: Vec<u8>, width: u32, height: u32, frame_index: u64) -> Self {
        Self {
            data,
            width,
            height,
            frame_index,
        }
    }

    /// Get the expected data size for RGBA frame dimensions (width * height * 4)
    pub fn expected_size(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    /// Check if the frame has pixels and the data has the correct size
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == Self::expected_size(self.width, self.height)
    }

    /// Get the stride (bytes per row)
    pub fn stride(&self) -> usize {
        (self.width as usize) * 4
    }

    /// RGBA value of a pixel, `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.stride() + x as usize * 4;
        let texel = self.data.get(start..start + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let width = 1920;
        let height = 1080;
        let data = vec![0u8; DecodedFrame::expected_size(width, height)];
        let frame = DecodedFrame::new(data, width, height, 0);

        assert_eq!(frame.width, 1920);
        assert_eq!(frame.height, 1080);
        assert!(frame.is_valid());
        assert_eq!(frame.stride(), 1920 * 4);
    }

    #[test]
    fn test_invalid_frames() {
        assert!(!DecodedFrame::new(vec![0; 12], 2, 2, 0).is_valid());
        assert!(!DecodedFrame::new(Vec::new(), 0, 0, 0).is_valid());
    }

    #[test]
    fn test_pixel_lookup() {
        let mut data = vec![0u8; DecodedFrame::expected_size(2, 2)];
        data[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let frame = DecodedFrame::new(data, 2, 2, 0);
        assert_eq!(frame.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(frame.pixel(2, 0), None);
    }
}
