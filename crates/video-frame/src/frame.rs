//! Decoded frame type and pixel access

use crate::FrameError;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (seconds since the Unix epoch)
    pub timestamp: f64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp: f64) -> Result<Self, FrameError> {
        if data.len() != (width * height * 3) as usize {
            return Err(FrameError::DimensionMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp,
        })
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Mean of the green channel over a rectangular region.
    ///
    /// The region is clamped to the frame; returns `None` when the clamped
    /// region is empty.
    pub fn mean_green(&self, x: u32, y: u32, w: u32, h: u32) -> Option<f64> {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        if x >= x_end || y >= y_end {
            return None;
        }

        let mut sum = 0u64;
        let mut count = 0u64;
        for row in y..y_end {
            for col in x..x_end {
                let idx = ((row * self.width + col) * 3) as usize;
                sum += self.data[idx + 1] as u64;
                count += 1;
            }
        }
        Some(sum as f64 / count as f64)
    }

    /// Crop a region of the frame
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<VideoFrame> {
        if x + w > self.width || y + h > self.height {
            return None;
        }

        let mut cropped = Vec::with_capacity((w * h * 3) as usize);
        for row in y..(y + h) {
            let start = ((row * self.width + x) * 3) as usize;
            let end = start + (w * 3) as usize;
            cropped.extend_from_slice(&self.data[start..end]);
        }

        Some(VideoFrame {
            data: cropped,
            width: w,
            height: h,
            timestamp: self.timestamp,
        })
    }

    /// Resize with nearest-neighbor sampling
    pub fn resize(&self, new_width: u32, new_height: u32) -> VideoFrame {
        let mut resized = Vec::with_capacity((new_width * new_height * 3) as usize);

        let x_ratio = self.width as f32 / new_width as f32;
        let y_ratio = self.height as f32 / new_height as f32;

        for y in 0..new_height {
            for x in 0..new_width {
                let src_x = ((x as f32 * x_ratio) as u32).min(self.width - 1);
                let src_y = ((y as f32 * y_ratio) as u32).min(self.height - 1);

                if let Some(pixel) = self.get_pixel(src_x, src_y) {
                    resized.extend_from_slice(&pixel);
                } else {
                    resized.extend_from_slice(&[0, 0, 0]);
                }
            }
        }

        VideoFrame {
            data: resized,
            width: new_width,
            height: new_height,
            timestamp: self.timestamp,
        }
    }
}

/// Decode a compressed image (JPEG/PNG/...) into an RGB frame
pub fn decode_frame(bytes: &[u8], timestamp: f64) -> Result<VideoFrame, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::Empty);
    }

    let img = image::load_from_memory(bytes).map_err(|e| FrameError::Decode(e.to_string()))?;
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width(), rgb.height());

    Ok(VideoFrame {
        data: rgb.into_raw(),
        width,
        height,
        timestamp,
    })
}
