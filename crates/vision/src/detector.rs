//! Skin-region face detection

use crate::VisionConfig;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use video_frame::VideoFrame;

/// Face bounding box in pixel space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl FaceBox {
    /// Box center in pixels
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Box area in pixels
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Per-component accumulator while scanning the label image
#[derive(Debug, Clone, Copy)]
struct Region {
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
    count: u32,
}

/// Face detector based on skin-chroma segmentation.
///
/// Builds a binary skin mask, labels its connected components, and takes
/// the bounding box of the largest region. Webcam-grade framing (one
/// subject, roughly frontal) is assumed; the pipeline degrades to "no
/// reading" rather than guessing when the mask finds nothing face-sized.
pub struct FaceDetector {
    min_face_px: u32,
    min_fill_ratio: f32,
}

impl FaceDetector {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            min_face_px: config.min_face_px,
            min_fill_ratio: config.min_fill_ratio,
        }
    }

    /// Detect the largest face in the frame
    pub fn detect(&self, frame: &VideoFrame) -> Option<FaceBox> {
        let mask = self.skin_mask(frame);
        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        let mut regions: HashMap<u32, Region> = HashMap::new();
        for (x, y, pixel) in labels.enumerate_pixels() {
            let label = pixel[0];
            if label == 0 {
                continue;
            }
            regions
                .entry(label)
                .and_modify(|r| {
                    r.min_x = r.min_x.min(x);
                    r.max_x = r.max_x.max(x);
                    r.min_y = r.min_y.min(y);
                    r.max_y = r.max_y.max(y);
                    r.count += 1;
                })
                .or_insert(Region {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                    count: 1,
                });
        }

        let largest = regions.values().max_by_key(|r| r.count)?;

        let width = largest.max_x - largest.min_x + 1;
        let height = largest.max_y - largest.min_y + 1;
        if width < self.min_face_px || height < self.min_face_px {
            debug!(width, height, "largest skin region below face size floor");
            return None;
        }

        let fill = largest.count as f32 / (width * height) as f32;
        if fill < self.min_fill_ratio {
            debug!(fill, "largest skin region too sparse for a face");
            return None;
        }

        Some(FaceBox {
            x: largest.min_x as f32,
            y: largest.min_y as f32,
            width: width as f32,
            height: height as f32,
            confidence: fill.min(1.0),
        })
    }

    /// Binary skin mask from the RGB chroma rule
    fn skin_mask(&self, frame: &VideoFrame) -> GrayImage {
        let mut mask = GrayImage::new(frame.width, frame.height);
        for y in 0..frame.height {
            for x in 0..frame.width {
                let idx = ((y * frame.width + x) * 3) as usize;
                let r = frame.data[idx];
                let g = frame.data[idx + 1];
                let b = frame.data[idx + 2];
                if is_skin(r, g, b) {
                    mask.put_pixel(x, y, Luma([255u8]));
                }
            }
        }
        mask
    }
}

/// Classic RGB skin-chroma rule
fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95
        && g > 40
        && b > 20
        && (max - min) > 15
        && r.abs_diff(g) > 15
        && r > g
        && r > b
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn frame_with_face(
        frame_w: u32,
        frame_h: u32,
        face_x: u32,
        face_y: u32,
        face_w: u32,
        face_h: u32,
    ) -> VideoFrame {
        let mut data = vec![0u8; (frame_w * frame_h * 3) as usize];
        for y in face_y..(face_y + face_h).min(frame_h) {
            for x in face_x..(face_x + face_w).min(frame_w) {
                let idx = ((y * frame_w + x) * 3) as usize;
                data[idx] = 200;
                data[idx + 1] = 140;
                data[idx + 2] = 110;
            }
        }
        VideoFrame::new(data, frame_w, frame_h, 0.0).unwrap()
    }

    #[test]
    fn test_detects_face_region() {
        let detector = FaceDetector::new(&VisionConfig::default());
        let frame = frame_with_face(320, 240, 100, 50, 120, 140);

        let face = detector.detect(&frame).unwrap();
        assert!((face.x - 100.0).abs() < 2.0);
        assert!((face.y - 50.0).abs() < 2.0);
        assert!((face.width - 120.0).abs() < 2.0);
        assert!((face.height - 140.0).abs() < 2.0);
        assert!(face.confidence > 0.9);
    }

    #[test]
    fn test_no_face_in_dark_frame() {
        let detector = FaceDetector::new(&VisionConfig::default());
        let frame = VideoFrame::new(vec![10u8; 320 * 240 * 3], 320, 240, 0.0).unwrap();
        assert!(detector.detect(&frame).is_none());
    }

    #[test]
    fn test_rejects_too_small_region() {
        let detector = FaceDetector::new(&VisionConfig::default());
        let frame = frame_with_face(320, 240, 10, 10, 40, 40);
        assert!(detector.detect(&frame).is_none());
    }

    #[test]
    fn test_picks_largest_of_two_regions() {
        let detector = FaceDetector::new(&VisionConfig::default());
        let mut frame = frame_with_face(640, 480, 50, 50, 110, 110);
        // Paint a second, larger region
        for y in 200..420u32 {
            for x in 300..520u32 {
                let idx = ((y * 640 + x) * 3) as usize;
                frame.data[idx] = 200;
                frame.data[idx + 1] = 140;
                frame.data[idx + 2] = 110;
            }
        }

        let face = detector.detect(&frame).unwrap();
        assert!((face.x - 300.0).abs() < 2.0);
        assert!((face.width - 220.0).abs() < 2.0);
    }

    #[test]
    fn test_skin_rule() {
        assert!(is_skin(200, 140, 110));
        assert!(!is_skin(10, 10, 10));
        assert!(!is_skin(100, 100, 100)); // grey, no chroma spread
        assert!(!is_skin(100, 180, 90)); // green-dominant
    }
}
