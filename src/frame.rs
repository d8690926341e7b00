//! Frame source abstraction
//!
//! The host's video pipeline owns decoding; the overlay only needs the
//! current frame's dimensions and sub-rectangle pixel extraction for the
//! magnifier.

use image::RgbaImage;

use crate::domain::Rect;

/// Pixel access to the currently displayed video frame
pub trait FrameSource {
    /// Source dimensions of the frame in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Extract the pixels of a source-space sub-rectangle
    ///
    /// Returns `None` when the rectangle is empty or lies outside the frame.
    fn region(&self, rect: Rect) -> Option<RgbaImage>;
}

impl FrameSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn region(&self, rect: Rect) -> Option<RgbaImage> {
        let bounds = Rect::new(0, 0, self.width() as i32, self.height() as i32);
        let clipped = rect.intersect(bounds)?;
        let dim = clipped.dimensions()?;
        let view = image::imageops::crop_imm(
            self,
            clipped.left as u32,
            clipped.top as u32,
            dim.width(),
            dim.height(),
        );
        Some(view.to_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_clips_to_frame_bounds() {
        let frame = RgbaImage::from_pixel(100, 80, image::Rgba([7, 7, 7, 255]));
        let region = frame.region(Rect::new(90, 70, 120, 100)).unwrap();
        assert_eq!((region.width(), region.height()), (10, 10));
    }

    #[test]
    fn region_outside_frame_is_none() {
        let frame = RgbaImage::from_pixel(100, 80, image::Rgba([0, 0, 0, 255]));
        assert!(frame.region(Rect::new(200, 200, 300, 300)).is_none());
        assert!(frame.region(Rect::new(10, 10, 10, 40)).is_none());
    }
}
