//! Cropping and encoding of captured monitor images.

use super::backend::CaptureError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode an RGBA image as PNG bytes, in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Crop `image` to a rectangle in image-local pixels and encode it as PNG.
///
/// The rectangle is clamped to the image; a rectangle that lies entirely
/// outside it is an error.
pub fn crop_to_png_bytes(
    image: &RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CaptureError> {
    let (img_w, img_h) = image.dimensions();
    let x = x.max(0) as u32;
    let y = y.max(0) as u32;
    if x >= img_w || y >= img_h {
        return Err(CaptureError::InvalidRegion(format!(
            "({}, {}) is outside the {}x{} capture",
            x, y, img_w, img_h
        )));
    }

    let w = width.max(1).min(img_w - x);
    let h = height.max(1).min(img_h - y);
    let cropped = image::imageops::crop_imm(image, x, y, w, h).to_image();
    encode_png(&cropped)
}

/// Decode PNG/BMP/JPEG bytes into raw RGBA, e.g. for the clipboard.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, CaptureError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn crop_produces_requested_size() {
        let png = crop_to_png_bytes(&checker(100, 80), 10, 20, 30, 40).unwrap();
        let decoded = decode_rgba(&png).unwrap();
        assert_eq!(decoded.dimensions(), (30, 40));
    }

    #[test]
    fn crop_is_clamped_to_image() {
        let png = crop_to_png_bytes(&checker(100, 80), 90, 70, 50, 50).unwrap();
        let decoded = decode_rgba(&png).unwrap();
        assert_eq!(decoded.dimensions(), (10, 10));
    }

    #[test]
    fn crop_outside_image_is_rejected() {
        let err = crop_to_png_bytes(&checker(10, 10), 20, 0, 5, 5).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRegion(_)));
    }

    #[test]
    fn crop_preserves_pixels() {
        let img = checker(4, 4);
        let png = crop_to_png_bytes(&img, 1, 0, 2, 1).unwrap();
        let decoded = decode_rgba(&png).unwrap();
        assert_eq!(decoded.get_pixel(0, 0), img.get_pixel(1, 0));
        assert_eq!(decoded.get_pixel(1, 0), img.get_pixel(2, 0));
    }
}
