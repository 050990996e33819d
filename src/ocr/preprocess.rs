use image::{GrayImage, ImageBuffer, Luma, RgbaImage};

use crate::locate::OcrRect;

/// Converts image to binary by relative luminance.
///
/// Pixels with `0.2126 R + 0.7152 G + 0.0722 B >= threshold` become black
/// (text), everything else white (background). Scoreboard text is drawn
/// light on a dark panel, so this leaves dark glyphs on white for OCR.
pub fn threshold_luminance(img: &RgbaImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let luminance =
            0.2126 * pixel[0] as f32 + 0.7152 * pixel[1] as f32 + 0.0722 * pixel[2] as f32;

        let value = if luminance.floor() >= threshold as f32 {
            0u8
        } else {
            255u8
        };

        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Crops a rectangle from the screenshot, clamped to the image bounds.
///
/// Returns `None` when nothing of the rectangle lies inside the image.
pub fn crop_rect(img: &RgbaImage, rect: &OcrRect) -> Option<RgbaImage> {
    let (w, h) = img.dimensions();
    let (w, h) = (w as i64, h as i64);

    let x0 = (rect.left as i64).clamp(0, w);
    let y0 = (rect.top as i64).clamp(0, h);
    let x1 = (rect.left as i64 + rect.width as i64).clamp(0, w);
    let y1 = (rect.top as i64 + rect.height as i64).clamp(0, h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(
        image::imageops::crop_imm(
            img,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image(),
    )
}
