//! Pixel surfaces and the directional boundary scanner.
//!
//! A surface is anything that can answer "what color is pixel (x, y)". The
//! decoded screenshot (`image::RgbaImage`) is the production surface; tests
//! build small synthetic ones with `ImageBuffer::from_fn`.

pub mod scanner;

pub use scanner::{scan_unmatch, scan_until, Direction};

use anyhow::{Context, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An RGBA color, one byte per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl PixelColor {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// True if every channel differs from `other` by at most `tolerance`.
    pub fn matches(&self, other: &PixelColor, tolerance: u8) -> bool {
        self.red.abs_diff(other.red) <= tolerance
            && self.green.abs_diff(other.green) <= tolerance
            && self.blue.abs_diff(other.blue) <= tolerance
            && self.alpha.abs_diff(other.alpha) <= tolerance
    }
}

/// A pixel coordinate. Signed so that derived probes (e.g. `center - width`)
/// can fall off the left/top edge without wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Random-access read view over a decoded bitmap.
pub trait PixelSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reads one pixel. Callers must check `contains` first.
    fn pixel(&self, x: u32, y: u32) -> PixelColor;

    fn contains(&self, location: Location) -> bool {
        location.x >= 0
            && location.y >= 0
            && (location.x as i64) < self.width() as i64
            && (location.y as i64) < self.height() as i64
    }

    /// Reads the pixel at `location`, or `None` when it lies outside.
    fn color_at(&self, location: Location) -> Option<PixelColor> {
        if self.contains(location) {
            Some(self.pixel(location.x as u32, location.y as u32))
        } else {
            None
        }
    }
}

impl PixelSurface for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> PixelColor {
        let p = self.get_pixel(x, y);
        PixelColor::new(p[0], p[1], p[2], p[3])
    }
}

/// Decodes a screenshot file into an RGBA bitmap.
pub fn load_screenshot(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode screenshot {}", path.display()))?;
    log::debug!(
        "Loaded screenshot {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_rgba8())
}
