use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::preprocess::{crop_rect, threshold_luminance};
use super::setup::{resolve_tesseract, TesseractPaths};
use super::TextRecognizer;
use crate::config::OcrConfig;
use crate::locate::OcrRect;

/// Runs the Tesseract command line tool on one region at a time.
#[derive(Clone, Debug)]
pub struct TesseractRecognizer {
    paths: TesseractPaths,
    luminance_threshold: u8,
    page_segmentation: u8,
}

impl TesseractRecognizer {
    /// Locates the tesseract installation described by `config`.
    pub fn new(config: &OcrConfig) -> Result<Self> {
        Ok(Self::with_paths(resolve_tesseract(config)?, config))
    }

    pub fn with_paths(paths: TesseractPaths, config: &OcrConfig) -> Self {
        Self {
            paths,
            luminance_threshold: config.luminance_threshold,
            page_segmentation: config.page_segmentation,
        }
    }

    fn command(&self, input: &std::path::Path, whitelist: Option<&str>) -> Command {
        let mut command = Command::new(&self.paths.executable);
        command.arg(input).arg("stdout");
        if let Some(tessdata) = &self.paths.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        command
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg(self.page_segmentation.to_string());
        if let Some(chars) = whitelist {
            command
                .arg("-c")
                .arg(format!("tessedit_char_whitelist={}", chars));
        }
        command
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &RgbaImage, rect: OcrRect, whitelist: Option<&str>) -> Result<String> {
        let Some(cropped) = crop_rect(image, &rect) else {
            log::debug!("Region {:?} lies outside the screenshot", rect);
            return Ok(String::new());
        };
        let binary = threshold_luminance(&cropped, self.luminance_threshold);

        // Save region to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        binary
            .save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let output = self
            .command(temp_input.path(), whitelist)
            .output()
            .with_context(|| format!("Failed to run {}", self.paths.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
