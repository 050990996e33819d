//! Screenshot to match record: locate, recognize, parse.

use anyhow::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::locate::{locate_regions, RegionSet};
use crate::ocr::{recognize_regions, TextRecognizer};
use crate::recognition::{parse_match, MatchRecord, RegionTexts};

/// How far a screenshot got through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotStatus {
    /// Scoreboard geometry not found
    InvalidRegions,
    /// Regions found but the text could not be parsed into a round
    InvalidRecognition,
    /// Round still running; more time left than allowed
    TimerTooLong,
    Ready,
}

impl ScreenshotStatus {
    /// User-facing error code, if this status is a rejection with one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ScreenshotStatus::InvalidRegions => Some("ERR_REC_BDS"),
            ScreenshotStatus::InvalidRecognition => Some("ERR_REC_CTX"),
            ScreenshotStatus::TimerTooLong | ScreenshotStatus::Ready => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        *self == ScreenshotStatus::Ready
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenshotReport {
    pub status: ScreenshotStatus,
    pub regions: RegionSet,
    /// Absent when the regions were invalid
    pub texts: Option<RegionTexts>,
    pub record: Option<MatchRecord>,
}

/// Runs the full recognition pipeline on one screenshot.
///
/// Unreadable screenshots are reported through the status; only OCR engine
/// failures are errors.
pub fn read_screenshot<R: TextRecognizer + ?Sized>(
    image: &RgbaImage,
    recognizer: &R,
    config: &AppConfig,
) -> Result<ScreenshotReport> {
    let regions = locate_regions(image, &config.locator);
    if !regions.valid {
        log::info!("Scoreboard regions not found");
        return Ok(ScreenshotReport {
            status: ScreenshotStatus::InvalidRegions,
            regions,
            texts: None,
            record: None,
        });
    }
    log::debug!("Regions: {:?}", regions);

    let texts = recognize_regions(image, &regions, recognizer)?;
    let record = parse_match(&texts);

    let status = if !record.round_valid {
        ScreenshotStatus::InvalidRecognition
    } else if record.round_timer > config.rules.max_timer_seconds {
        ScreenshotStatus::TimerTooLong
    } else {
        ScreenshotStatus::Ready
    };
    log::info!(
        "Screenshot read: {:?}, score {}-{}, {} vs {} players",
        status,
        record.score_red,
        record.score_blue,
        record.players_red.len(),
        record.players_blue.len()
    );

    Ok(ScreenshotReport {
        status,
        regions,
        texts: Some(texts),
        record: Some(record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::tests::synthetic_screen;
    use crate::ocr::tests::CannedRecognizer;
    use crate::recognition::tests::sample_texts;

    fn recognizer_for(image: &RgbaImage, texts: &RegionTexts) -> CannedRecognizer {
        let regions = locate_regions(image, &AppConfig::default().locator);
        CannedRecognizer::new(&regions, texts)
    }

    #[test]
    fn test_read_screenshot_ready() {
        let image = synthetic_screen();
        let recognizer = recognizer_for(&image, &sample_texts());

        let report = read_screenshot(&image, &recognizer, &AppConfig::default()).unwrap();
        assert_eq!(report.status, ScreenshotStatus::Ready);
        assert!(report.status.is_ready());
        assert_eq!(report.status.code(), None);

        let record = report.record.unwrap();
        assert_eq!(record.round_timer, 7);
        assert_eq!((record.score_red, record.score_blue), (5, 3));
        assert_eq!(record.players_red[1].username, "ShadowWolf_1234");
        assert!(record.players_red[1].bot);
    }

    #[test]
    fn test_blank_screenshot_skips_ocr() {
        let image = RgbaImage::from_pixel(200, 160, image::Rgba([255, 255, 255, 255]));
        let recognizer = recognizer_for(&synthetic_screen(), &sample_texts());

        let report = read_screenshot(&image, &recognizer, &AppConfig::default()).unwrap();
        assert_eq!(report.status, ScreenshotStatus::InvalidRegions);
        assert_eq!(report.status.code(), Some("ERR_REC_BDS"));
        assert!(report.record.is_none());
        assert!(recognizer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_score_is_invalid_recognition() {
        let image = synthetic_screen();
        let texts = RegionTexts {
            score_blue: "--".to_string(),
            ..sample_texts()
        };
        let recognizer = recognizer_for(&image, &texts);

        let report = read_screenshot(&image, &recognizer, &AppConfig::default()).unwrap();
        assert_eq!(report.status, ScreenshotStatus::InvalidRecognition);
        assert_eq!(report.status.code(), Some("ERR_REC_CTX"));
        assert!(!report.record.unwrap().round_valid);
    }

    #[test]
    fn test_running_round_is_rejected_by_timer() {
        let image = synthetic_screen();
        let texts = RegionTexts {
            timer: "1:30".to_string(),
            ..sample_texts()
        };
        let recognizer = recognizer_for(&image, &texts);

        let mut config = AppConfig::default();
        let report = read_screenshot(&image, &recognizer, &config).unwrap();
        assert_eq!(report.status, ScreenshotStatus::TimerTooLong);

        config.rules.max_timer_seconds = 120;
        let report = read_screenshot(&image, &recognizer, &config).unwrap();
        assert_eq!(report.status, ScreenshotStatus::Ready);
    }
}
