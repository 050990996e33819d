//! Text recognition over located regions.
//!
//! The seven regions are independent, so they are recognized on scoped
//! threads and joined before parsing.

pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::TesseractRecognizer;
pub use setup::{resolve_tesseract, TesseractPaths};

use anyhow::{anyhow, Result};
use image::RgbaImage;
use std::thread;

use crate::locate::{Area, OcrRect, RegionSet};
use crate::recognition::RegionTexts;

/// Characters the timer box can contain.
pub const TIMER_WHITELIST: &str = "0123456789:";
/// Characters the team score boxes can contain.
pub const SCORE_WHITELIST: &str = "0123456789";
/// Characters the numeric stat tables can contain.
pub const STATS_WHITELIST: &str = "0123456789 ";

/// An OCR engine. Must be shareable across threads for region fan-out.
pub trait TextRecognizer: Sync {
    fn recognize(&self, image: &RgbaImage, rect: OcrRect, whitelist: Option<&str>) -> Result<String>;
}

/// Recognizes all seven regions concurrently.
///
/// Fails if any single region fails; there is no retry.
pub fn recognize_regions<R: TextRecognizer + ?Sized>(
    image: &RgbaImage,
    regions: &RegionSet,
    recognizer: &R,
) -> Result<RegionTexts> {
    let jobs: [(Area, Option<&str>); 7] = [
        (regions.timer, Some(TIMER_WHITELIST)),
        (regions.score_red, Some(SCORE_WHITELIST)),
        (regions.score_blue, Some(SCORE_WHITELIST)),
        (regions.players_red, None),
        (regions.players_blue, None),
        (regions.scoreboard_red, Some(STATS_WHITELIST)),
        (regions.scoreboard_blue, Some(STATS_WHITELIST)),
    ];

    let results: Vec<Result<String>> = thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .iter()
            .map(|&(area, whitelist)| {
                scope.spawn(move || recognizer.recognize(image, area.to_rect(), whitelist))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("OCR worker panicked")))
            })
            .collect()
    });

    let mut texts = results.into_iter();
    let mut next = |name: &str| -> Result<String> {
        let text = texts
            .next()
            .ok_or_else(|| anyhow!("missing OCR result for {}", name))??;
        log::debug!("OCR {}: {:?}", name, text);
        Ok(text)
    };

    Ok(RegionTexts {
        timer: next("timer")?,
        score_red: next("score_red")?,
        score_blue: next("score_blue")?,
        players_red: next("players_red")?,
        players_blue: next("players_blue")?,
        scoreboard_red: next("scoreboard_red")?,
        scoreboard_blue: next("scoreboard_blue")?,
    })
}
