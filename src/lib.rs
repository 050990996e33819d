//! Flag Wars round rating.
//!
//! Reads a match-result screenshot, locates the scoreboard regions from pixel
//! geometry, recognizes their text, parses a match record, and updates
//! TrueSkill ratings of the players in a persistent store.

pub mod cli;
pub mod config;
pub mod locate;
pub mod ocr;
pub mod paths;
pub mod pipeline;
pub mod rating;
pub mod recognition;
pub mod store;
pub mod surface;

pub use cli::{execute, interpret};
pub use pipeline::{read_screenshot, ScreenshotReport, ScreenshotStatus};
