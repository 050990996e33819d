//! Scoreboard region detection.
//!
//! Derives the seven text regions of a match-result screenshot from pixel
//! geometry alone. The layout is fixed: a timer box centered at the top with
//! one colored score box on each side, and a two-team scoreboard in the
//! middle of the screen framed by a solid border.

pub mod area;

pub use area::{Area, OcrRect, RegionSet};

use crate::config::LocatorConfig;
use crate::surface::{scan_unmatch, scan_until, Direction, Location, PixelSurface};

/// Locates all seven regions. Never fails; check `RegionSet::valid`.
pub fn locate_regions<S: PixelSurface + ?Sized>(surface: &S, config: &LocatorConfig) -> RegionSet {
    let width = surface.width() as i32;
    let height = surface.height() as i32;
    let center_x = width / 2;
    let tolerance = config.anchor_tolerance;
    let border = config.scoreboard_border;

    // Scoreboard frame
    let lower_probe = Location::new(center_x, height * 3 / 4);
    let scoreboard_top = scan_until(
        surface,
        Location::new(center_x, height / 4),
        Direction::Up,
        border,
        true,
        tolerance,
    )
    .y;
    let scoreboard_bottom = scan_until(surface, lower_probe, Direction::Down, border, true, tolerance).y;
    let scoreboard_right = scan_until(surface, lower_probe, Direction::Right, border, true, tolerance).x;
    let scoreboard_left = (width - 1) - scoreboard_right;
    let scoreboard_center = (scoreboard_top + scoreboard_bottom) / 2;
    let scoreboard_quarter = (scoreboard_right - center_x) / 4;

    // Timer box
    let timer_top = scan_until(
        surface,
        Location::new(center_x, 0),
        Direction::Down,
        config.timer_background,
        true,
        tolerance,
    )
    .y + 1;
    let timer_right = scan_until(
        surface,
        Location::new(center_x, timer_top),
        Direction::Right,
        config.timer_background,
        false,
        tolerance,
    )
    .x;
    let timer_bottom = scan_until(
        surface,
        Location::new(timer_right, timer_top),
        Direction::Down,
        config.timer_border,
        true,
        tolerance,
    )
    .y;
    let timer_left = (width - 1) - timer_right;
    let timer_width = timer_right - timer_left + 1;

    // Score boxes either side of the timer
    let score_red_probe = Location::new(center_x - timer_width, timer_top);
    let score_blue_probe = Location::new(center_x + timer_width, timer_top);
    let score_red_left = scan_unmatch(surface, score_red_probe, Direction::Left, config.score_tolerance).x;
    let score_red_right = scan_unmatch(surface, score_red_probe, Direction::Right, config.score_tolerance).x;
    let score_blue_left = scan_unmatch(surface, score_blue_probe, Direction::Left, config.score_tolerance).x;
    let score_blue_right = scan_unmatch(surface, score_blue_probe, Direction::Right, config.score_tolerance).x;

    let regions = RegionSet::new(
        Area::from_corners(timer_left, timer_top, timer_right, timer_bottom),
        Area::from_corners(score_red_left, timer_top, score_red_right, timer_bottom),
        Area::from_corners(score_blue_left, timer_top, score_blue_right, timer_bottom),
        Area::from_corners(scoreboard_left, scoreboard_top, center_x, scoreboard_center),
        Area::from_corners(scoreboard_left, scoreboard_center, center_x, scoreboard_bottom),
        Area::from_corners(
            center_x + scoreboard_quarter,
            scoreboard_top,
            scoreboard_right - scoreboard_quarter,
            scoreboard_center,
        ),
        Area::from_corners(
            center_x + scoreboard_quarter,
            scoreboard_center,
            scoreboard_right - scoreboard_quarter,
            scoreboard_bottom,
        ),
    );

    log::debug!(
        "Located regions in {}x{}: timer={:?} valid={}",
        width,
        height,
        regions.timer,
        regions.valid
    );
    regions
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};

    const BACKDROP: Rgba<u8> = Rgba([40, 60, 80, 255]);
    const BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const TIMER_FILL: Rgba<u8> = Rgba([4, 4, 4, 255]);
    const TIMER_LINE: Rgba<u8> = Rgba([127, 127, 127, 255]);
    const RED_BOX: Rgba<u8> = Rgba([200, 40, 40, 255]);
    const BLUE_BOX: Rgba<u8> = Rgba([40, 40, 200, 255]);
    const PANEL: Rgba<u8> = Rgba([20, 20, 30, 255]);

    /// 200x160 synthetic result screen.
    ///
    /// - timer fill: x 90..=109, y 5..=14, grey line at y 15
    /// - red score box: x 65..=85, blue score box: x 114..=134 (y 5..=15)
    /// - scoreboard border: rows y 30 and y 130, columns x 20 and x 179
    pub(crate) fn synthetic_screen() -> RgbaImage {
        ImageBuffer::from_fn(200, 160, |x, y| {
            if (90..=109).contains(&x) && (5..=14).contains(&y) {
                TIMER_FILL
            } else if (90..=109).contains(&x) && y == 15 {
                TIMER_LINE
            } else if (65..=85).contains(&x) && (5..=15).contains(&y) {
                RED_BOX
            } else if (114..=134).contains(&x) && (5..=15).contains(&y) {
                BLUE_BOX
            } else if (y == 30 || y == 130) && (20..=179).contains(&x) {
                BORDER
            } else if (x == 20 || x == 179) && (30..=130).contains(&y) {
                BORDER
            } else if (21..=178).contains(&x) && (31..=129).contains(&y) {
                PANEL
            } else {
                BACKDROP
            }
        })
    }

    #[test]
    fn test_locate_synthetic_screen() {
        let img = synthetic_screen();
        let regions = locate_regions(&img, &LocatorConfig::default());

        assert!(regions.valid);
        // timer: top is one past the last non-fill row above it
        assert_eq!(regions.timer, Area::from_corners(90, 5, 109, 14));
        assert_eq!(regions.score_red, Area::from_corners(65, 5, 85, 14));
        assert_eq!(regions.score_blue, Area::from_corners(114, 5, 134, 14));

        // scoreboard: top/bottom stop one pixel inside the border
        assert_eq!(regions.players_red, Area::from_corners(21, 31, 100, 80));
        assert_eq!(regions.players_blue, Area::from_corners(21, 80, 100, 129));
        // quarter inset = (178 - 100) / 4 = 19
        assert_eq!(regions.scoreboard_red, Area::from_corners(119, 31, 159, 80));
        assert_eq!(regions.scoreboard_blue, Area::from_corners(119, 80, 159, 129));
    }

    #[test]
    fn test_locate_blank_image_is_invalid() {
        let img: RgbaImage = ImageBuffer::from_pixel(120, 80, Rgba([255, 255, 255, 255]));
        let regions = locate_regions(&img, &LocatorConfig::default());
        assert!(!regions.valid);
    }

    #[test]
    fn test_locate_is_deterministic() {
        let img = synthetic_screen();
        let a = locate_regions(&img, &LocatorConfig::default());
        let b = locate_regions(&img, &LocatorConfig::default());
        assert_eq!(a, b);
    }
}
