//! Directional pixel walk.
//!
//! Every region coordinate is found by starting somewhere known and walking
//! one pixel at a time until the color condition flips. The walk never
//! leaves the surface; it stops on the last pixel that still satisfied the
//! "keep going" condition.

use serde::{Deserialize, Serialize};

use super::{Location, PixelColor, PixelSurface};

/// Cardinal walking direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    fn step(self, from: Location) -> Location {
        let (dx, dy) = self.offset();
        Location::new(from.x + dx, from.y + dy)
    }
}

/// Walks from `origin` in `direction` and returns the last location before
/// the halt condition.
///
/// The walk halts when the next pixel is outside the surface, or when
/// "next pixel matches `target` within `tolerance`" equals `want_match`.
/// The returned location is always the step *before* the halt, so a walk
/// whose first neighbor already halts returns `origin` itself.
pub fn scan_until<S: PixelSurface + ?Sized>(
    surface: &S,
    origin: Location,
    direction: Direction,
    target: PixelColor,
    want_match: bool,
    tolerance: u8,
) -> Location {
    let mut current = origin;
    loop {
        let next = direction.step(current);
        let Some(color) = surface.color_at(next) else {
            break;
        };
        if color.matches(&target, tolerance) == want_match {
            break;
        }
        current = next;
    }
    current
}

/// Walks from `origin` while pixels stay within `tolerance` of the origin's
/// own color. An origin outside the surface is returned unchanged.
pub fn scan_unmatch<S: PixelSurface + ?Sized>(
    surface: &S,
    origin: Location,
    direction: Direction,
    tolerance: u8,
) -> Location {
    match surface.color_at(origin) {
        Some(target) => scan_until(surface, origin, direction, target, false, tolerance),
        None => origin,
    }
}
