use serde::{Deserialize, Serialize};

use crate::surface::Location;

/// An axis-aligned rectangle, both corners inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Top-left corner
    pub origin: Location,
    /// Bottom-right corner
    pub destination: Location,
}

impl Area {
    pub const fn new(origin: Location, destination: Location) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub const fn from_corners(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(Location::new(left, top), Location::new(right, bottom))
    }

    /// A non-empty rectangle: destination strictly right of and below origin.
    pub fn is_valid(&self) -> bool {
        self.destination.x > self.origin.x && self.destination.y > self.origin.y
    }

    /// Converts to the left/top/width/height form OCR engines take.
    pub fn to_rect(&self) -> OcrRect {
        OcrRect {
            left: self.origin.x,
            top: self.origin.y,
            width: self.destination.x - self.origin.x + 1,
            height: self.destination.y - self.origin.y + 1,
        }
    }
}

/// Rectangle in OCR form. Width and height include both border pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// The seven regions of a result screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    pub timer: Area,
    pub score_red: Area,
    pub score_blue: Area,
    pub players_red: Area,
    pub players_blue: Area,
    pub scoreboard_red: Area,
    pub scoreboard_blue: Area,
    /// All seven areas are valid
    pub valid: bool,
}

impl RegionSet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timer: Area,
        score_red: Area,
        score_blue: Area,
        players_red: Area,
        players_blue: Area,
        scoreboard_red: Area,
        scoreboard_blue: Area,
    ) -> Self {
        let mut regions = Self {
            timer,
            score_red,
            score_blue,
            players_red,
            players_blue,
            scoreboard_red,
            scoreboard_blue,
            valid: false,
        };
        regions.valid = regions.areas().iter().all(|(_, area)| area.is_valid());
        regions
    }

    /// Named view of all seven areas, in a stable order.
    pub fn areas(&self) -> [(&'static str, Area); 7] {
        [
            ("timer", self.timer),
            ("score_red", self.score_red),
            ("score_blue", self.score_blue),
            ("players_red", self.players_red),
            ("players_blue", self.players_blue),
            ("scoreboard_red", self.scoreboard_red),
            ("scoreboard_blue", self.scoreboard_blue),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_validity() {
        assert!(Area::from_corners(0, 0, 1, 1).is_valid());
        assert!(!Area::from_corners(5, 5, 5, 9).is_valid());
        assert!(!Area::from_corners(5, 5, 9, 5).is_valid());
        assert!(!Area::from_corners(5, 5, 4, 9).is_valid());
        assert!(!Area::from_corners(5, 5, 9, -1).is_valid());
        assert!(Area::from_corners(-4, -4, 0, 2).is_valid());
    }

    #[test]
    fn test_to_rect_is_inclusive() {
        let rect = Area::from_corners(10, 20, 19, 24).to_rect();
        assert_eq!(
            rect,
            OcrRect {
                left: 10,
                top: 20,
                width: 10,
                height: 5
            }
        );
    }

    #[test]
    fn test_region_set_valid_only_if_all_valid() {
        let good = Area::from_corners(0, 0, 10, 10);
        let bad = Area::from_corners(0, 0, 0, 10);
        let all_good = RegionSet::new(good, good, good, good, good, good, good);
        assert!(all_good.valid);
        let one_bad = RegionSet::new(good, good, good, good, good, bad, good);
        assert!(!one_bad.valid);
    }
}
