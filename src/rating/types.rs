use serde::{Deserialize, Serialize};
use skillratings::trueskill::TrueSkillRating;

use crate::store::PlayerRecord;

/// Bayesian skill estimate: mean and uncertainty. `sigma` stays positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillRating {
    pub mu: f64,
    pub sigma: f64,
}

impl SkillRating {
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Displayed rating: `mu - 3 * sigma`.
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

impl Default for SkillRating {
    fn default() -> Self {
        Self::new(25.0, 25.0 / 3.0)
    }
}

impl From<SkillRating> for TrueSkillRating {
    fn from(rating: SkillRating) -> Self {
        TrueSkillRating {
            rating: rating.mu,
            uncertainty: rating.sigma,
        }
    }
}

impl From<TrueSkillRating> for SkillRating {
    fn from(rating: TrueSkillRating) -> Self {
        Self::new(rating.rating, rating.uncertainty)
    }
}

/// Pre-round odds and the current record of every listed player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingProbability {
    pub win_red: f64,
    pub win_blue: f64,
    pub quality: f64,
    /// Same order as the match roster, partial players included
    pub players_red: Vec<PlayerRecord>,
    pub players_blue: Vec<PlayerRecord>,
}

/// What happened to one player's rating.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatingChange {
    Updated { old: SkillRating, new: SkillRating },
    /// Player was excluded from the update
    NotApplicable,
}

impl RatingChange {
    /// Change in displayed rating, if the player was rated.
    pub fn conservative_delta(&self) -> Option<f64> {
        match self {
            RatingChange::Updated { old, new } => Some(new.conservative() - old.conservative()),
            RatingChange::NotApplicable => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatedPlayer {
    /// Stored record after the update (or as-is for partial players)
    pub record: PlayerRecord,
    pub change: RatingChange,
    pub bot: bool,
}

/// Result of rating one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    /// Odds over the players that were actually rated
    pub probability: RatingProbability,
    /// Team ranks, lower wins; equal ranks mean a draw
    pub ranks: [u32; 2],
    pub players_red: Vec<RatedPlayer>,
    pub players_blue: Vec<RatedPlayer>,
    /// Whether the new ratings were written to the store
    pub committed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservative_rating() {
        assert!((SkillRating::default().conservative()).abs() < 1e-9);
        assert!((SkillRating::new(30.0, 2.0).conservative() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_trueskill_conversion() {
        let ts: TrueSkillRating = SkillRating::new(27.0, 4.5).into();
        assert_eq!(ts.rating, 27.0);
        assert_eq!(ts.uncertainty, 4.5);
        assert_eq!(SkillRating::from(ts), SkillRating::new(27.0, 4.5));
    }

    #[test]
    fn test_rating_change_serializes_tagged() {
        let json = serde_json::to_value(RatingChange::NotApplicable).unwrap();
        assert_eq!(json["status"], "not_applicable");
        let change = RatingChange::Updated {
            old: SkillRating::new(25.0, 8.0),
            new: SkillRating::new(27.0, 7.0),
        };
        let delta = change.conservative_delta().unwrap();
        assert!((delta - 5.0).abs() < 1e-9);
    }
}
