//! TrueSkill ratings for two-team rounds.
//!
//! Probabilities and updates are computed with the `skillratings` TrueSkill
//! implementation; this module adds the round semantics around it: ranks
//! from scores, partial players excluded, bots kept out of the store.

pub mod engine;
pub mod types;

pub use engine::{parse_team_list, team_ranks, RatingEngine};
pub use types::{RatedPlayer, RatingChange, RatingOutcome, RatingProbability, SkillRating};

use skillratings::trueskill::{
    expected_score_two_teams, match_quality_two_teams, TrueSkillConfig, TrueSkillRating,
};

use crate::config::RatingConfig;

/// TrueSkill parameters for `skillratings`.
pub fn trueskill_config(config: &RatingConfig) -> TrueSkillConfig {
    TrueSkillConfig {
        draw_probability: config.draw_probability,
        beta: config.beta,
        default_dynamics: config.tau,
    }
}

fn to_trueskill(ratings: &[SkillRating]) -> Vec<TrueSkillRating> {
    ratings.iter().copied().map(TrueSkillRating::from).collect()
}

/// Chance that team `a` beats team `b`:
/// `Φ((Σμa − Σμb) / sqrt(n·β² + Σσ²))` over all `n` players.
pub fn win_probability(team_a: &[SkillRating], team_b: &[SkillRating], config: &RatingConfig) -> f64 {
    let (a, _) = expected_score_two_teams(
        &to_trueskill(team_a),
        &to_trueskill(team_b),
        &trueskill_config(config),
    );
    a
}

/// TrueSkill match quality in [0, 1]; higher means a closer matchup.
pub fn match_quality(team_a: &[SkillRating], team_b: &[SkillRating], config: &RatingConfig) -> f64 {
    match_quality_two_teams(
        &to_trueskill(team_a),
        &to_trueskill(team_b),
        &trueskill_config(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_teams_are_even() {
        let config = RatingConfig::default();
        let team = vec![SkillRating::default(); 3];
        let p = win_probability(&team, &team, &config);
        // the normal CDF is an approximation
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_win_probability_formula() {
        let config = RatingConfig::default();
        let strong = [SkillRating::new(30.0, 1.0)];
        let weak = [SkillRating::new(20.0, 1.0)];
        // z = 10 / sqrt(2 * (25/6)^2 + 2) ≈ 1.650
        let p = win_probability(&strong, &weak, &config);
        assert!(p > 0.945 && p < 0.956, "{p}");
    }

    #[test]
    fn test_win_probability_is_symmetric() {
        let config = RatingConfig::default();
        let a = [SkillRating::new(31.0, 4.0), SkillRating::new(18.0, 7.5)];
        let b = [
            SkillRating::new(25.0, 8.3),
            SkillRating::new(27.0, 2.0),
            SkillRating::new(12.0, 6.0),
        ];
        let ab = win_probability(&a, &b, &config);
        let ba = win_probability(&b, &a, &config);
        assert!((ab + ba - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_quality_of_fresh_duel() {
        let config = RatingConfig::default();
        let one = [SkillRating::default()];
        // sqrt(2β² / (2β² + 2σ²)) with β = σ/2
        let q = match_quality(&one, &one, &config);
        assert!((q - 0.2f64.sqrt()).abs() < 1e-3, "{q}");
    }

    #[test]
    fn test_quality_drops_for_mismatch() {
        let config = RatingConfig::default();
        let even = match_quality(&[SkillRating::new(25.0, 3.0)], &[SkillRating::new(25.0, 3.0)], &config);
        let lopsided = match_quality(&[SkillRating::new(40.0, 3.0)], &[SkillRating::new(15.0, 3.0)], &config);
        assert!(lopsided < even);
        assert!(lopsided > 0.0 && even <= 1.0);
    }
}
